// SPDX-FileCopyrightText: 2026 Sheetflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Time-to-live cache for a single externally fetched resource.
//!
//! A value is fresh while `now - fetched_at < ttl`. A miss calls the
//! caller's fetch function; failures leave the previous entry untouched.
//!
//! Concurrent misses are collapsed: callers queue on a fetch gate and
//! re-check freshness once they hold it, so only the first one reaches the
//! source. [`TtlCache::invalidate`] never waits on the gate. It bumps a
//! generation counter instead, and a fetch that started under an older
//! generation does not write its result back.

use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use sheetflow_core::SheetflowError;
use tokio::time::Instant;
use tracing::debug;

struct Entry<T> {
    value: T,
    fetched_at: Instant,
}

struct State<T> {
    entry: Option<Entry<T>>,
    generation: u64,
}

/// Cache for one resource with a fixed freshness window.
pub struct TtlCache<T> {
    label: &'static str,
    ttl: Duration,
    state: Mutex<State<T>>,
    gate: tokio::sync::Mutex<()>,
}

impl<T: Clone> TtlCache<T> {
    /// Creates an empty cache. The first `get_or_fetch` always misses.
    pub fn new(label: &'static str, ttl: Duration) -> Self {
        Self {
            label,
            ttl,
            state: Mutex::new(State {
                entry: None,
                generation: 0,
            }),
            gate: tokio::sync::Mutex::new(()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached value if it is still fresh, without fetching.
    pub fn peek(&self) -> Option<T> {
        self.fresh(Instant::now())
    }

    /// When the current entry was fetched, fresh or not.
    pub fn fetched_at(&self) -> Option<Instant> {
        self.state().entry.as_ref().map(|e| e.fetched_at)
    }

    /// Returns the fresh cached value, or fetches, stores, and returns a new one.
    ///
    /// On fetch failure the error is returned and the stored entry and its
    /// timestamp are left exactly as they were.
    pub async fn get_or_fetch<F, Fut>(&self, fetch: F) -> Result<T, SheetflowError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, SheetflowError>>,
    {
        if let Some(value) = self.fresh(Instant::now()) {
            debug!(cache = self.label, "cache hit");
            return Ok(value);
        }

        let _gate = self.gate.lock().await;

        if let Some(value) = self.fresh(Instant::now()) {
            debug!(cache = self.label, "cache filled by concurrent refresh");
            return Ok(value);
        }

        let generation = self.state().generation;
        debug!(cache = self.label, "cache miss, fetching");
        let value = fetch().await?;

        let mut state = self.state();
        if state.generation == generation {
            state.entry = Some(Entry {
                value: value.clone(),
                fetched_at: Instant::now(),
            });
        } else {
            debug!(
                cache = self.label,
                "invalidated during fetch, not storing result"
            );
        }

        Ok(value)
    }

    /// Clears the value and timestamp. Never fetches; idempotent.
    pub fn invalidate(&self) {
        let mut state = self.state();
        state.entry = None;
        state.generation = state.generation.wrapping_add(1);
        debug!(cache = self.label, "cache invalidated");
    }

    fn fresh(&self, now: Instant) -> Option<T> {
        let state = self.state();
        let entry = state.entry.as_ref()?;
        (now.saturating_duration_since(entry.fetched_at) < self.ttl).then(|| entry.value.clone())
    }

    fn state(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
