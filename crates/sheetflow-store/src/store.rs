// SPDX-FileCopyrightText: 2026 Sheetflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The configuration store: three TTL caches over one sheet source.

use std::sync::Arc;
use std::time::Duration;

use sheetflow_config::model::{SheetflowConfig, SheetsConfig};
use sheetflow_core::range::column_letters;
use sheetflow_core::{
    A1Range, CellRef, FlowRecord, PromptSettings, Resource, ScheduledMessage, SheetSource,
    SheetflowError,
};
use tracing::{debug, info, warn};

use crate::cache::TtlCache;
use crate::rows::{parse_flow_rows, parse_prompt_rows, parse_scheduled_rows};
use crate::settings::resolve_settings;

/// Sheet name and parsed range for one resource.
#[derive(Debug, Clone)]
struct SheetRange {
    sheet: String,
    range: A1Range,
}

impl SheetRange {
    fn parse(sheet: &str, range: &str, field: &str) -> Result<Self, SheetflowError> {
        if sheet.trim().is_empty() {
            return Err(SheetflowError::Config(format!(
                "sheets.{field}_sheet must not be empty"
            )));
        }
        let range: A1Range = range.parse()?;
        Ok(Self {
            sheet: sheet.to_string(),
            range,
        })
    }
}

/// Cached, process-scoped view of the flows, prompt settings, and scheduled
/// messages held in the workbook.
///
/// Reads never fail: when the source is unavailable the error is logged and
/// the resource's empty fallback is returned, leaving the cache as it was.
pub struct ConfigStore {
    source: Arc<dyn SheetSource>,
    flows_at: SheetRange,
    prompts_at: SheetRange,
    scheduled_at: SheetRange,
    status_column: u32,
    flows: TtlCache<Arc<Vec<FlowRecord>>>,
    prompts: TtlCache<Arc<PromptSettings>>,
    scheduled: TtlCache<Arc<Vec<ScheduledMessage>>>,
}

impl ConfigStore {
    /// Builds a store over `source` with one shared freshness window.
    ///
    /// Fails with [`SheetflowError::Config`] on a zero TTL, an empty sheet
    /// name, an unparsable range, or a status column that is not a bare
    /// column reference.
    pub fn new(
        source: Arc<dyn SheetSource>,
        sheets: &SheetsConfig,
        ttl: Duration,
    ) -> Result<Self, SheetflowError> {
        if ttl.is_zero() {
            return Err(SheetflowError::Config(
                "cache ttl must be greater than zero".into(),
            ));
        }

        let flows_at = SheetRange::parse(&sheets.flows_sheet, &sheets.flows_range, "flows")?;
        let prompts_at =
            SheetRange::parse(&sheets.prompts_sheet, &sheets.prompts_range, "prompts")?;
        let scheduled_at =
            SheetRange::parse(&sheets.schedule_sheet, &sheets.schedule_range, "schedule")?;

        let status: CellRef = sheets.status_column.parse()?;
        if status.row.is_some() {
            return Err(SheetflowError::Config(format!(
                "sheets.status_column `{}` must be a column without a row",
                sheets.status_column
            )));
        }

        info!(
            source = source.name(),
            ttl_secs = ttl.as_secs(),
            "configuration store ready"
        );

        Ok(Self {
            source,
            flows_at,
            prompts_at,
            scheduled_at,
            status_column: status.column,
            flows: TtlCache::new("flows", ttl),
            prompts: TtlCache::new("prompts", ttl),
            scheduled: TtlCache::new("scheduled_messages", ttl),
        })
    }

    /// Builds a store from the loaded configuration.
    pub fn from_config(
        source: Arc<dyn SheetSource>,
        config: &SheetflowConfig,
    ) -> Result<Self, SheetflowError> {
        Self::new(source, &config.sheets, config.cache.ttl())
    }

    pub fn source(&self) -> &Arc<dyn SheetSource> {
        &self.source
    }

    pub fn ttl(&self) -> Duration {
        self.flows.ttl()
    }

    /// The flow table in sheet order, or empty when the source is unavailable.
    pub async fn flows(&self) -> Arc<Vec<FlowRecord>> {
        let at = &self.flows_at;
        let result = self
            .flows
            .get_or_fetch(|| async move {
                let rows = self.fetch(at).await?;
                Ok(Arc::new(parse_flow_rows(&rows)))
            })
            .await;
        self.or_fallback(Resource::Flows, result)
    }

    /// Resolved prompt settings, or an empty map when the source is unavailable.
    pub async fn prompt_settings(&self) -> Arc<PromptSettings> {
        let at = &self.prompts_at;
        let result = self
            .prompts
            .get_or_fetch(|| async move {
                let rows = self.fetch(at).await?;
                Ok(Arc::new(resolve_settings(parse_prompt_rows(&rows))))
            })
            .await;
        self.or_fallback(Resource::Prompts, result)
    }

    /// Scheduled messages in sheet order, or empty when the source is unavailable.
    pub async fn scheduled_messages(&self) -> Arc<Vec<ScheduledMessage>> {
        let at = &self.scheduled_at;
        let result = self
            .scheduled
            .get_or_fetch(|| async move {
                let rows = self.fetch(at).await?;
                Ok(Arc::new(parse_scheduled_rows(&rows, at.range.first_row())))
            })
            .await;
        self.or_fallback(Resource::ScheduledMessages, result)
    }

    /// Writes `status` into the status cell of `row_index`.
    ///
    /// On success only the scheduled-messages cache is invalidated, so the
    /// next read sees the write while flows and prompts stay cached. On
    /// failure nothing is invalidated and `false` is returned.
    pub async fn update_message_status(&self, row_index: u32, status: &str) -> bool {
        let at = &self.scheduled_at;
        if row_index < at.range.first_row() {
            warn!(
                row_index,
                first_row = at.range.first_row(),
                "status update targets a row outside the scheduled-messages range"
            );
            return false;
        }

        let cell = format!("{}{row_index}", column_letters(self.status_column));
        match self.source.write_cell(&at.sheet, &cell, status).await {
            Ok(()) => {
                self.scheduled.invalidate();
                debug!(row_index, %cell, status, "message status updated");
                true
            }
            Err(e) => {
                warn!(row_index, %cell, error = %e, "message status write failed");
                false
            }
        }
    }

    /// Clears one resource's cache.
    pub fn invalidate(&self, resource: Resource) {
        match resource {
            Resource::Flows => self.flows.invalidate(),
            Resource::Prompts => self.prompts.invalidate(),
            Resource::ScheduledMessages => self.scheduled.invalidate(),
        }
    }

    /// Clears all three caches. Not used by the request path.
    pub fn invalidate_all(&self) {
        self.flows.invalidate();
        self.prompts.invalidate();
        self.scheduled.invalidate();
        info!("all configuration caches invalidated");
    }

    async fn fetch(&self, at: &SheetRange) -> Result<Vec<sheetflow_core::Row>, SheetflowError> {
        let rows = self
            .source
            .fetch_range(&at.sheet, &at.range.to_string())
            .await?;
        debug!(sheet = %at.sheet, rows = rows.len(), "sheet fetched");
        Ok(rows)
    }

    fn or_fallback<T: Default>(
        &self,
        resource: Resource,
        result: Result<Arc<T>, SheetflowError>,
    ) -> Arc<T> {
        result.unwrap_or_else(|e| {
            warn!(%resource, error = %e, "source unavailable, serving empty fallback");
            Arc::new(T::default())
        })
    }
}
