// SPDX-FileCopyrightText: 2026 Sheetflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wiring shared by the subcommands.

use std::sync::Arc;

use sheetflow_agent::{Dispatcher, Responder, history_from_config};
use sheetflow_config::SheetflowConfig;
use sheetflow_core::SheetflowError;
use sheetflow_openai::OpenAiCompletion;
use sheetflow_sheets::CsvWorkbook;
use sheetflow_store::ConfigStore;
use tracing::info;

use crate::sink::StdoutSink;

pub struct App {
    pub config: SheetflowConfig,
    pub workbook: Arc<CsvWorkbook>,
    pub store: Arc<ConfigStore>,
}

impl App {
    /// Opens the workbook and builds the configuration store.
    ///
    /// Fails on a missing workbook directory or an invalid sheet layout.
    pub fn open(config: SheetflowConfig) -> Result<Self, SheetflowError> {
        let workbook = Arc::new(CsvWorkbook::from_config(&config.sheets)?);
        let store = Arc::new(ConfigStore::from_config(workbook.clone(), &config)?);
        info!(agent = %config.agent.name, "sheetflow ready");
        Ok(Self {
            config,
            workbook,
            store,
        })
    }

    /// Builds a responder backed by the configured completion service.
    ///
    /// Fails when no completion API key is available.
    pub fn responder(&self) -> Result<Responder, SheetflowError> {
        let completion = Arc::new(OpenAiCompletion::from_config(&self.config.completion)?);
        let history = history_from_config(self.workbook.clone(), &self.config);
        Ok(Responder::new(
            self.store.clone(),
            completion,
            history,
            self.config.agent.fallback_reply.clone(),
        ))
    }

    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher::new(
            self.store.clone(),
            Arc::new(StdoutSink),
            self.config.schedule.clone(),
        )
    }
}
