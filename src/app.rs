use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::adapters::{HttpOcrService, HttpStorageService};
use crate::core::models::ScannerSettings;
use crate::core::orchestrators::ScanOrchestrator;
use crate::global_constants::LOG_TAG_APP;
use crate::ports::FolderCaptureSource;
use crate::presentation::{parse_command, TerminalView, UserCommand, HELP_TEXT};

pub struct ScannerApp {
    orchestrator: ScanOrchestrator,
}

/// What the read loop should do after one line of input.
#[derive(Debug, PartialEq, Eq)]
pub enum LineOutcome {
    Continue(String),
    Quit,
}

impl ScannerApp {
    pub fn build() -> Self {
        log::info!("{} Initializing application", LOG_TAG_APP);

        let settings = ScannerSettings::load().unwrap_or_else(|e| {
            log::warn!("{} Failed to load settings: {}, using defaults", LOG_TAG_APP, e);
            let mut settings = ScannerSettings::default();
            settings.apply_overrides(|key| std::env::var(key).ok());
            settings
        });

        if let Err(e) = std::fs::create_dir_all(&settings.capture_folder) {
            log::warn!(
                "{} Could not create capture folder {:?}: {}",
                LOG_TAG_APP,
                settings.capture_folder,
                e
            );
        }
        println!("Capture folder: {}", settings.capture_folder.display());

        let orchestrator = ScanOrchestrator::build(
            Arc::new(FolderCaptureSource::initialize(settings.capture_folder.clone())),
            Arc::new(HttpOcrService::new(&settings.ocr_base_url)),
            Arc::new(HttpStorageService::new(&settings.storage_base_url)),
            settings.request_timeout(),
        );

        Self::with_orchestrator(orchestrator)
    }

    fn with_orchestrator(orchestrator: ScanOrchestrator) -> Self {
        Self { orchestrator }
    }

    pub fn render_view(&self) -> String {
        TerminalView::render_session(self.orchestrator.wizard().session())
    }

    pub async fn handle_line(&mut self, line: &str) -> LineOutcome {
        let command = match parse_command(line) {
            Ok(command) => command,
            Err(e) => return LineOutcome::Continue(TerminalView::render_error(&e)),
        };

        match command {
            UserCommand::Quit => LineOutcome::Quit,
            UserCommand::Help => LineOutcome::Continue(HELP_TEXT.to_string()),
            UserCommand::Search(name_prefix) => {
                let output = match self.orchestrator.search_products(&name_prefix).await {
                    Ok(products) => TerminalView::render_search_results(&name_prefix, &products),
                    Err(e) => TerminalView::render_error(&format!("search failed: {:#}", e)),
                };
                LineOutcome::Continue(output)
            }
            UserCommand::Wizard(message) => {
                let output = match self.orchestrator.dispatch(message).await {
                    Ok(()) => self.render_view(),
                    Err(e) => {
                        log::warn!("{} {}", LOG_TAG_APP, e);
                        format!("{}\n{}", TerminalView::render_error(&e), self.render_view())
                    }
                };
                LineOutcome::Continue(output)
            }
        }
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        println!("{}", self.render_view());

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            match self.handle_line(&line).await {
                LineOutcome::Continue(output) => println!("{}", output),
                LineOutcome::Quit => break,
            }
        }

        log::info!("{} Shutting down", LOG_TAG_APP);
        Ok(())
    }
}
