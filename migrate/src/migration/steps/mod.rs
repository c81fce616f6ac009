pub mod album;
pub mod photo;

use crate::services::config::MigrationOptions;

use super::progress::MigrationEventHandler;

/// Borrowed view of the orchestrator handed to each step
pub struct StepContext<'a, S, T> {
    pub source: &'a S,
    pub target: &'a T,
    pub options: &'a MigrationOptions,
    pub events: &'a dyn MigrationEventHandler,
}
