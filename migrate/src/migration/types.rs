//! Outcome of a migration run

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::services::client::DestinationAlbum;

/// What a recorded failure applies to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum FailureScope {
    Album { title: String },
    Photo { album: String, filename: String },
}

impl fmt::Display for FailureScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureScope::Album { title } => write!(f, "album '{}'", title),
            FailureScope::Photo { album, filename } => {
                write!(f, "photo '{}' in album '{}'", filename, album)
            }
        }
    }
}

/// An album or photo that was skipped, and why
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationFailure {
    #[serde(flatten)]
    pub scope: FailureScope,
    pub reason: String,
}

impl MigrationFailure {
    pub fn album(title: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            scope: FailureScope::Album {
                title: title.into(),
            },
            reason: reason.into(),
        }
    }

    pub fn photo(
        album: impl Into<String>,
        filename: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            scope: FailureScope::Photo {
                album: album.into(),
                filename: filename.into(),
            },
            reason: reason.into(),
        }
    }
}

/// Summary of one `migrate_albums` run
#[derive(Debug, Clone, Default, Serialize)]
pub struct MigrationReport {
    /// Album records found in the source listing
    pub albums_found: usize,
    pub albums_created: Vec<DestinationAlbum>,
    /// Titles of albums deliberately not migrated (the root container)
    pub albums_skipped: Vec<String>,
    pub photos_migrated: usize,
    pub failures: Vec<MigrationFailure>,
    pub caches_refreshed: bool,
    pub refresh_error: Option<String>,
    #[serde(skip)]
    pub duration: Duration,
}

impl MigrationReport {
    pub fn new(albums_found: usize) -> Self {
        Self {
            albums_found,
            ..Default::default()
        }
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    pub fn album_failures(&self) -> impl Iterator<Item = &MigrationFailure> {
        self.failures
            .iter()
            .filter(|failure| matches!(failure.scope, FailureScope::Album { .. }))
    }

    pub fn photo_failures(&self) -> impl Iterator<Item = &MigrationFailure> {
        self.failures
            .iter()
            .filter(|failure| matches!(failure.scope, FailureScope::Photo { .. }))
    }

    /// True when nothing was skipped for an error and the caches were refreshed
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.caches_refreshed
    }

    pub fn summary(&self) -> String {
        format!(
            "{} of {} albums created ({} skipped), {} photos migrated, {} failures in {:.1}s",
            self.albums_created.len(),
            self.albums_found,
            self.albums_skipped.len(),
            self.photos_migrated,
            self.failure_count(),
            self.duration.as_secs_f64()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counts_failures_by_scope() {
        let mut report = MigrationReport::new(3);
        report.failures.push(MigrationFailure::album("Broken", "no album id returned"));
        report
            .failures
            .push(MigrationFailure::photo("Vacation", "beach.jpg", "fetch failed"));
        report
            .failures
            .push(MigrationFailure::photo("Vacation", "dunes.jpg", "upload failed"));

        assert_eq!(report.failure_count(), 3);
        assert_eq!(report.album_failures().count(), 1);
        assert_eq!(report.photo_failures().count(), 2);
        assert!(!report.is_clean());
        assert!(report.summary().contains("3 failures"));
    }

    #[test]
    fn test_failure_serializes_flat() {
        let failure = MigrationFailure::photo("Vacation", "beach.jpg", "fetch failed");
        let json = serde_json::to_value(&failure).unwrap();

        assert_eq!(json["scope"], "photo");
        assert_eq!(json["album"], "Vacation");
        assert_eq!(json["filename"], "beach.jpg");
        assert_eq!(json["reason"], "fetch failed");
        assert_eq!(
            failure.scope.to_string(),
            "photo 'beach.jpg' in album 'Vacation'"
        );
    }
}
