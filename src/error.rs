use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::rank_data::PageId;

/// Everything that can abort an analysis run.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("file not found: {}", path.display())]
    FileNotFound { path: PathBuf },
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{}:{line}: malformed row: {reason}", path.display())]
    MalformedRow {
        path: PathBuf,
        line: usize,
        reason: String,
    },
    #[error("rank table {} has no rows", path.display())]
    EmptyTable { path: PathBuf },
    #[error("page {id} is missing from the old rank table")]
    MissingScore { id: PageId },
    #[error("page {id} has no url in the id-url mapping")]
    MissingUrl { id: PageId },
    #[error(
        "cannot take log10 of score {score} for page {id} at rank {position} ({count} non-positive scores in total)"
    )]
    DegenerateScore {
        position: usize,
        id: PageId,
        score: f64,
        count: usize,
    },
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("plot rendering failed: {0}")]
    Plot(String),
}

impl AnalysisError {
    /// Classifies an open/read failure, keeping not-found distinct.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            AnalysisError::FileNotFound { path }
        } else {
            AnalysisError::Io { path, source }
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
