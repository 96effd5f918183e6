/// JSON document source, read from disk or over HTTP
pub mod fixture;
/// Supabase/PostgREST-backed source
pub mod supabase;

use std::{future::Future, path::PathBuf};

pub use self::{fixture::FixtureSource, supabase::PostgrestSource};
use crate::types::{Exercise, Student, SubmissionMap};

/// Errors raised while talking to a progress source.
#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    /// No Supabase credentials were found in the environment.
    #[error("Supabase is not configured, set SUPABASE_URL and SUPABASE_ANON_KEY")]
    NotConfigured,
    /// The HTTP request itself failed.
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    /// The request could not be completed by a client library other than the
    /// shared HTTP client.
    #[error("Could not fetch {what}")]
    Transport {
        /// What was being fetched.
        what:   String,
        /// Underlying client error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// The server answered with an error.
    #[error("Request for {what} failed ({status}): {message}")]
    Remote {
        /// What was being fetched.
        what:    String,
        /// HTTP status code.
        status:  u16,
        /// Message reported by the server.
        message: String,
    },
    /// The payload did not have the expected shape.
    #[error("Could not decode {what}")]
    Decode {
        /// What was being decoded.
        what:   String,
        /// Underlying decoding error.
        #[source]
        source: serde_json::Error,
    },
    /// A local document could not be read.
    #[error("Could not read {}", path.display())]
    Io {
        /// Path that was read.
        path:   PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl SourceError {
    /// Wraps a client library error raised while fetching `what`.
    pub fn transport(what: &str, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        SourceError::Transport {
            what:   what.to_string(),
            source: Box::new(source),
        }
    }
}

/// The remote collaborators the board is built from: the student directory,
/// the exercise catalog, and one progress fetch per student.
pub trait ProgressSource: Send + Sync {
    /// Fetches the full student directory.
    fn students(&self) -> impl Future<Output = Result<Vec<Student>, SourceError>> + Send;

    /// Fetches the full exercise catalog.
    fn exercises(&self) -> impl Future<Output = Result<Vec<Exercise>, SourceError>> + Send;

    /// Fetches one student's submissions, grouped by exercise name with each
    /// sequence ordered oldest to newest. The full directory and catalog are
    /// passed along for cross-referencing.
    fn progress(
        &self,
        student: &Student,
        students: &[Student],
        exercises: &[Exercise],
    ) -> impl Future<Output = Result<SubmissionMap, SourceError>> + Send;
}

/// Drops submissions for exercises that are not in the catalog.
pub(crate) fn retain_catalog(mut submissions: SubmissionMap, exercises: &[Exercise]) -> SubmissionMap {
    submissions.retain(|name, _| exercises.iter().any(|e| e.name() == name));
    submissions
}
