use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A student as returned by the student directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// Stable identifier used to fetch the student's progress.
    pub id:       i64,
    /// Display handle, also the key of the student's table row.
    pub username: String,
}

impl Student {
    /// Creates a new student.
    pub fn new(id: i64, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
        }
    }
}

/// An exercise from the exercise catalog. The name is both the column label
/// and the lookup key into a student's submissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    /// Unique exercise name.
    pub exercise_name: String,
}

impl Exercise {
    /// Creates a new exercise.
    pub fn new(exercise_name: impl Into<String>) -> Self {
        Self {
            exercise_name: exercise_name.into(),
        }
    }

    /// Returns the exercise name.
    pub fn name(&self) -> &str {
        &self.exercise_name
    }
}

/// Progress payload nested inside a submission record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Raw status from the upstream vocabulary, if any.
    #[serde(default)]
    pub status: Option<String>,
}

/// One submission of one student for one exercise.
///
/// There is no timestamp: recency is the record's position in the sequence
/// handed over by the source, last element being the most recent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    /// Nested progress object carrying the status.
    #[serde(default)]
    pub progress: Progress,
}

impl SubmissionRecord {
    /// Creates a record carrying the given status.
    pub fn with_status(status: impl Into<String>) -> Self {
        Self {
            progress: Progress {
                status: Some(status.into()),
            },
        }
    }

    /// Returns the raw status, if present.
    pub fn status(&self) -> Option<&str> {
        self.progress.status.as_deref()
    }
}

/// Exercise name to ordered submissions (oldest first) for one student.
pub type SubmissionMap = BTreeMap<String, Vec<SubmissionRecord>>;

/// Exercise name to the raw status of the most recent submission.
pub type LatestStatusMap = BTreeMap<String, String>;

/// State of a remote fetch.
///
/// `Loading` and `Failed` are both treated as "not yet available" by every
/// consumer; only `Ready` data is ever filtered or resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetch<T> {
    /// The request has not completed yet.
    Loading,
    /// The request completed with data.
    Ready(T),
    /// The request failed; the message is kept for logging only.
    Failed(String),
}

impl<T> Fetch<T> {
    /// Returns the data if the fetch is ready.
    pub fn ready(&self) -> Option<&T> {
        match self {
            Fetch::Ready(value) => Some(value),
            Fetch::Loading | Fetch::Failed(_) => None,
        }
    }
}

impl<T, E: std::fmt::Display> From<Result<T, E>> for Fetch<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Fetch::Ready(value),
            Err(e) => Fetch::Failed(e.to_string()),
        }
    }
}
