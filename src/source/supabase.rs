use postgrest::{Builder, Postgrest};
use serde::{Deserialize, de::DeserializeOwned};

use super::{ProgressSource, SourceError, retain_catalog};
use crate::{
    config::ConfigState,
    types::{Exercise, Student, SubmissionMap, SubmissionRecord},
};

/// A submission row as stored in the `submissions` table.
#[derive(Deserialize)]
struct SubmissionRow {
    /// Exercise the submission belongs to.
    exercise_name: String,
    /// The submission itself, carrying the nested progress object.
    #[serde(flatten)]
    record:        SubmissionRecord,
}

/// Reads the directory, the catalog and submissions from Supabase tables.
#[derive(Clone)]
pub struct PostgrestSource {
    /// Configured PostgREST client.
    client: Postgrest,
}

impl PostgrestSource {
    /// Wraps an existing PostgREST client.
    pub fn new(client: Postgrest) -> Self {
        Self { client }
    }

    /// Builds a source from the configured Supabase credentials.
    pub fn from_config(config: &ConfigState) -> Result<Self, SourceError> {
        config
            .postgrest()
            .map(Self::new)
            .ok_or(SourceError::NotConfigured)
    }
}

/// Executes a PostgREST query and decodes the returned rows.
async fn fetch_rows<T: DeserializeOwned>(query: Builder, what: &str) -> Result<Vec<T>, SourceError> {
    let resp = query
        .execute()
        .await
        .map_err(|e| SourceError::transport(what, e))?;
    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|e| SourceError::transport(what, e))?;

    if !status.is_success() {
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
            .unwrap_or(body);
        return Err(SourceError::Remote {
            what: what.to_string(),
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_str(&body).map_err(|source| SourceError::Decode {
        what: what.to_string(),
        source,
    })
}

impl ProgressSource for PostgrestSource {
    async fn students(&self) -> Result<Vec<Student>, SourceError> {
        let query = self
            .client
            .from("students")
            .select("id,username")
            .order("id.asc");
        fetch_rows(query, "students").await
    }

    async fn exercises(&self) -> Result<Vec<Exercise>, SourceError> {
        let query = self.client.from("exercises").select("exercise_name");
        fetch_rows(query, "exercises").await
    }

    async fn progress(
        &self,
        student: &Student,
        students: &[Student],
        exercises: &[Exercise],
    ) -> Result<SubmissionMap, SourceError> {
        if !students.iter().any(|s| s.id == student.id) {
            tracing::debug!("{} is not in the student directory", student.username);
            return Ok(SubmissionMap::new());
        }

        // Submission ids are assigned in arrival order, so ascending ids give
        // oldest-to-newest sequences.
        let query = self
            .client
            .from("submissions")
            .select("exercise_name,progress")
            .eq("student_id", student.id.to_string())
            .order("id.asc");
        let rows: Vec<SubmissionRow> =
            fetch_rows(query, &format!("submissions of {}", student.username)).await?;

        let mut submissions = SubmissionMap::new();
        for row in rows {
            submissions
                .entry(row.exercise_name)
                .or_default()
                .push(row.record);
        }

        Ok(retain_catalog(submissions, exercises))
    }
}
