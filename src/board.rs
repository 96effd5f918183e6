use std::{sync::Arc, time::Duration};

use futures::{StreamExt, stream::FuturesUnordered};
use tokio::{sync::Mutex, time::timeout};
use typed_builder::TypedBuilder;

use crate::{
    config::ConfigState,
    resolve::latest_statuses,
    roster::{filter_exercises, filter_students},
    source::{ProgressSource, SourceError},
    table::{ProgressTable, RowStore, TableRow},
    types::{Exercise, Fetch, Student, SubmissionMap},
};

/// What to show and how long to wait for it.
#[derive(Debug, Clone, Default, TypedBuilder)]
#[builder(field_defaults(default, setter(into)))]
#[builder(doc)]
pub struct BoardOptions {
    /// Display name of the class.
    pub class_name:    Option<String>,
    /// Exercise names to show; empty shows every exercise.
    pub exercises:     Vec<String>,
    /// Usernames to show; empty shows every student.
    pub usernames:     Vec<String>,
    /// Per-student progress fetch timeout. With `None` a hung fetch holds up
    /// [`Board::load`] until it returns, so callers that print after loading
    /// should always set one.
    pub fetch_timeout: Option<Duration>,
}

impl BoardOptions {
    /// Takes every option from the configuration.
    pub fn from_config(config: &ConfigState) -> Self {
        Self {
            class_name:    config.class_name().map(str::to_owned),
            exercises:     config.exercises().to_vec(),
            usernames:     config.usernames().to_vec(),
            fetch_timeout: Some(config.fetch_timeout()),
        }
    }
}

/// The filtered roster and exercise columns a board was loaded with.
#[derive(Debug, Clone, Default)]
pub struct View {
    /// Students to show, in directory order.
    pub roster:  Vec<Student>,
    /// Exercise columns, sorted by name.
    pub columns: Vec<Exercise>,
}

/// Loads a class from a [`ProgressSource`] into a keyed row store.
///
/// Every student's progress is fetched independently and concurrently; each
/// fetch upserts its own row when it completes, so rows arrive in any order
/// and a slow or failed fetch only affects its own row.
pub struct Board<S> {
    /// Where the class comes from.
    source:  S,
    /// Filtering and timeout options.
    options: BoardOptions,
    /// Rows loaded so far, keyed by username.
    store:   Arc<Mutex<RowStore>>,
}

impl<S: ProgressSource> Board<S> {
    /// Creates a board with an empty store.
    pub fn new(source: S, options: BoardOptions) -> Self {
        Self {
            source,
            options,
            store: Arc::new(Mutex::new(RowStore::new())),
        }
    }

    /// Returns the options the board was created with.
    pub fn options(&self) -> &BoardOptions {
        &self.options
    }

    /// Returns a handle to the row store, usable while a load is running.
    pub fn store(&self) -> Arc<Mutex<RowStore>> {
        Arc::clone(&self.store)
    }

    /// Fetches the directory and catalog, then every roster student's
    /// progress, upserting rows as they complete.
    ///
    /// A directory or catalog that fails to load leaves the view empty.
    pub async fn load(&self) -> View {
        let (students, exercises) = tokio::join!(self.source.students(), self.source.exercises());
        let students = ready_or_warn(students, "student directory");
        let exercises = ready_or_warn(exercises, "exercise catalog");

        let view = View {
            roster:  filter_students(&students, &self.options.usernames),
            columns: filter_exercises(&exercises, &self.options.exercises),
        };
        tracing::info!(
            "Loading progress for {} students across {} exercises",
            view.roster.len(),
            view.columns.len()
        );

        let all_students = students.ready().map(Vec::as_slice).unwrap_or_default();
        let all_exercises = exercises.ready().map(Vec::as_slice).unwrap_or_default();

        {
            let mut pending = view
                .roster
                .iter()
                .map(|student| self.refresh(student, all_students, all_exercises, &view.columns))
                .collect::<FuturesUnordered<_>>();
            while pending.next().await.is_some() {}
        }

        let loaded = self.store.lock().await.len();
        tracing::info!("Loaded {} of {} rows", loaded, view.roster.len());
        view
    }

    /// Fetches one student's progress and upserts the recomputed row.
    ///
    /// A failed or timed-out fetch upserts a row with no statuses.
    pub async fn refresh(
        &self,
        student: &Student,
        students: &[Student],
        exercises: &[Exercise],
        columns: &[Exercise],
    ) {
        let submissions = self.fetch_progress(student, students, exercises).await;
        if let Fetch::Failed(reason) = &submissions {
            tracing::warn!("Progress for {} is unavailable: {reason}", student.username);
        }

        let row = TableRow::compute(&student.username, columns, &latest_statuses(&submissions));
        tracing::debug!("Row for {} is ready", student.username);
        self.store.lock().await.upsert(row);
    }

    /// Runs the progress fetch under the configured timeout.
    async fn fetch_progress(
        &self,
        student: &Student,
        students: &[Student],
        exercises: &[Exercise],
    ) -> Fetch<SubmissionMap> {
        let fetch = self.source.progress(student, students, exercises);
        match self.options.fetch_timeout {
            Some(limit) => match timeout(limit, fetch).await {
                Ok(result) => result.into(),
                Err(_) => Fetch::Failed(format!("timed out after {}s", limit.as_secs())),
            },
            None => fetch.await.into(),
        }
    }

    /// Assembles the table from the rows loaded so far.
    pub async fn table(&self, view: &View) -> ProgressTable {
        let store = self.store.lock().await;
        ProgressTable::assemble(&view.columns, &view.roster, &store)
    }
}

/// Turns a directory or catalog result into a fetch state, logging failures.
fn ready_or_warn<T>(result: Result<T, SourceError>, what: &str) -> Fetch<T> {
    if let Err(e) = &result {
        tracing::warn!("Could not load the {what}: {e}");
    }
    result.into()
}
