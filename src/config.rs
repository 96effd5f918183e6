#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    path::PathBuf,
    sync::{Arc, Mutex, OnceLock},
    time::Duration,
};

use anyhow::{Context, Result};
use postgrest::Postgrest;
use reqwest::Client;
use state::InitCell;

use crate::constants::DEFAULT_FETCH_TIMEOUT_SECS;

/// Supabase credentials loaded from the environment, if available.
#[derive(Clone)]
struct SupabaseEnv {
    /// Fully qualified PostgREST endpoint.
    rest_endpoint: String,
    /// API key used for PostgREST requests.
    api_key:       String,
}

impl SupabaseEnv {
    /// Builds a Supabase credential bundle from environment-provided values.
    fn new(url: String, key: String) -> Self {
        let rest_endpoint = format!("{}/rest/v1", url.trim().trim_end_matches('/'));
        Self {
            rest_endpoint,
            api_key: key.trim().to_owned(),
        }
    }
}

/// Runtime configuration, read once at startup.
pub struct ConfigState {
    /// Supabase credentials, if configured.
    supabase:      Option<SupabaseEnv>,
    /// Lazily constructed Supabase PostgREST client.
    postgrest:     InitCell<Postgrest>,
    /// Shared reqwest HTTP client reused across network helpers.
    http_client:   Client,
    /// Optional display name of the class.
    class_name:    Option<String>,
    /// Exercise names to show; empty shows every exercise.
    exercises:     Vec<String>,
    /// Usernames to show; empty shows every student.
    usernames:     Vec<String>,
    /// Directory snapshots are written to.
    export_dir:    PathBuf,
    /// Per-student progress fetch timeout.
    fetch_timeout: Duration,
}

impl ConfigState {
    /// Construct a new configuration instance from the process environment.
    fn new() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Construct a configuration instance reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let supabase = match (lookup("SUPABASE_URL"), lookup("SUPABASE_ANON_KEY")) {
            (Some(url), Some(key)) if !url.trim().is_empty() && !key.trim().is_empty() => {
                Some(SupabaseEnv::new(url, key))
            }
            _ => None,
        };

        let http_client = Client::builder()
            // Avoid macOS dynamic store lookups that fail in sandboxed environments.
            .no_proxy()
            .build()
            .context("Failed to construct shared HTTP client")?;

        let class_name = lookup("CLASSBOARD_CLASS_NAME")
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty());
        let exercises = parse_list(lookup("CLASSBOARD_EXERCISES"));
        let usernames = parse_list(lookup("CLASSBOARD_USERNAMES"));
        let export_dir = lookup("CLASSBOARD_EXPORT_DIR")
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        let fetch_timeout = read_timeout_secs(
            lookup("CLASSBOARD_FETCH_TIMEOUT_SECS"),
            DEFAULT_FETCH_TIMEOUT_SECS,
        );

        Ok(Self {
            supabase,
            postgrest: InitCell::new(),
            http_client,
            class_name,
            exercises,
            usernames,
            export_dir,
            fetch_timeout,
        })
    }

    /// Returns the configured PostgREST client if credentials are available.
    pub fn postgrest(&self) -> Option<Postgrest> {
        if let Some(client) = self.postgrest.try_get() {
            return Some(client.clone());
        }

        let creds = self.supabase.as_ref()?;
        let client = Postgrest::new(creds.rest_endpoint.clone())
            .insert_header("apikey", creds.api_key.clone())
            .insert_header("Authorization", format!("Bearer {}", creds.api_key));
        self.postgrest.set(client);
        Some(self.postgrest.get().clone())
    }

    /// Returns a clone of the shared reqwest HTTP client.
    pub fn http_client(&self) -> Client {
        self.http_client.clone()
    }

    /// Returns the class display name, if configured.
    pub fn class_name(&self) -> Option<&str> {
        self.class_name.as_deref()
    }

    /// Returns the exercise allow-list.
    pub fn exercises(&self) -> &[String] {
        &self.exercises
    }

    /// Returns the username allow-list.
    pub fn usernames(&self) -> &[String] {
        &self.usernames
    }

    /// Returns the snapshot export directory.
    pub fn export_dir(&self) -> &std::path::Path {
        &self.export_dir
    }

    /// Returns the per-student fetch timeout. Always set, so one hung fetch
    /// can only ever blank its own row.
    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }
}

/// Shared configuration handle used throughout the crate.
#[derive(Clone)]
pub struct ConfigHandle(Arc<ConfigState>);

impl std::ops::Deref for ConfigHandle {
    type Target = ConfigState;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Global storage for the lazily constructed configuration state.
static CONFIG_SLOT: OnceLock<Mutex<Option<Arc<ConfigState>>>> = OnceLock::new();

/// Returns the mutex guarding the global configuration slot.
fn slot() -> &'static Mutex<Option<Arc<ConfigState>>> {
    CONFIG_SLOT.get_or_init(|| Mutex::new(None))
}

/// Ensure the global configuration has been initialized and return a handle.
pub fn ensure_initialized() -> Result<ConfigHandle> {
    let mut guard = slot()
        .lock()
        .map_err(|_| anyhow::anyhow!("config slot poisoned"))?;
    if let Some(cfg) = guard.as_ref() {
        return Ok(ConfigHandle(Arc::clone(cfg)));
    }

    let cfg = Arc::new(ConfigState::new()?);
    *guard = Some(Arc::clone(&cfg));
    Ok(ConfigHandle(cfg))
}

/// Splits a comma-separated list, dropping blank entries.
fn parse_list(value: Option<String>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Parses a number of seconds into a `Duration`, falling back to
/// `default_secs` when parsing fails, the variable is missing, or it is zero.
fn read_timeout_secs(value: Option<String>, default_secs: u64) -> Duration {
    let secs = value
        .and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .unwrap_or_else(|| {
            tracing::debug!("Using the default fetch timeout of {default_secs}s");
            default_secs
        });
    Duration::from_secs(secs)
}
