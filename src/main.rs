#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! # classboard
//!
//! Shows which exercises each student of a class has completed, and writes
//! CSV snapshots of it.
//!
//! Students, exercises and submissions are read from Supabase
//! (`SUPABASE_URL`, `SUPABASE_ANON_KEY`) or from a JSON document passed with
//! `--fixture`.

use std::{path::PathBuf, time::SystemTime};

use anyhow::{Context, Result};
use bpaf::*;
use classboard::{
    board::{Board, BoardOptions},
    config::{self, ConfigHandle},
    export, render,
    source::{FixtureSource, PostgrestSource, ProgressSource},
};
use dotenvy::dotenv;
use tracing::{Level, metadata::LevelFilter};
use tracing_subscriber::{fmt, prelude::*, util::SubscriberInitExt};

/// Options shared by every subcommand.
#[derive(Debug, Clone)]
struct Shared {
    /// Path or URL of a JSON class document to use instead of Supabase.
    fixture:  Option<String>,
    /// Exercise allow-list override.
    exercise: Vec<String>,
    /// Username allow-list override.
    user:     Vec<String>,
    /// Class display name override.
    class:    Option<String>,
}

/// Top-level CLI commands.
#[derive(Debug, Clone)]
enum Cmd {
    /// Print the board, optionally writing an HTML copy
    Show(Shared, Option<PathBuf>),
    /// Write a CSV snapshot into a directory
    Export(Shared, Option<PathBuf>),
}

/// Parse the command line arguments and return a `Cmd` enum
fn options() -> Cmd {
    /// parses the options every subcommand takes
    fn shared() -> impl Parser<Shared> {
        let fixture = long("fixture")
            .help("Read the class from a JSON document (path or URL) instead of Supabase")
            .argument::<String>("PATH|URL")
            .optional();
        let exercise = long("exercise")
            .short('e')
            .help("Only show this exercise (repeatable)")
            .argument::<String>("NAME")
            .many();
        let user = long("user")
            .short('u')
            .help("Only show this username (repeatable)")
            .argument::<String>("USERNAME")
            .many();
        let class = long("class")
            .help("Class name shown above the board")
            .argument::<String>("NAME")
            .optional();
        construct!(Shared {
            fixture,
            exercise,
            user,
            class
        })
    }

    /// parses the HTML output path
    fn html() -> impl Parser<Option<PathBuf>> {
        long("html")
            .help("Also write the board as an HTML page")
            .argument::<PathBuf>("PATH")
            .optional()
    }

    /// parses the export directory
    fn out() -> impl Parser<Option<PathBuf>> {
        long("out")
            .short('o')
            .help("Directory to write the snapshot into")
            .argument::<PathBuf>("DIR")
            .optional()
    }

    let show = construct!(Cmd::Show(shared(), html()))
        .to_options()
        .command("show")
        .help("Print the progress board");

    let export = construct!(Cmd::Export(shared(), out()))
        .to_options()
        .command("export")
        .help("Write a CSV snapshot of the progress board");

    let cmd = construct!([show, export]);

    cmd.to_options()
        .descr("Per-student exercise progress for a class")
        .run()
}

/// Merges command line overrides into the configured board options.
fn board_options(config: &ConfigHandle, shared: &Shared) -> BoardOptions {
    let mut options = BoardOptions::from_config(config);
    if !shared.exercise.is_empty() {
        options.exercises = shared.exercise.clone();
    }
    if !shared.user.is_empty() {
        options.usernames = shared.user.clone();
    }
    if shared.class.is_some() {
        options.class_name = shared.class.clone();
    }
    options
}

/// Runs a subcommand against the given source.
async fn run<S: ProgressSource>(source: S, config: &ConfigHandle, cmd: Cmd) -> Result<()> {
    match cmd {
        Cmd::Show(shared, html) => {
            let board = Board::new(source, board_options(config, &shared));
            let view = board.load().await;
            let table = board.table(&view).await;
            let class_name = board.options().class_name.as_deref();

            println!("{}", render::terminal(&table, class_name));
            if let Some(path) = html {
                std::fs::write(&path, render::html(&table, class_name))
                    .with_context(|| format!("Could not write {}", path.display()))?;
                tracing::info!("Wrote {}", path.display());
            }
        }
        Cmd::Export(shared, out) => {
            let board = Board::new(source, board_options(config, &shared));
            let view = board.load().await;
            let table = board.table(&view).await;
            let dir = out.unwrap_or_else(|| config.export_dir().to_path_buf());

            if let Some(path) = export::write_snapshot(&table, &dir, SystemTime::now())? {
                println!("{}", path.display());
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let fmt = fmt::layer()
        .without_time()
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr);
    let filter_layer = LevelFilter::from_level(Level::INFO);
    tracing_subscriber::registry()
        .with(fmt)
        .with(filter_layer)
        .init();

    let cmd = options();
    let config = config::ensure_initialized()?;

    let fixture = match &cmd {
        Cmd::Show(shared, _) | Cmd::Export(shared, _) => shared.fixture.clone(),
    };

    match fixture {
        Some(location) => {
            let loaded = if location.starts_with("http://") || location.starts_with("https://") {
                FixtureSource::from_url(&config.http_client(), &location).await
            } else {
                FixtureSource::from_path(&location).await
            };
            let source =
                loaded.with_context(|| format!("Could not load class document {location}"))?;
            run(source, &config, cmd).await
        }
        None => {
            let source = PostgrestSource::from_config(&config)?;
            run(source, &config, cmd).await
        }
    }
}
