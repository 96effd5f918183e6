use std::{
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use anyhow::{Context, Result};
use itertools::Itertools;

use crate::{
    constants::{CSV_SEPARATOR, IDENTITY_HEADER, SNAPSHOT_EXTENSION, SNAPSHOT_PREFIX},
    table::ProgressTable,
};

/// Serializes the table to comma-separated text, or `None` when there are no
/// rows.
///
/// The first line holds the identity header and the exercise names; every
/// other line holds a username and its raw statuses in the same column order.
/// Every line ends with a newline.
///
/// Fields are not quoted or escaped. A username, exercise name or status
/// containing the separator produces a malformed line.
pub fn to_csv(table: &ProgressTable) -> Option<String> {
    if table.is_empty() {
        return None;
    }

    let separator = CSV_SEPARATOR.to_string();
    let header = std::iter::once(IDENTITY_HEADER)
        .chain(table.columns().iter().map(|e| e.name()))
        .join(&separator);

    let mut out = header;
    out.push('\n');
    for row in table.rows() {
        let line = std::iter::once(row.username())
            .chain(table.raw_cells(row))
            .join(&separator);
        out.push_str(&line);
        out.push('\n');
    }

    Some(out)
}

/// Returns the snapshot file name for an export taken at `at`, e.g.
/// `progress_1700000000.csv`.
pub fn snapshot_file_name(at: SystemTime) -> String {
    let secs = at
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    format!("{SNAPSHOT_PREFIX}{secs}.{SNAPSHOT_EXTENSION}")
}

/// Writes a snapshot of the table into `dir`.
///
/// Returns the written path, or `None` without touching the filesystem when
/// the table has no rows.
pub fn write_snapshot(table: &ProgressTable, dir: &Path, at: SystemTime) -> Result<Option<PathBuf>> {
    let Some(contents) = to_csv(table) else {
        tracing::info!("Nothing to export yet, no student rows have loaded");
        return Ok(None);
    };

    std::fs::create_dir_all(dir)
        .with_context(|| format!("Could not create export directory {}", dir.display()))?;
    let path = dir.join(snapshot_file_name(at));
    std::fs::write(&path, contents)
        .with_context(|| format!("Could not write snapshot to {}", path.display()))?;

    tracing::info!("Exported {} rows to {}", table.rows().len(), path.display());
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn file_name_embeds_whole_unix_seconds() {
        let at = UNIX_EPOCH + Duration::from_millis(1_700_000_000_999);
        assert_eq!(snapshot_file_name(at), "progress_1700000000.csv");
    }

    #[test]
    fn empty_table_has_no_csv() {
        assert_eq!(to_csv(&ProgressTable::default()), None);
    }
}
