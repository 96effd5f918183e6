/// Header label of the identity column, on screen and in snapshots.
pub const IDENTITY_HEADER: &str = "Github Username";

/// Field separator used by snapshot exports.
pub const CSV_SEPARATOR: char = ',';

/// File name prefix of snapshot exports.
pub const SNAPSHOT_PREFIX: &str = "progress_";

/// File extension of snapshot exports.
pub const SNAPSHOT_EXTENSION: &str = "csv";

/// Title used when no class display name is configured.
pub const DEFAULT_TITLE: &str = "Class Progress";

/// Per-student progress fetch timeout when none is configured.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
