use std::collections::{BTreeMap, HashMap};

use itertools::Itertools;

use crate::{
    status::StatusSymbol,
    types::{Exercise, LatestStatusMap, Student},
};

/// One student's line of the progress table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    /// Username, the row's key.
    username: String,
    /// Raw status per exercise column; columns without an attempt are absent.
    statuses: BTreeMap<String, String>,
}

impl TableRow {
    /// Computes a row from a student's latest statuses, keeping only the given
    /// exercise columns.
    ///
    /// Pure: the same inputs always give the same row, so it can be recomputed
    /// whenever the columns or the student's submissions change.
    pub fn compute(
        username: impl Into<String>,
        columns: &[Exercise],
        latest: &LatestStatusMap,
    ) -> Self {
        let statuses = columns
            .iter()
            .filter_map(|e| {
                latest
                    .get(e.name())
                    .map(|status| (e.exercise_name.clone(), status.clone()))
            })
            .collect();

        Self {
            username: username.into(),
            statuses,
        }
    }

    /// Returns the row's username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the raw status for an exercise, if attempted.
    pub fn status(&self, exercise: &str) -> Option<&str> {
        self.statuses.get(exercise).map(String::as_str)
    }

    /// Returns the display symbol for an exercise.
    pub fn symbol(&self, exercise: &str) -> StatusSymbol {
        StatusSymbol::from_status(self.status(exercise))
    }
}

/// Keyed store of table rows, one per username.
///
/// Rows only ever enter through [`RowStore::upsert`], which swaps in a fully
/// computed row in one step, so a row is never observed half-updated.
#[derive(Debug, Clone, Default)]
pub struct RowStore {
    /// Rows keyed by username.
    rows: HashMap<String, TableRow>,
}

impl RowStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts the row, replacing any row stored for the same username.
    /// Returns the replaced row.
    pub fn upsert(&mut self, row: TableRow) -> Option<TableRow> {
        self.rows.insert(row.username.clone(), row)
    }

    /// Returns the row stored for a username.
    pub fn get(&self, username: &str) -> Option<&TableRow> {
        self.rows.get(username)
    }

    /// Number of stored rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no row has been stored yet.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the stored rows in roster order, each username at most once.
    /// Students without a row yet are skipped, as are stored rows whose
    /// student is not in the roster.
    pub fn rows_for<'a>(&'a self, roster: &'a [Student]) -> impl Iterator<Item = &'a TableRow> {
        roster
            .iter()
            .unique_by(|s| s.username.clone())
            .filter_map(move |s| self.rows.get(&s.username))
    }
}

/// The assembled view: exercise columns in display order plus the rows of
/// every roster student whose progress has arrived.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressTable {
    /// Column exercises, in display order.
    columns: Vec<Exercise>,
    /// Rows, in roster order.
    rows:    Vec<TableRow>,
}

impl ProgressTable {
    /// Assembles a snapshot of the store for the given columns and roster.
    pub fn assemble(columns: &[Exercise], roster: &[Student], store: &RowStore) -> Self {
        Self {
            columns: columns.to_vec(),
            rows:    store.rows_for(roster).cloned().collect(),
        }
    }

    /// Returns the column exercises.
    pub fn columns(&self) -> &[Exercise] {
        &self.columns
    }

    /// Returns the rows.
    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the raw cell values of a row in column order, empty where the
    /// exercise was not attempted.
    pub fn raw_cells<'a>(&'a self, row: &'a TableRow) -> impl Iterator<Item = &'a str> {
        self.columns
            .iter()
            .map(move |e| row.status(e.name()).unwrap_or_default())
    }

    /// Returns the display symbols of a row in column order.
    pub fn symbols<'a>(&'a self, row: &'a TableRow) -> impl Iterator<Item = StatusSymbol> + 'a {
        self.columns.iter().map(move |e| row.symbol(e.name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn latest(entries: &[(&str, &str)]) -> LatestStatusMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn compute_drops_statuses_outside_the_columns() {
        let columns = vec![Exercise::new("loops")];
        let row = TableRow::compute(
            "ann",
            &columns,
            &latest(&[("loops", "SUCCESSFUL"), ("hidden", "ERROR")]),
        );

        assert_eq!(row.status("loops"), Some("SUCCESSFUL"));
        assert_eq!(row.status("hidden"), None);
        assert_eq!(row.symbol("loops"), StatusSymbol::Success);
    }

    #[test]
    fn upsert_is_idempotent() {
        let columns = vec![Exercise::new("loops")];
        let row = TableRow::compute("ann", &columns, &latest(&[("loops", "ERROR")]));

        let mut once = RowStore::new();
        once.upsert(row.clone());
        let mut twice = RowStore::new();
        twice.upsert(row.clone());
        twice.upsert(row.clone());

        assert_eq!(twice.len(), 1);
        assert_eq!(once.get("ann"), twice.get("ann"));
    }

    #[test]
    fn upsert_replaces_only_its_own_row() {
        let columns = vec![Exercise::new("loops")];
        let mut store = RowStore::new();
        store.upsert(TableRow::compute("ann", &columns, &latest(&[("loops", "ERROR")])));
        store.upsert(TableRow::compute("bob", &columns, &latest(&[])));
        let previous =
            store.upsert(TableRow::compute("ann", &columns, &latest(&[("loops", "SUCCESSFUL")])));

        assert_eq!(store.len(), 2);
        assert_eq!(previous.and_then(|r| r.status("loops").map(str::to_string)), Some("ERROR".into()));
        assert_eq!(store.get("ann").and_then(|r| r.status("loops")), Some("SUCCESSFUL"));
        assert!(store.get("bob").is_some());
    }

    #[test]
    fn assemble_follows_roster_order_and_skips_strays() {
        let columns = vec![Exercise::new("loops")];
        let mut store = RowStore::new();
        for name in ["carl", "ann", "stray"] {
            store.upsert(TableRow::compute(name, &columns, &latest(&[])));
        }
        let roster = vec![
            Student::new(1, "ann"),
            Student::new(2, "bob"),
            Student::new(3, "carl"),
        ];

        let table = ProgressTable::assemble(&columns, &roster, &store);
        let order: Vec<_> = table.rows().iter().map(TableRow::username).collect();
        assert_eq!(order, vec!["ann", "carl"]);
    }

    #[test]
    fn repeated_usernames_in_the_roster_give_one_row() {
        let columns = vec![Exercise::new("loops")];
        let mut store = RowStore::new();
        store.upsert(TableRow::compute("ann", &columns, &latest(&[("loops", "ERROR")])));
        store.upsert(TableRow::compute("bob", &columns, &latest(&[])));
        let roster = vec![
            Student::new(1, "ann"),
            Student::new(2, "bob"),
            Student::new(3, "ann"),
        ];

        let table = ProgressTable::assemble(&columns, &roster, &store);
        let order: Vec<_> = table.rows().iter().map(TableRow::username).collect();
        assert_eq!(order, vec!["ann", "bob"]);
        assert!(table.rows().iter().map(TableRow::username).all_unique());
    }
}
