use std::path::PathBuf;

use classboard::{
    board::{Board, BoardOptions},
    export, load_table,
    source::FixtureSource,
    status::StatusSymbol,
};

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join(name)
}

const SINGLE_STUDENT: &str = r#"{
    "students": [{"id": 1, "username": "ann"}],
    "exercises": [{"exercise_name": "loops"}, {"exercise_name": "arrays"}],
    "progress": {
        "ann": {
            "loops": [
                {"progress": {"status": "UNSUCCESSFUL"}},
                {"progress": {"status": "SUCCESSFUL"}}
            ]
        }
    }
}"#;

#[tokio::test]
async fn single_student_board_and_snapshot() {
    let source = FixtureSource::from_json(SINGLE_STUDENT).expect("parse fixture");
    let table = load_table(source, BoardOptions::default()).await;

    let columns: Vec<_> = table.columns().iter().map(|e| e.name()).collect();
    assert_eq!(columns, vec!["arrays", "loops"]);

    let row = &table.rows()[0];
    assert_eq!(row.username(), "ann");
    let symbols: Vec<_> = table.symbols(row).collect();
    assert_eq!(symbols, vec![StatusSymbol::Blank, StatusSymbol::Success]);

    assert_eq!(
        export::to_csv(&table).as_deref(),
        Some("Github Username,arrays,loops\nann,,SUCCESSFUL\n")
    );
}

#[tokio::test]
async fn fixture_file_with_allow_lists() {
    let source = FixtureSource::from_path(fixture_path("class.json"))
        .await
        .expect("load fixture");
    let options = BoardOptions::builder()
        .usernames(vec!["cy".to_string(), "bob".to_string()])
        .exercises(vec!["loops".to_string(), "Maps".to_string(), "retired".to_string()])
        .build();

    let board = Board::new(source, options);
    let view = board.load().await;
    let table = board.table(&view).await;

    // Directory order is kept; columns sort case-insensitively.
    assert_eq!(
        export::to_csv(&table).as_deref(),
        Some("Github Username,loops,Maps\nbob,Error,Incomplete\ncy,,\n")
    );
    assert_eq!(board.store().lock().await.len(), 2);
}

#[tokio::test]
async fn every_student_gets_exactly_one_row() {
    let source = FixtureSource::from_path(fixture_path("class.json"))
        .await
        .expect("load fixture");
    let table = load_table(source, BoardOptions::default()).await;

    let usernames: Vec<_> = table.rows().iter().map(|r| r.username()).collect();
    assert_eq!(usernames, vec!["ann", "bob", "cy"]);

    let bob = &table.rows()[1];
    let symbols: Vec<_> = table.symbols(bob).collect();
    assert_eq!(
        symbols,
        vec![StatusSymbol::Success, StatusSymbol::Error, StatusSymbol::Failure]
    );
    assert_eq!(bob.status("retired"), None);
}

#[tokio::test]
async fn a_repeated_username_yields_a_single_row() {
    let source = FixtureSource::from_json(
        r#"{
            "students": [{"id": 1, "username": "ann"}, {"id": 2, "username": "ann"}],
            "exercises": [{"exercise_name": "loops"}],
            "progress": {"ann": {"loops": [{"progress": {"status": "SUCCESSFUL"}}]}}
        }"#,
    )
    .expect("parse fixture");
    let table = load_table(source, BoardOptions::default()).await;

    assert_eq!(table.rows().len(), 1);
    assert_eq!(
        export::to_csv(&table).as_deref(),
        Some("Github Username,loops\nann,SUCCESSFUL\n")
    );
}
