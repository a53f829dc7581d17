//! Reads the shared rainfall fixtures from disk.
#![expect(clippy::expect_used, reason = "tests fail fast on fixture errors")]

use rdfcube_core::{Table, Value};
use rdfcube_providers_csv::{CsvOptions, CsvTable, CsvTableError};
use rdfcube_test_support::fixtures::{
    DATA_CSV_SEMICOLON, DescriptionFiles, write_cube_directory, write_cube_directory_with,
};
use rstest::rstest;

fn column<'a>(table: &'a CsvTable, name: &str) -> Vec<&'a Value> {
    let index = table.column_index(name).expect("column exists");
    (0..table.row_count())
        .map(|row| table.cell(row, index).expect("in bounds"))
        .collect()
}

#[test]
fn default_conventions_read_the_fixture() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = write_cube_directory(dir.path(), DescriptionFiles::None).expect("fixture");
    let table = CsvTable::from_path(&root.join("data.csv"), &CsvOptions::new()).expect("reads");

    assert_eq!(table.name(), "data.csv");
    assert_eq!(table.columns(), ["Jahr", "Station", "Wert", "Standardfehler"]);
    assert_eq!(table.row_count(), 4);
    assert_eq!(
        column(&table, "Wert"),
        [
            &Value::Decimal(812.5),
            &Value::Integer(1000),
            &Value::Decimal(790.25),
            &Value::Missing
        ]
    );
    assert_eq!(column(&table, "Standardfehler")[1], &Value::Missing);
    assert_eq!(column(&table, "Station")[1], &Value::Text("Zürich".into()));
}

#[rstest]
#[case::custom_na(CsvOptions::new().with_separator(';').with_decimal(',').with_na_values(["-"]), Value::Missing)]
#[case::default_na(CsvOptions::new().with_separator(';').with_decimal(','), Value::Text("-".into()))]
fn semicolon_files_honour_their_conventions(#[case] options: CsvOptions, #[case] dash: Value) {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = write_cube_directory_with(dir.path(), DescriptionFiles::None, DATA_CSV_SEMICOLON)
        .expect("fixture");
    let table = CsvTable::from_path(&root.join("data.csv"), &options).expect("reads");

    assert_eq!(column(&table, "Wert")[0], &Value::Decimal(812.5));
    assert_eq!(column(&table, "Standardfehler")[2], &Value::Decimal(1.1));
    assert_eq!(column(&table, "Standardfehler")[1], &dash);
}

#[test]
fn missing_files_report_their_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("absent.csv");
    let err = CsvTable::from_path(&path, &CsvOptions::new()).expect_err("file is absent");
    assert!(matches!(err, CsvTableError::Io { path: ref p, .. } if *p == path));
}
