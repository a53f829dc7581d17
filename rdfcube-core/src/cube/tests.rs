//! Unit tests for the cube lifecycle.

use super::*;

use crate::builder::CubeBuilder;
use crate::table::{MemoryTable, Value};
use rdfcube_test_support::fixtures::DESCRIPTION_YAML;
use rstest::{fixture, rstest};

fn text(value: &str) -> Value {
    Value::Text(value.to_owned())
}

fn rainfall_rows() -> Vec<Vec<Value>> {
    vec![
        vec![Value::Integer(2020), text("Bern"), Value::Decimal(812.5), Value::Decimal(1.2)],
        vec![Value::Integer(2020), text("Zürich"), Value::Integer(1000), Value::Missing],
        vec![Value::Integer(2021), text("Bern"), Value::Decimal(790.25), Value::Decimal(1.1)],
        vec![Value::Integer(2021), text("Zürich"), Value::Missing, Value::Decimal(0.9)],
    ]
}

fn table(rows: Vec<Vec<Value>>) -> MemoryTable {
    MemoryTable::try_new(
        "data.csv",
        ["Jahr", "Station", "Wert", "Standardfehler"]
            .map(String::from)
            .to_vec(),
        rows,
    )
    .expect("rows match the header")
}

fn description() -> CubeDescription {
    CubeDescription::from_yaml_str(DESCRIPTION_YAML).expect("fixture is valid")
}

#[fixture]
fn cube() -> Cube<MemoryTable> {
    CubeBuilder::new()
        .build(table(rainfall_rows()), description())
        .expect("fixture builds")
}

fn written(mut cube: Cube<MemoryTable>) -> String {
    cube.prepare_data().expect("prepares");
    cube.write_cube().expect("writes cube");
    cube.write_observations().expect("writes observations");
    cube.write_shape().expect("writes shape");
    cube.to_turtle_string().expect("renders")
}

#[rstest]
fn cube_iris_follow_base_identifier_and_version(cube: Cube<MemoryTable>) {
    assert_eq!(cube.iris().cube.as_str(), "https://example.org/cube/rainfall/1");
    assert_eq!(cube.iris().shape.as_str(), "https://example.org/cube/rainfall/1/shape");
    assert_eq!(
        cube.iris().observation_set.as_str(),
        "https://example.org/cube/rainfall/1/ObservationSet"
    );
    assert_eq!(cube.observer(), "https://example.org/org/creator");
}

#[rstest]
#[case::write_cube(|c: &mut Cube<MemoryTable>| c.write_cube())]
#[case::write_observations(|c: &mut Cube<MemoryTable>| c.write_observations())]
#[case::write_shape(|c: &mut Cube<MemoryTable>| c.write_shape())]
#[case::serialize(|c: &mut Cube<MemoryTable>| c.to_turtle_string().map(drop))]
fn write_steps_require_prepared_data(
    mut cube: Cube<MemoryTable>,
    #[case] step: fn(&mut Cube<MemoryTable>) -> Result<()>,
) {
    let err = step(&mut cube).expect_err("step must fail before prepare_data");
    assert_eq!(err.code(), crate::CubeErrorCode::NotPrepared);
    assert!(cube.graph().is_empty());
}

#[rstest]
fn observation_iris_escape_key_values(mut cube: Cube<MemoryTable>) {
    cube.prepare_data().expect("prepares");
    let iris: Vec<&str> = cube.observation_iris().iter().map(NamedNode::as_str).collect();
    assert_eq!(
        iris,
        [
            "https://example.org/cube/rainfall/1/observation/2020_Bern",
            "https://example.org/cube/rainfall/1/observation/2020_Z%C3%BCrich",
            "https://example.org/cube/rainfall/1/observation/2021_Bern",
            "https://example.org/cube/rainfall/1/observation/2021_Z%C3%BCrich",
        ]
    );
}

#[rstest]
fn metadata_describes_the_cube(cube: Cube<MemoryTable>) {
    let turtle = written(cube);
    for expected in [
        "<https://example.org/cube/rainfall/1>\n    a cube:Cube, schema:Dataset, dcat:Dataset ;",
        "schema:name \"Niederschlag\"@de, \"Rainfall\"@en ;",
        "schema:creator <https://example.org/org/creator> ;",
        "schema:dateCreated \"2024-08-26\"^^xsd:date ;",
        "schema:version 1 ;",
        "schema:identifier \"rainfall\" ;",
        "schema:creativeWorkStatus <https://ld.admin.ch/vocabulary/CreativeWorkStatus/Draft> ;",
        "schema:workExample <https://ld.admin.ch/application/visualize> ;",
        "dct:accrualPeriodicity freq:ANNUAL ;",
        "cube:observationConstraint <https://example.org/cube/rainfall/1/shape> .",
        "<https://example.org/person/ada>\n    schema:name \"Ada\" .",
    ] {
        assert!(turtle.contains(expected), "missing `{expected}` in:\n{turtle}");
    }
}

#[rstest]
fn observations_carry_one_value_per_dimension(cube: Cube<MemoryTable>) {
    let turtle = written(cube);
    let expected = "<https://example.org/cube/rainfall/1/observation/2020_Bern>\n    \
                    a cube:Observation ;\n    \
                    cube:observedBy <https://example.org/org/creator> ;\n    \
                    <https://example.org/year> \"2020\"^^xsd:gYear ;\n    \
                    <https://example.org/station> <https://example.org/station/Bern> ;\n    \
                    <https://example.org/value> \"812.5\"^^xsd:decimal ;\n    \
                    <https://example.org/standard-error> \"1.2\"^^xsd:decimal .\n";
    assert!(turtle.contains(expected), "unexpected observation:\n{turtle}");
    assert!(turtle.contains(
        "<https://example.org/value> \"\"^^cube:Undefined ;"
    ));
}

#[rstest]
fn shape_constrains_every_dimension(cube: Cube<MemoryTable>) {
    let turtle = written(cube);
    for expected in [
        "a cube:Constraint, sh:NodeShape ;",
        "sh:closed true ;",
        "sh:in ( <https://example.org/station/Bern> <https://example.org/station/Z%C3%BCrich> )",
        "sh:minInclusive \"790.25\"^^xsd:decimal ;",
        "sh:maxInclusive \"1000\"^^xsd:decimal ;",
        "qudt:hasUnit unit:MilliM",
        "qudt:scaleType qudt:NominalScale ;",
        "time:unitType time:unitYear",
        "sh:or ( [\n",
        "sh:datatype cube:Undefined",
        "a relation:StandardError ;",
        "meta:relatesTo <https://example.org/value>",
    ] {
        assert!(turtle.contains(expected), "missing `{expected}` in:\n{turtle}");
    }
    // Jahr is interval-scaled and never missing
    assert!(turtle.contains("sh:datatype xsd:gYear ;"));
}

#[rstest]
fn repeated_write_steps_do_not_duplicate_triples(mut cube: Cube<MemoryTable>) {
    cube.prepare_data().expect("prepares");
    cube.write_cube().expect("writes cube");
    cube.write_observations().expect("writes observations");
    let once = cube.graph().len();
    cube.write_cube().expect("second write is a no-op");
    cube.write_observations().expect("second write is a no-op");
    assert_eq!(cube.graph().len(), once);
}

#[test]
fn reject_policy_fails_on_missing_measures() {
    let mut cube = CubeBuilder::new()
        .with_missing_values(MissingValuePolicy::Reject)
        .build(table(rainfall_rows()), description())
        .expect("fixture builds");
    let err = cube.prepare_data().expect_err("Wert is missing in row 3");
    assert!(matches!(
        err,
        CubeError::MissingValue { ref dimension, row: 3 } if dimension == "Wert"
    ));
    assert!(!cube.is_prepared());
}

#[test]
fn missing_key_cells_are_rejected() {
    let mut rows = rainfall_rows();
    rows[1][1] = Value::Missing;
    let mut cube = CubeBuilder::new()
        .build(table(rows), description())
        .expect("fixture builds");
    let err = cube.prepare_data().expect_err("Station is missing in row 1");
    assert!(matches!(
        err,
        CubeError::MissingKeyValue { ref dimension, row: 1 } if dimension == "Station"
    ));
}

#[test]
fn missing_columns_are_reported_with_the_table_name() {
    let table = MemoryTable::try_new(
        "partial.csv",
        vec!["Jahr".into(), "Station".into()],
        vec![vec![Value::Integer(2020), text("Bern")]],
    )
    .expect("rows match the header");
    let mut cube = CubeBuilder::new()
        .build(table, description())
        .expect("fixture builds");
    let err = cube.prepare_data().expect_err("Wert has no column");
    assert!(matches!(
        err,
        CubeError::MissingColumn { ref table, ref dimension }
            if &**table == "partial.csv" && dimension == "Wert"
    ));
}

#[rstest]
#[case::bad_year(0, 0, text("twenty"), "gYear")]
#[case::text_measure(2, 2, text("lots"), "decimal")]
fn declared_datatypes_reject_foreign_values(
    #[case] row: usize,
    #[case] column: usize,
    #[case] value: Value,
    #[case] label: &str,
) {
    let mut rows = rainfall_rows();
    rows[row][column] = value;
    let mut raw = DESCRIPTION_YAML.to_owned();
    if column == 2 {
        raw = raw.replacen("path: value\n", "path: value\n    datatype: decimal\n", 1);
    }
    let description = CubeDescription::from_yaml_str(&raw).expect("fixture is valid");
    let mut cube = CubeBuilder::new()
        .build(table(rows), description)
        .expect("fixture builds");
    let err = cube.prepare_data().expect_err("value does not fit the datatype");
    assert!(
        matches!(err, CubeError::InvalidValue { row: r, datatype, .. } if r == row && datatype == label),
        "unexpected error: {err:?}"
    );
}

#[test]
fn replace_mappings_reject_unmapped_values() {
    let raw = DESCRIPTION_YAML.replacen(
        "      type: additive\n      base: https://example.org/station/\n",
        "      type: replace\n      replacements:\n        Bern: https://example.org/station/BE\n",
        1,
    );
    let description = CubeDescription::from_yaml_str(&raw).expect("fixture is valid");
    let mut cube = CubeBuilder::new()
        .build(table(rainfall_rows()), description)
        .expect("fixture builds");
    let err = cube.prepare_data().expect_err("Zürich is not mapped");
    assert!(matches!(
        err,
        CubeError::InvalidValue { ref value, row: 1, .. } if value == "Zürich"
    ));
}

#[test]
fn duplicate_rows_are_rejected() {
    let mut rows = rainfall_rows();
    rows[2][0] = Value::Integer(2020);
    let mut cube = CubeBuilder::new()
        .build(table(rows), description())
        .expect("fixture builds");
    let err = cube.prepare_data().expect_err("2020/Bern appears twice");
    assert_eq!(err.code(), crate::CubeErrorCode::DuplicateObservation);
}

#[test]
fn malformed_language_tags_fail_before_any_output() {
    let raw = DESCRIPTION_YAML.replacen("Name: { de: Niederschlag", "Name: { de CH: Niederschlag", 1);
    let description = CubeDescription::from_yaml_str(&raw).expect("YAML parses");
    let err = CubeBuilder::new()
        .build(table(rainfall_rows()), description)
        .expect_err("`de CH` is not a language tag");
    assert_eq!(
        err.description_code(),
        Some(crate::DescriptionErrorCode::InvalidLanguageTag)
    );
}

#[rstest]
fn rendered_cube_parses_back_to_the_same_triple_count(mut cube: Cube<MemoryTable>) {
    cube.prepare_data().expect("prepares");
    cube.write_cube().expect("writes cube");
    cube.write_observations().expect("writes observations");
    cube.write_shape().expect("writes shape");
    let turtle = cube.to_turtle_string().expect("renders");
    let parsed = oxttl::TurtleParser::new()
        .for_slice(turtle.as_bytes())
        .collect::<core::result::Result<Vec<_>, _>>()
        .expect("output is valid Turtle");
    assert_eq!(parsed.len(), cube.graph().len());
}

#[rstest]
fn display_summarises_the_cube(cube: Cube<MemoryTable>) {
    let mut cube = cube;
    cube.prepare_data().expect("prepares");
    cube.write_cube().expect("writes cube");
    let rendered = cube.to_string();
    assert!(rendered.starts_with("Cube <https://example.org/cube/rainfall/1>\n"));
    assert!(rendered.contains("  name: Rainfall\n"));
    assert!(rendered.contains("  table: data.csv\n"));
    assert!(rendered.contains("  observations: 4\n"));
    assert!(rendered.contains("  dimensions: 2 key, 1 measure, 1 annotation\n"));
    assert!(rendered.contains(&format!("  triples: {}", cube.graph().len())));
}

#[rstest]
fn serialize_writes_the_turtle_file(cube: Cube<MemoryTable>) {
    let mut cube = cube;
    cube.prepare_data().expect("prepares");
    cube.write_cube().expect("writes cube");
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("cube.ttl");
    cube.serialize(&path).expect("serializes");
    let written = std::fs::read_to_string(&path).expect("file exists");
    assert_eq!(written, cube.to_turtle_string().expect("renders"));
}

#[rstest]
fn serialize_reports_the_failing_path(cube: Cube<MemoryTable>) {
    let mut cube = cube;
    cube.prepare_data().expect("prepares");
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("missing").join("cube.ttl");
    let err = cube.serialize(&path).expect_err("parent directory does not exist");
    assert!(matches!(err, CubeError::Io { path: ref p, .. } if *p == path));
}
