//! End-to-end runs of the pipeline on temporary project directories.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use flate2::Compression;
use flate2::write::GzEncoder;
use polars::prelude::{DataFrame, DataType, ParquetReader, SerReader};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

use consult_cli::pipeline::{PipelineConfig, RunResult, error_category, run};
use consult_model::{ErrorCategory, MonthlyProportion};

const PATIENTS_HEADER: &str = "patient_id,birth_date,gender\n";
const CONSULTATIONS_HEADER: &str = "consultation_id,patient_id,date_consultation,diagnostic\n";

fn project(patients: &str, consultations: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    let inputs = dir.path().join("inputs");
    std::fs::create_dir_all(&inputs).unwrap();

    let file = File::create(inputs.join("patients.csv.gz")).unwrap();
    let mut encoder = GzEncoder::new(file, Compression::default());
    encoder.write_all(PATIENTS_HEADER.as_bytes()).unwrap();
    encoder.write_all(patients.as_bytes()).unwrap();
    encoder.finish().unwrap();

    let file = File::create(inputs.join("consultations.csv.zip")).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    writer
        .start_file("consultations.csv", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(CONSULTATIONS_HEADER.as_bytes()).unwrap();
    writer.write_all(consultations.as_bytes()).unwrap();
    writer.finish().unwrap();

    dir
}

fn run_in(dir: &TempDir) -> RunResult {
    run(&PipelineConfig::from_root(dir.path())).unwrap()
}

fn read(path: &Path) -> DataFrame {
    ParquetReader::new(File::open(path).unwrap()).finish().unwrap()
}

fn months_and_shares(df: &DataFrame) -> Vec<(String, f64)> {
    let months = df.column("mois_consultation").unwrap().str().unwrap();
    let shares = df.column("proportion_patient_id_valide").unwrap().f64().unwrap();
    months
        .into_iter()
        .zip(shares)
        .map(|(month, share)| (month.unwrap().to_string(), share.unwrap()))
        .collect()
}

#[test]
fn single_valid_consultation_gives_full_share() {
    let dir = project("P1,01/01/1980,M\n", "C1,P1,15/03/2023,flu\n");

    let result = run_in(&dir);

    assert_eq!(result.months, vec![MonthlyProportion::new("2023-03", 1, 1)]);
    let proportions = read(&result.outputs.proportions);
    assert_eq!(proportions.width(), 2);
    assert_eq!(
        months_and_shares(&proportions),
        vec![("2023-03".to_string(), 1.0)]
    );
}

#[test]
fn unknown_patient_halves_the_month() {
    let dir = project(
        "P1,01/01/1980,M\n",
        "C1,P1,15/03/2023,flu\nC2,P2,20/03/2023,cold\n",
    );

    let result = run_in(&dir);

    assert_eq!(result.orphans, 1);
    assert_eq!(
        months_and_shares(&read(&result.outputs.proportions)),
        vec![("2023-03".to_string(), 0.5)]
    );
}

#[test]
fn sentinel_date_leaves_every_denominator() {
    let dir = project(
        "P1,01/01/1980,M\n",
        "C1,P1,15/03/2023,flu\nC2,P1,not_a_date,flu\nC3,P1,02/04/2023,nnull\n",
    );

    let result = run_in(&dir);

    assert_eq!(result.undated, 1);
    assert_eq!(result.cleared, 2);
    assert_eq!(result.unparsed_dates, 0);
    assert_eq!(
        result.months,
        vec![
            MonthlyProportion::new("2023-03", 1, 1),
            MonthlyProportion::new("2023-04", 1, 1),
        ]
    );

    let consultations = read(&result.outputs.consultations);
    assert_eq!(consultations.height(), 3);
    let dates = consultations.column("date_consultation").unwrap();
    assert_eq!(dates.dtype(), &DataType::Date);
    assert_eq!(dates.null_count(), 1);
    assert_eq!(consultations.column("diagnostic").unwrap().null_count(), 1);
}

#[test]
fn malformed_consultation_dates_are_counted_and_undated() {
    let dir = project(
        "P1,01/01/1980,M\nP2,someday,F\n",
        "C1,P1,15/03/2023,flu\nC2,P1,15/03/23,flu\nC3,P2,16/03/2023,flu\n",
    );

    let result = run_in(&dir);

    assert_eq!(result.cleared, 0);
    assert_eq!(result.unparsed_dates, 2);
    assert_eq!(result.undated, 1);
    assert_eq!(result.months, vec![MonthlyProportion::new("2023-03", 2, 2)]);
    assert_eq!(
        months_and_shares(&read(&result.outputs.proportions)),
        vec![("2023-03".to_string(), 1.0)]
    );
}

#[test]
fn truncated_row_is_a_parse_error() {
    let dir = project("P1,01/01/1980,M\n", "C1,P1,15/03/2023,flu\nC2,P1\n");
    let config = PipelineConfig::from_root(dir.path());

    let error = run(&config).unwrap_err();

    assert_eq!(error_category(&error), Some(ErrorCategory::Parse));
    assert!(!config.outputs_dir.exists());
}

#[test]
fn blank_patient_id_is_missing_and_never_matches() {
    let dir = project(
        "   ,01/01/1980,F\nP1,N/ A,unknown\n",
        "C1,   ,15/03/2023,flu\nC2,P1,16/03/2023,flu\n",
    );

    let result = run_in(&dir);

    assert_eq!(result.orphans, 1);
    assert_eq!(result.months, vec![MonthlyProportion::new("2023-03", 1, 2)]);

    let patients = read(&result.outputs.patients);
    assert_eq!(patients.height(), 2);
    assert_eq!(patients.column("patient_id").unwrap().null_count(), 1);
    assert_eq!(patients.column("birth_date").unwrap().null_count(), 1);
    assert_eq!(patients.column("gender").unwrap().null_count(), 1);
}

#[test]
fn identical_inputs_give_identical_outputs() {
    let dir = project(
        "P1,01/01/1980,M\nP2,1975-06-30,F\n",
        "C1,P1,15/03/2023,flu\nC2,P3,20/03/2023,cold\nC3,P2,01/05/2023,flu\n",
    );

    let first = run_in(&dir);
    let first_tables: Vec<DataFrame> = first.outputs.iter().map(read).collect();
    let second = run_in(&dir);
    let second_tables: Vec<DataFrame> = second.outputs.iter().map(read).collect();

    assert_eq!(first.months, second.months);
    for (before, after) in first_tables.iter().zip(&second_tables) {
        assert!(before.equals_missing(after));
    }
}

#[test]
fn identifiers_keep_their_spelling() {
    let dir = project("007,01/01/1980,M\n", "C1,007,15/03/2023,flu\n");

    let result = run_in(&dir);

    let patients = read(&result.outputs.patients);
    let ids = patients.column("patient_id").unwrap().str().unwrap();
    assert_eq!(ids.get(0), Some("007"));
    assert_eq!(result.months, vec![MonthlyProportion::new("2023-03", 1, 1)]);
}

#[test]
fn missing_input_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    let config = PipelineConfig::from_root(dir.path());

    let error = run(&config).unwrap_err();

    assert_eq!(error_category(&error), Some(ErrorCategory::Io));
    assert!(!config.outputs_dir.exists());
}

#[test]
fn missing_column_is_a_schema_error() {
    let dir = TempDir::new().unwrap();
    let inputs = dir.path().join("inputs");
    std::fs::create_dir_all(&inputs).unwrap();
    let file = File::create(inputs.join("patients.csv.gz")).unwrap();
    let mut encoder = GzEncoder::new(file, Compression::default());
    encoder.write_all(b"patient_id,birth_date\nP1,01/01/1980\n").unwrap();
    encoder.finish().unwrap();
    let file = File::create(inputs.join("consultations.csv.zip")).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    writer
        .start_file("consultations.csv", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(CONSULTATIONS_HEADER.as_bytes()).unwrap();
    writer.finish().unwrap();

    let error = run(&PipelineConfig::from_root(dir.path())).unwrap_err();

    assert_eq!(error_category(&error), Some(ErrorCategory::Schema));
    assert!(format!("{error:#}").contains("gender"));
}
