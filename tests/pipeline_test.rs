//! End-to-end pipeline tests: run logs on disk → summaries → report

use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Float64Array, Int64Array, RecordBatch, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use parquet::arrow::ArrowWriter;
use runstat::aggregate::{aggregate, MetricMeans};
use runstat::config::ReportConfig;
use runstat::domain::{ScheduleMetric, SchedulingDomain, SearchDomain, SearchMetric};
use runstat::experiment::RecordStore;
use runstat::report::summary_string;
use runstat::{pipeline, Error};

fn write_file(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    let mut file = fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

// =============================================================================
// Scenario A: mixed outcomes across two heuristics
// =============================================================================

const SCENARIO_A: &str = "\
Run,Heuristic,TimeTaken,PathLength,NodesExpanded,PathFound
1,H1,1.0,10,100,Yes
1,H1,,,,No
1,H2,2.0,20,200,Yes
";

#[test]
fn test_scenario_a() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_file(dir.path(), "performance_data.csv", SCENARIO_A);

    let store = RecordStore::load::<SearchDomain>(&input).unwrap();
    let aggregation = aggregate(store.records()).unwrap();

    let h1 = aggregation.get("H1").unwrap();
    assert_eq!(h1.total_runs(), 2);
    assert!((h1.success_rate() - 0.5).abs() < f64::EPSILON);
    assert_eq!(h1.means().get(SearchMetric::TimeTaken), Some(1.0));
    assert_eq!(h1.means().get(SearchMetric::PathLength), Some(10.0));
    assert_eq!(h1.means().get(SearchMetric::NodesExpanded), Some(100.0));

    let h2 = aggregation.get("H2").unwrap();
    assert!((h2.success_rate() - 1.0).abs() < f64::EPSILON);
    assert_eq!(h2.means().get(SearchMetric::TimeTaken), Some(2.0));

    let text = summary_string::<SearchDomain>(&aggregation);
    let h1_pos = text.find("H1 Heuristic:").unwrap();
    let h2_pos = text.find("H2 Heuristic:").unwrap();
    assert!(h1_pos < h2_pos, "variants must print in first-appearance order");
    assert!(text.contains("  Success Rate: 50.00%\n  Avg Time: 1.000000s\n"));
}

// =============================================================================
// Scenario B: a method that never succeeds
// =============================================================================

const SCENARIO_B: &str = "\
Run,Method,TimeTaken,BacktrackCount,Assignments,SolutionFound
1,Backtracking,0.8,0,0,No
1,ForwardChecking,0.1,3,40,Yes
2,Backtracking,0.9,0,0,No
3,Backtracking,0.7,0,0,No
";

#[test]
fn test_scenario_b() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_file(dir.path(), "performance_data.csv", SCENARIO_B);

    let store = RecordStore::load::<SchedulingDomain>(&input).unwrap();
    let aggregation = aggregate(store.records()).unwrap();

    let bt = aggregation.get("Backtracking").unwrap();
    assert_eq!(bt.total_runs(), 3);
    assert_eq!(bt.successful_runs(), 0);
    assert!(bt.success_rate().abs() < f64::EPSILON);
    assert_eq!(bt.means(), &MetricMeans::Unavailable);

    let fc = aggregation.get("ForwardChecking").unwrap();
    assert_eq!(fc.means().get(ScheduleMetric::Assignments), Some(40.0));

    let text = summary_string::<SchedulingDomain>(&aggregation);
    let expected_bt = "\nBacktracking:\n  Success Rate: 0.00%\n\nForwardChecking:\n";
    assert!(text.contains(expected_bt), "unexpected summary:\n{text}");
}

#[test]
fn test_unavailable_means_serialize_distinctly_from_zero() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_file(dir.path(), "performance_data.csv", SCENARIO_B);

    let store = RecordStore::load::<SchedulingDomain>(&input).unwrap();
    let aggregation = aggregate(store.records()).unwrap();
    let json = serde_json::to_value(aggregation.get("Backtracking").unwrap()).unwrap();

    assert_eq!(json["means"], serde_json::json!("Unavailable"));
    assert_eq!(json["success_rate"], serde_json::json!(0.0));
}

// =============================================================================
// Stage ordering and error propagation
// =============================================================================

#[test]
fn test_missing_column_fails_before_aggregation() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_file(
        dir.path(),
        "performance_data.csv",
        "Run,Heuristic,TimeTaken,PathLength,PathFound\n1,H1,1.0,10,Yes\n",
    );
    let output = dir.path().join("performance_comparison.png");
    let config = ReportConfig::for_domain::<SearchDomain>()
        .input(&input)
        .output(&output);

    let mut out: Vec<u8> = Vec::new();
    let err = pipeline::run::<SearchDomain, _>(&config, &mut out).unwrap_err();

    assert!(matches!(err, Error::DataSource { .. }));
    assert!(err.to_string().contains("NodesExpanded"));
    assert!(!output.exists(), "no chart may be written after a load error");
    assert!(out.is_empty(), "no summary may be written after a load error");
}

#[test]
fn test_missing_input_is_data_source_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = ReportConfig::for_domain::<SchedulingDomain>()
        .input(dir.path().join("performance_data.csv"))
        .output(dir.path().join("chart.png"));

    let err = pipeline::run::<SchedulingDomain, _>(&config, &mut Vec::<u8>::new()).unwrap_err();
    assert!(matches!(err, Error::DataSource { .. }));
}

#[test]
fn test_aggregation_error_stops_before_render() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_file(
        dir.path(),
        "performance_data.csv",
        "Method,SolutionFound,TimeTaken,BacktrackCount,Assignments\nBacktracking,Yes,0.1,many,4\n",
    );
    let output = dir.path().join("chart.png");
    let config = ReportConfig::for_domain::<SchedulingDomain>()
        .input(&input)
        .output(&output);

    let mut out: Vec<u8> = Vec::new();
    let err = pipeline::run::<SchedulingDomain, _>(&config, &mut out).unwrap_err();

    match &err {
        Error::Aggregation { variant, column, .. } => {
            assert_eq!(variant, "Backtracking");
            assert_eq!(column, "BacktrackCount");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!output.exists());
    assert!(out.is_empty());
}

#[test]
fn test_render_error_keeps_summaries() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_file(dir.path(), "performance_data.csv", SCENARIO_A);
    let config = ReportConfig::for_domain::<SearchDomain>()
        .input(&input)
        .output(dir.path().join("missing-dir").join("chart.png"));

    let aggregation = pipeline::prepare::<SearchDomain>(&config).unwrap();
    let before = aggregation.clone();

    let mut out: Vec<u8> = Vec::new();
    let err = pipeline::render::<SearchDomain, _>(&aggregation, &config, &mut out).unwrap_err();

    assert!(matches!(err, Error::Render { .. }));
    assert_eq!(aggregation, before);
    assert_eq!(
        String::from_utf8(out).unwrap(),
        summary_string::<SearchDomain>(&aggregation)
    );

    // A second attempt renders from the same aggregation
    let mut retry: Vec<u8> = Vec::new();
    let again = pipeline::render::<SearchDomain, _>(&aggregation, &config, &mut retry);
    assert!(matches!(again, Err(Error::Render { .. })));
    assert!(!retry.is_empty());
}

#[test]
fn test_run_with_unwritable_chart_still_prints_summary() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_file(dir.path(), "performance_data.csv", SCENARIO_B);
    let output = dir.path().join("missing-dir").join("chart.png");
    let config = ReportConfig::for_domain::<SchedulingDomain>()
        .input(&input)
        .output(&output);

    let mut out: Vec<u8> = Vec::new();
    let err = pipeline::run::<SchedulingDomain, _>(&config, &mut out).unwrap_err();

    match &err {
        Error::Render { path, reason } => {
            assert_eq!(path, &output);
            assert!(reason.contains("not writable"));
        }
        other => panic!("unexpected error: {other}"),
    }
    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("CSP Performance Summary:\n"));
    assert!(text.contains("\nBacktracking:\n  Success Rate: 0.00%\n"));
    assert!(!output.exists());
}

#[test]
fn test_prepare_matches_manual_load_and_aggregate() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_file(dir.path(), "performance_data.csv", SCENARIO_A);
    let config = ReportConfig::for_domain::<SearchDomain>().input(&input);

    let prepared = pipeline::prepare::<SearchDomain>(&config).unwrap();
    let store = RecordStore::load::<SearchDomain>(&input).unwrap();

    assert_eq!(prepared, aggregate(store.records()).unwrap());
}

// =============================================================================
// Parquet sources
// =============================================================================

#[test]
fn test_parquet_source_with_native_numeric_columns() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("runs.parquet");

    let schema = Arc::new(Schema::new(vec![
        Field::new("Heuristic", DataType::Utf8, false),
        Field::new("PathFound", DataType::Utf8, true),
        Field::new("TimeTaken", DataType::Float64, true),
        Field::new("PathLength", DataType::Int64, true),
        Field::new("NodesExpanded", DataType::Int64, true),
    ]));
    let batch = RecordBatch::try_new(
        Arc::clone(&schema),
        vec![
            Arc::new(StringArray::from(vec!["Manhattan", "Manhattan", "Euclidean"])),
            Arc::new(StringArray::from(vec![Some("Yes"), None, Some("Yes")])),
            Arc::new(Float64Array::from(vec![Some(0.5), None, Some(1.5)])),
            Arc::new(Int64Array::from(vec![Some(12), None, None])),
            Arc::new(Int64Array::from(vec![Some(30), Some(0), Some(50)])),
        ],
    )
    .unwrap();

    let file = fs::File::create(&path).unwrap();
    let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    let store = RecordStore::load::<SearchDomain>(&path).unwrap();
    assert_eq!(store.len(), 3);
    assert_eq!(store.variants(), vec!["Manhattan", "Euclidean"]);

    let aggregation = aggregate(store.records()).unwrap();
    let manhattan = aggregation.get("Manhattan").unwrap();
    assert!((manhattan.success_rate() - 0.5).abs() < f64::EPSILON);
    assert_eq!(manhattan.means().get(SearchMetric::PathLength), Some(12.0));

    // Path length absent on Euclidean's only successful run
    let euclidean = aggregation.get("Euclidean").unwrap();
    assert!(euclidean.means().is_available());
    assert_eq!(euclidean.means().get(SearchMetric::PathLength), None);
    assert_eq!(euclidean.means().get(SearchMetric::NodesExpanded), Some(50.0));
}
