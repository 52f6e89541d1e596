use chrono::NaiveDate;
use kiosk_anomaly_analysis::AnomalyPipeline;
use kiosk_anomaly_core::{AnalysisConfig, AnomalySet, DataConfig, EntityKind, KioskId, ProductId};
use kiosk_anomaly_data::EventLoader;
use std::process::Command;

const SAMPLE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/sample.csv");

fn dip_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 25).unwrap()
}

fn sample_pipeline() -> AnomalyPipeline {
    let feed = EventLoader::from_path(SAMPLE, &DataConfig::default()).expect("Failed to load test data");
    AnomalyPipeline::run(feed.events(), &AnalysisConfig::default()).expect("Pipeline failed")
}

#[test]
fn test_sample_log_loads_with_offsets_stripped() {
    let feed = EventLoader::from_path(SAMPLE, &DataConfig::default()).unwrap();
    assert_eq!(feed.len(), 344);

    let (first, last) = feed.time_span().unwrap();
    assert_eq!(first.to_string(), "2024-03-04 08:00:00");
    assert_eq!(last.date(), NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());
}

#[test]
fn test_weekly_pipeline_flags_empty_day() {
    let pipeline = sample_pipeline();
    let expected: AnomalySet = [dip_day()].into_iter().collect();

    assert_eq!(pipeline.get_anomalies(KioskId(1).into(), 2.0).unwrap(), expected);
    assert_eq!(pipeline.get_anomalies(ProductId(10).into(), 2.0).unwrap(), expected);
    assert_eq!(pipeline.get_anomalies(ProductId(11).into(), 2.0).unwrap(), expected);

    // Kiosk 2 sells the same amount every day.
    assert!(pipeline.get_anomalies(KioskId(2).into(), 2.0).unwrap().is_empty());
}

#[test]
fn test_every_series_accounts_for_every_event() {
    let pipeline = sample_pipeline();
    let mut kiosk_total = 0;
    for entity in pipeline.entities(EntityKind::Kiosk).unwrap() {
        let series = pipeline.series(entity).unwrap();
        assert_eq!(series.len(), 28);
        kiosk_total += series.total();
    }
    assert_eq!(kiosk_total, 344);

    let product_total: u64 = pipeline
        .entities(EntityKind::Product)
        .unwrap()
        .into_iter()
        .map(|e| pipeline.series(e).unwrap().total())
        .sum();
    assert_eq!(product_total, 344);
}

#[test]
fn test_decomposition_reassembles_observed() {
    let pipeline = sample_pipeline();
    let result = pipeline.get_decomposition(KioskId(1).into()).unwrap();
    for point in result.points() {
        if let (Some(t), Some(r)) = (point.trend, point.resid) {
            assert!((t + point.seasonal + r - point.observed).abs() < 1e-9);
        }
    }
}

#[test]
fn test_unknown_entity_is_not_found() {
    let pipeline = sample_pipeline();
    assert!(pipeline.get_decomposition(KioskId(3).into()).unwrap_err().is_not_found());
}

#[test]
fn test_cli_detect_prints_dates() {
    let output = Command::new(env!("CARGO_BIN_EXE_kiosk-anomaly"))
        .args(["--config", "no/such/config.toml", "--data", SAMPLE])
        .args(["detect", "--kind", "kiosk", "--id", "1"])
        .env("RUST_LOG", "warn")
        .output()
        .expect("Failed to run binary");

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "Kiosk 1 Anomaly Events:\n2024-03-25\n"
    );
}

#[test]
fn test_cli_rejects_period_longer_than_half_range() {
    let output = Command::new(env!("CARGO_BIN_EXE_kiosk-anomaly"))
        .args(["--config", "no/such/config.toml", "--data", SAMPLE, "--period", "15"])
        .args(["scan"])
        .env("RUST_LOG", "off")
        .output()
        .expect("Failed to run binary");

    assert!(!output.status.success());
}
