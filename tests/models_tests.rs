// JSON shape of the domain models

mod common;

use common::{DAY0_MS, sample, untimestamped};
use stationhealth::models::{HealthStatus, LifecycleStatus, MetricType, Sample, Station};

#[test]
fn test_sample_serializes_camel_case_with_epoch_millis() {
    let s = sample(7, "bs-1", MetricType::NrDlThroughput, 512.5, DAY0_MS);
    let json = serde_json::to_value(&s).unwrap();
    assert_eq!(json["stationId"], "bs-1");
    assert_eq!(json["metricType"], "nr_dl_throughput");
    assert_eq!(json["timestamp"], DAY0_MS);
    assert!(json.get("unit").is_none());
}

#[test]
fn test_sample_without_timestamp_deserializes() {
    let s: Sample = serde_json::from_str(
        r#"{"id":1,"stationId":"bs-1","metricType":"latency","value":3.0}"#,
    )
    .unwrap();
    assert_eq!(s, untimestamped(1, "bs-1", MetricType::Latency, 3.0));
}

#[test]
fn test_unrecognised_metric_type_deserializes_to_unknown() {
    let s: Sample = serde_json::from_str(
        r#"{"id":1,"stationId":"bs-1","metricType":"fan_speed","value":3.0,"timestamp":0}"#,
    )
    .unwrap();
    assert_eq!(s.metric_type, MetricType::Unknown);
}

#[test]
fn test_metric_type_parse_and_display() {
    for m in MetricType::ALL {
        assert_eq!(m.to_string().parse::<MetricType>().unwrap(), m);
    }
    assert_eq!(" CPU_LOAD ".parse::<MetricType>().unwrap(), MetricType::CpuLoad);
    let err = "unknown".parse::<MetricType>().unwrap_err();
    assert!(err.to_string().contains("unknown metric type"));
    assert_eq!(MetricType::from_wire("nope"), MetricType::Unknown);
}

#[test]
fn test_lifecycle_wire_values() {
    assert_eq!(LifecycleStatus::from_wire("Active"), LifecycleStatus::Active);
    assert_eq!(
        LifecycleStatus::from_wire("maintenance"),
        LifecycleStatus::Maintenance
    );
    assert_eq!(LifecycleStatus::from_wire("decommissioned"), LifecycleStatus::Offline);
    let st: Station = serde_json::from_str(
        r#"{"id":"bs-1","name":"A","location":"B","lifecycle":"retired"}"#,
    )
    .unwrap();
    assert_eq!(st.lifecycle, LifecycleStatus::Offline);
}

#[test]
fn test_health_status_order_and_wire_names() {
    assert!(HealthStatus::Healthy < HealthStatus::Warning);
    assert!(HealthStatus::Warning < HealthStatus::Critical);
    assert_eq!(
        serde_json::to_string(&HealthStatus::Critical).unwrap(),
        "\"critical\""
    );
    assert_eq!(HealthStatus::default(), HealthStatus::Healthy);
}
