//! 集成測試

use chrono::{DateTime, Duration, TimeZone, Utc};
use restock::*;
use restock_core::{EstimateError, Projection, Severity, SeverityThresholds};
use rstest::rstest;
use rust_decimal::Decimal;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 11, 20, 15, 0, 0).unwrap()
}

fn item(name: &str) -> ItemId {
    ItemId::new(name).unwrap()
}

#[test]
fn test_usage_entries_to_buy_list() {
    // 場景：文字紀錄 → 事件儲存 → 採購清單
    let mut store = InMemoryEventStore::default();
    let entries = [
        ("used 90ml of saline", 9),
        ("gauze 95", 8),
        ("use 75 milliliters alcohol", 7),
        ("iodine 30ml", 6),
    ];
    for (text, days_ago) in entries {
        let entry = parse_usage_entry(text).unwrap();
        store.record(entry.into_event(now() - Duration::days(days_ago)));
    }

    let engine = DepletionEngine::with_defaults(store);
    let report = engine.buy_list().unwrap();

    let ranked: Vec<(&str, Severity)> = report
        .entries
        .iter()
        .map(|e| (e.item.as_str(), e.severity))
        .collect();

    // "of saline" 保留 "of"
    assert_eq!(
        ranked,
        vec![
            ("gauze", Severity::Red),
            ("of saline", Severity::Red),
            ("alcohol", Severity::Orange),
        ]
    );
    assert!(report.failures.is_empty());
}

#[test]
fn test_restock_returns_stock_above_alert_levels() {
    let mut store = InMemoryEventStore::default();
    store.record(UsageEvent::consumption(
        item("saline"),
        Decimal::from(80),
        now() - Duration::days(5),
    ));

    let engine = DepletionEngine::with_defaults(store.clone());
    assert_eq!(engine.buy_list().unwrap().entries.len(), 1);

    store.record(UsageEvent::restock(item("saline"), Decimal::from(50), now()).unwrap());
    let engine = DepletionEngine::with_defaults(store);

    assert_eq!(engine.remaining(&item("saline")).unwrap(), Decimal::from(70));
    assert!(engine.buy_list().unwrap().is_empty());
}

#[rstest]
#[case(29, Some(Severity::Red))]
#[case(30, Some(Severity::Orange))]
#[case(40, Some(Severity::Yellow))]
#[case(41, None)]
fn test_buy_list_boundaries(#[case] remaining: i64, #[case] expected: Option<Severity>) {
    let consumed = Decimal::from(100 - remaining);
    let store = InMemoryEventStore::default().with_event(UsageEvent::consumption(
        item("swab"),
        consumed,
        now() - Duration::days(1),
    ));

    let report = DepletionEngine::with_defaults(store).buy_list().unwrap();

    assert_eq!(report.entries.first().map(|e| e.severity), expected);
}

#[test]
fn test_linear_estimate_is_deterministic() {
    // 10 天用了 50，剩餘 100 → 每日 5，20 天後
    let config = DepletionConfig::default().with_initial_capacity(Decimal::from(150));
    let store = InMemoryEventStore::default().with_event(UsageEvent::consumption(
        item("saline"),
        Decimal::from(50),
        now() - Duration::days(10),
    ));
    let engine = DepletionEngine::new(store, config).unwrap();

    let first = engine.depletion_estimate_at(&item("saline"), now()).unwrap();
    let second = engine.depletion_estimate_at(&item("saline"), now()).unwrap();

    assert_eq!(first.linear, second.linear);
    assert_eq!(
        first.linear.outcome,
        Ok(Projection::DepletesOn {
            date: chrono::NaiveDate::from_ymd_opt(2025, 12, 10).unwrap(),
            days_until: 20,
        })
    );
}

#[test]
fn test_item_without_usage() {
    let mut store = InMemoryEventStore::default();
    store.record(UsageEvent::restock(item("gloves"), Decimal::from(10), now()).unwrap());
    let engine = DepletionEngine::with_defaults(store);

    let estimates = engine.depletion_estimate_at(&item("gloves"), now()).unwrap();

    assert_eq!(estimates.remaining, Decimal::from(110));
    assert_eq!(estimates.linear.outcome, Err(EstimateError::NoUsageData));
    assert!(matches!(
        estimates.seasonal.outcome,
        Err(EstimateError::InsufficientData { observations: 0, .. })
    ));
}

#[test]
fn test_forecast_report_over_all_items() {
    let mut store = InMemoryEventStore::default();
    for days_ago in 1..=12 {
        store.record(UsageEvent::consumption(
            item("saline"),
            Decimal::from(6),
            now() - Duration::days(days_ago) - Duration::hours(3),
        ));
    }
    store.record(UsageEvent::consumption(
        item("gauze"),
        Decimal::from(5),
        now() - Duration::days(2),
    ));

    let engine = DepletionEngine::with_defaults(store);
    let report = engine.forecast_report_at(now()).unwrap();

    assert_eq!(report.generated_at, now());
    assert_eq!(report.estimates.len(), 2);
    assert!(report.failures.is_empty());
    assert!(report.calculation_time_ms.is_some());

    // 剩餘 28，每日約 6 → 預測期內耗盡
    let saline = report.estimate_for(&item("saline")).unwrap();
    assert!(matches!(
        saline.projection(),
        Some(Projection::DepletesOn { .. })
    ));

    let gauze = report.estimate_for(&item("gauze")).unwrap();
    assert!(gauze.error().unwrap().is_informational());
}

#[test]
fn test_restock_summary_uses_stored_thresholds() {
    let mut store = InMemoryEventStore::new(Decimal::from(15));
    store.record(UsageEvent::consumption(
        item("saline"),
        Decimal::from(80),
        now() - Duration::days(4),
    ));
    store.record(UsageEvent::consumption(
        item("gauze"),
        Decimal::from(10),
        now() - Duration::days(4),
    ));

    let engine = DepletionEngine::with_defaults(store);
    let report = engine.restock_summary_at(now()).unwrap();

    let below: Vec<&str> = report
        .items
        .iter()
        .filter(|s| s.below_threshold)
        .map(|s| s.item.as_str())
        .collect();
    assert_eq!(below, Vec::<&str>::new());
    assert!(report.items.iter().all(|s| s.threshold == Decimal::from(15)));
}

#[test]
fn test_config_from_json() {
    let json = r#"{
        "initial_capacity_ml": 250,
        "yellow_threshold": 60,
        "orange_threshold": 45,
        "red_threshold": 20,
        "forecast_horizon_days": 7,
        "capacity_overrides": { "saline": 500 }
    }"#;

    let config = DepletionConfig::from_json_str(json).unwrap();

    assert_eq!(config.initial_capacity_ml, Decimal::from(250));
    assert_eq!(
        config.severity,
        SeverityThresholds::new(Decimal::from(60), Decimal::from(45), Decimal::from(20))
    );
    assert_eq!(config.forecast_horizon_days, 7);
    assert_eq!(config.capacity_for(&item("Saline")), Decimal::from(500));
    assert_eq!(config.capacity_for(&item("gauze")), Decimal::from(250));
    assert_eq!(config.fit_timeout_ms, 2_000);
}

#[test]
fn test_config_rejects_inverted_thresholds() {
    let json = r#"{ "yellow_threshold": 10, "orange_threshold": 30, "red_threshold": 29 }"#;
    assert!(matches!(
        DepletionConfig::from_json_str(json),
        Err(RestockError::InvalidConfig(_))
    ));
}

#[test]
fn test_buy_list_serializes() {
    let store = InMemoryEventStore::default().with_event(UsageEvent::consumption(
        item("saline"),
        Decimal::from(95),
        now(),
    ));
    let report = DepletionEngine::with_defaults(store).buy_list().unwrap();

    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["entries"][0]["item"], "saline");
    assert_eq!(value["entries"][0]["severity"], "red");
}
