//! 簡單耗盡推估示例

use chrono::{Duration, Utc};
use restock::{parse_usage_entry, DepletionConfig, DepletionEngine, InMemoryEventStore};
use restock_core::Projection;
use rust_decimal::Decimal;

fn main() -> anyhow::Result<()> {
    restock::init_tracing();
    println!("=== 簡單耗盡推估示例 ===\n");

    let now = Utc::now();
    let mut store = InMemoryEventStore::new(Decimal::from(20));

    // 過去兩週的用量紀錄，週末用量較高
    for days_ago in (1..=14).rev() {
        let at = now - Duration::days(days_ago);
        let saline = if days_ago % 7 < 2 { "saline 9ml" } else { "used 5ml saline" };
        for text in [saline, "gauze 2", "use 3 alcohol swab"] {
            store.record(parse_usage_entry(text)?.into_event(at));
        }
    }

    let config = DepletionConfig::default().with_forecast_horizon(21);
    let engine = DepletionEngine::new(store, config)?;

    println!("耗盡預估:");
    let report = engine.forecast_report_at(now)?;
    for estimate in &report.estimates {
        let linear = engine.depletion_estimate_at(&estimate.item, now)?.linear;
        println!(
            "  - 品項: {}, 季節: {}, 線性: {}",
            estimate.item,
            describe(estimate.projection()),
            describe(linear.projection())
        );
    }

    println!("\n採購清單:");
    let buy_list = engine.buy_list()?;
    if buy_list.is_empty() {
        println!("  （無需補貨）");
    }
    for entry in &buy_list.entries {
        println!(
            "  - [{}] {} 剩餘 {}",
            entry.severity.as_str(),
            entry.item,
            entry.remaining
        );
    }

    println!("\n補貨摘要 (JSON):");
    println!("{}", serde_json::to_string_pretty(&engine.restock_summary_at(now)?)?);

    Ok(())
}

fn describe(projection: Option<&Projection>) -> String {
    match projection {
        Some(Projection::DepletesOn { date, days_until }) => format!("{}（{} 天後）", date, days_until),
        Some(Projection::AlreadyDepleted) => "已耗盡".to_string(),
        Some(Projection::SufficientForNow { horizon_days }) => {
            format!("{} 天內足夠", horizon_days)
        }
        None => "無法預測".to_string(),
    }
}
