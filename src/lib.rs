//! # Restock
//!
//! 耗材用量追蹤、耗盡推估與補貨警示

pub use restock_calc::{
    BuyListReport, DepletionEngine, ForecastReport, ItemEstimates, RestockReport,
};
pub use restock_core::{
    parse_usage_entry, DepletionConfig, EventStore, InMemoryEventStore, ItemId, RestockError,
    UsageEvent,
};

use tracing_subscriber::EnvFilter;

/// 初始化日誌輸出（`RUST_LOG` 可覆寫，預設 `info`）
///
/// 重複呼叫不會出錯。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
