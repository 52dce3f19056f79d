//! # Restock Calculation Engine
//!
//! 庫存耗盡推估與補貨警示計算引擎

pub mod classifier;
pub mod engine;
pub mod ledger;
pub mod linear;
pub mod model;
pub mod ranking;
pub mod seasonal;
pub mod solver;

// Re-export 主要類型
pub use classifier::ThresholdClassifier;
pub use engine::DepletionEngine;
pub use ledger::{StockLedger, StockLevel};
pub use linear::{LinearEstimator, LinearRate};
pub use model::{AdditiveModel, FitBudget, ModelFitError, Observation};
pub use ranking::BuyListRanker;
pub use seasonal::{ForecastPoint, SeasonalEstimator};

use chrono::{DateTime, Utc};
use restock_core::{BuyListEntry, DepletionEstimate, ItemId};
use rust_decimal::Decimal;
use serde::Serialize;

/// 單一品項的失敗註記（不影響其他品項）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    pub item: ItemId,
    pub message: String,
}

impl ItemFailure {
    pub fn new(item: ItemId, message: impl Into<String>) -> Self {
        Self {
            item,
            message: message.into(),
        }
    }
}

/// 單一品項的兩種耗盡預估
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemEstimates {
    pub item: ItemId,
    pub remaining: Decimal,
    pub linear: DepletionEstimate,
    pub seasonal: DepletionEstimate,
}

impl ItemEstimates {
    /// 季節模型可用時採用季節結果，否則退回線性結果
    pub fn preferred(&self) -> &DepletionEstimate {
        if self.seasonal.is_projected() {
            &self.seasonal
        } else {
            &self.linear
        }
    }
}

/// 全品項季節預測結果
#[derive(Debug, Clone, Serialize)]
pub struct ForecastReport {
    /// 計算基準時間
    pub generated_at: DateTime<Utc>,

    /// 各品項預估（依品項排序）
    pub estimates: Vec<DepletionEstimate>,

    /// 讀取失敗的品項
    pub failures: Vec<ItemFailure>,

    /// 計算耗時（毫秒）
    pub calculation_time_ms: Option<u128>,
}

impl ForecastReport {
    /// 取得品項預估
    pub fn estimate_for(&self, item: &ItemId) -> Option<&DepletionEstimate> {
        self.estimates.iter().find(|e| &e.item == item)
    }

    /// 是否至少有一個品項得到推估結果
    pub fn has_projections(&self) -> bool {
        self.estimates.iter().any(DepletionEstimate::is_projected)
    }
}

/// 單一品項補貨摘要
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockSummary {
    pub item: ItemId,
    pub remaining: Decimal,

    /// 品項補貨門檻
    pub threshold: Decimal,

    /// 剩餘量已達門檻
    pub below_threshold: bool,

    /// 線性推估
    pub linear: DepletionEstimate,
}

/// 全品項補貨摘要
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestockReport {
    pub items: Vec<StockSummary>,
    pub failures: Vec<ItemFailure>,
}

/// 採購清單（已排序）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuyListReport {
    pub entries: Vec<BuyListEntry>,
    pub failures: Vec<ItemFailure>,
}

impl BuyListReport {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
