//! # Restock Core
//!
//! 核心資料模型與類型定義

pub mod alert;
pub mod config;
pub mod estimate;
pub mod event;
pub mod intake;
pub mod item;
pub mod store;

// Re-export 主要類型
pub use alert::{BuyListEntry, Severity};
pub use config::{DepletionConfig, SeasonalModelConfig, SeverityThresholds, ThresholdConfig};
pub use estimate::{DepletionEstimate, EstimateError, EstimateMethod, Projection};
pub use event::UsageEvent;
pub use intake::{parse_usage_entry, UsageEntry};
pub use item::ItemId;
pub use store::{EventStore, InMemoryEventStore};

/// 庫存引擎錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum RestockError {
    #[error("無效的輸入: {0}")]
    InvalidInput(String),

    #[error("無效的配置: {0}")]
    InvalidConfig(String),

    #[error("事件儲存讀取失敗: {0}")]
    Store(String),

    #[error("數量計算溢位: {0}")]
    Overflow(String),

    #[error("配置解析失敗: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

impl RestockError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub fn overflow(msg: impl Into<String>) -> Self {
        Self::Overflow(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, RestockError>;
