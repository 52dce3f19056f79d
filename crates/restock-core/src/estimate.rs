//! 耗盡預估模型

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ItemId;

/// 預估方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimateMethod {
    /// 線性平均消耗速率
    Linear,
    /// 趨勢 + 季節預測模擬
    Seasonal,
}

/// 耗盡推估結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Projection {
    /// 預計於指定日期耗盡
    DepletesOn {
        /// 耗盡日期
        date: NaiveDate,
        /// 距今天數（可能為 0）
        days_until: i64,
    },

    /// 已經耗盡
    AlreadyDepleted,

    /// 預測時界內不會耗盡
    SufficientForNow {
        /// 模擬涵蓋的天數
        horizon_days: u32,
    },
}

impl Projection {
    /// 取得耗盡日期（若有）
    pub fn depletion_date(&self) -> Option<NaiveDate> {
        match self {
            Projection::DepletesOn { date, .. } => Some(*date),
            _ => None,
        }
    }

    /// 取得距耗盡天數；已耗盡視為 0
    pub fn days_until(&self) -> Option<i64> {
        match self {
            Projection::DepletesOn { days_until, .. } => Some(*days_until),
            Projection::AlreadyDepleted => Some(0),
            Projection::SufficientForNow { .. } => None,
        }
    }
}

/// 單一品項預估失敗原因（只影響該品項，不中斷批次）
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EstimateError {
    #[error("沒有消耗紀錄")]
    NoUsageData,

    #[error("平均消耗速率不足以推估耗盡日期")]
    InsufficientRate,

    #[error("消耗紀錄不足以建立預測模型：{observations} 筆（至少 {required} 筆）")]
    InsufficientData { observations: usize, required: usize },

    #[error("預測模型擬合失敗: {reason}")]
    ModelFit { reason: String },

    #[error("預測模型擬合逾時（上限 {limit_ms} 毫秒）")]
    ForecastTimeout { limit_ms: u64 },
}

impl EstimateError {
    pub fn model_fit(reason: impl Into<String>) -> Self {
        Self::ModelFit {
            reason: reason.into(),
        }
    }

    /// 資料不足類錯誤屬於資訊性質，不代表計算異常
    pub fn is_informational(&self) -> bool {
        matches!(
            self,
            EstimateError::NoUsageData
                | EstimateError::InsufficientRate
                | EstimateError::InsufficientData { .. }
        )
    }
}

/// 耗盡預估（每次請求重新計算，不持久化）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepletionEstimate {
    /// 品項
    pub item: ItemId,

    /// 預估方法
    pub method: EstimateMethod,

    /// 推估結果或失敗原因
    pub outcome: Result<Projection, EstimateError>,
}

impl DepletionEstimate {
    /// 創建成功的預估
    pub fn projected(item: ItemId, method: EstimateMethod, projection: Projection) -> Self {
        Self {
            item,
            method,
            outcome: Ok(projection),
        }
    }

    /// 創建失敗的預估
    pub fn failed(item: ItemId, method: EstimateMethod, error: EstimateError) -> Self {
        Self {
            item,
            method,
            outcome: Err(error),
        }
    }

    /// 檢查是否成功推估
    pub fn is_projected(&self) -> bool {
        self.outcome.is_ok()
    }

    /// 取得推估結果
    pub fn projection(&self) -> Option<&Projection> {
        self.outcome.as_ref().ok()
    }

    /// 取得失敗原因
    pub fn error(&self) -> Option<&EstimateError> {
        self.outcome.as_ref().err()
    }
}
