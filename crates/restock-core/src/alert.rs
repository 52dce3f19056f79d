//! 補貨警示模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ItemId;

/// 警示等級（紅 > 橘 > 黃）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Red,
    Orange,
    Yellow,
}

impl Severity {
    /// 排序優先級（數字越小越緊急）
    pub fn priority(self) -> u8 {
        match self {
            Severity::Red => 1,
            Severity::Orange => 2,
            Severity::Yellow => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Red => "red",
            Severity::Orange => "orange",
            Severity::Yellow => "yellow",
        }
    }
}

/// 採購清單項目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyListEntry {
    /// 品項
    pub item: ItemId,

    /// 剩餘量
    pub remaining: Decimal,

    /// 警示等級
    pub severity: Severity,
}

impl BuyListEntry {
    pub fn new(item: ItemId, remaining: Decimal, severity: Severity) -> Self {
        Self {
            item,
            remaining,
            severity,
        }
    }
}
