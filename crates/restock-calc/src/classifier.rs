//! 警示分級

use restock_core::{BuyListEntry, ItemId, Severity, SeverityThresholds};
use rust_decimal::Decimal;

/// 警示分級器
pub struct ThresholdClassifier {
    thresholds: SeverityThresholds,
}

impl ThresholdClassifier {
    pub fn new(thresholds: SeverityThresholds) -> Self {
        Self { thresholds }
    }

    /// 依剩餘量判定等級；高於黃色門檻回傳 `None`
    ///
    /// 各區間重疊，必須由最嚴重的等級開始判定。
    pub fn classify(&self, remaining: Decimal) -> Option<Severity> {
        if remaining <= self.thresholds.red {
            Some(Severity::Red)
        } else if remaining <= self.thresholds.orange {
            Some(Severity::Orange)
        } else if remaining <= self.thresholds.yellow {
            Some(Severity::Yellow)
        } else {
            None
        }
    }

    /// 產生採購清單項目；不需補貨時回傳 `None`
    pub fn entry(&self, item: &ItemId, remaining: Decimal) -> Option<BuyListEntry> {
        self.classify(remaining)
            .map(|severity| BuyListEntry::new(item.clone(), remaining, severity))
    }

    pub fn thresholds(&self) -> &SeverityThresholds {
        &self.thresholds
    }
}

impl Default for ThresholdClassifier {
    fn default() -> Self {
        Self::new(SeverityThresholds::default())
    }
}
