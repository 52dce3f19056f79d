//! 用量事件模型

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ItemId, RestockError};

/// 用量事件（只追加、不可變）
///
/// 正數代表消耗，負數代表補貨。更正以新事件表示。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageEvent {
    /// 事件ID
    pub id: Uuid,

    /// 品項
    pub item: ItemId,

    /// 數量變化（消耗為正、補貨為負）
    pub quantity_delta: Decimal,

    /// 發生時間
    pub timestamp: DateTime<Utc>,
}

impl UsageEvent {
    /// 創建新的事件
    pub fn new(item: ItemId, quantity_delta: Decimal, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            item,
            quantity_delta,
            timestamp,
        }
    }

    /// 創建消耗事件
    pub fn consumption(item: ItemId, quantity: Decimal, timestamp: DateTime<Utc>) -> Self {
        Self::new(item, quantity, timestamp)
    }

    /// 創建補貨事件（數量必須為正，儲存為負的變化量）
    pub fn restock(
        item: ItemId,
        quantity: Decimal,
        timestamp: DateTime<Utc>,
    ) -> crate::Result<Self> {
        if quantity <= Decimal::ZERO {
            return Err(RestockError::invalid_input(format!(
                "補貨數量必須大於 0：{}",
                quantity
            )));
        }
        Ok(Self::new(item, -quantity, timestamp))
    }

    /// 建構器模式：設置事件ID
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    /// 檢查是否為消耗事件
    pub fn is_consumption(&self) -> bool {
        self.quantity_delta > Decimal::ZERO
    }

    /// 檢查是否為補貨事件
    pub fn is_restock(&self) -> bool {
        self.quantity_delta < Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn saline() -> ItemId {
        ItemId::new("saline").unwrap()
    }

    #[test]
    fn test_create_consumption_event() {
        let at = Utc.with_ymd_and_hms(2025, 11, 1, 9, 30, 0).unwrap();
        let event = UsageEvent::consumption(saline(), Decimal::from(15), at);

        assert_eq!(event.item.as_str(), "saline");
        assert_eq!(event.quantity_delta, Decimal::from(15));
        assert_eq!(event.timestamp, at);
        assert!(event.is_consumption());
        assert!(!event.is_restock());
    }

    #[test]
    fn test_restock_event_is_negative() {
        let at = Utc.with_ymd_and_hms(2025, 11, 2, 8, 0, 0).unwrap();
        let event = UsageEvent::restock(saline(), Decimal::from(50), at).unwrap();

        assert_eq!(event.quantity_delta, Decimal::from(-50));
        assert!(event.is_restock());
    }

    #[test]
    fn test_restock_rejects_non_positive_quantity() {
        let at = Utc.with_ymd_and_hms(2025, 11, 2, 8, 0, 0).unwrap();

        assert!(UsageEvent::restock(saline(), Decimal::ZERO, at).is_err());
        assert!(UsageEvent::restock(saline(), Decimal::from(-5), at).is_err());
    }

    #[test]
    fn test_event_ids_are_unique() {
        let at = Utc.with_ymd_and_hms(2025, 11, 1, 0, 0, 0).unwrap();
        let a = UsageEvent::consumption(saline(), Decimal::ONE, at);
        let b = UsageEvent::consumption(saline(), Decimal::ONE, at);
        assert_ne!(a.id, b.id);

        let fixed = Uuid::new_v4();
        assert_eq!(a.with_id(fixed).id, fixed);
    }
}
