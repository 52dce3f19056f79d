//! 庫存帳計算

use restock_core::{DepletionConfig, ItemId, RestockError, UsageEvent};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 庫存水位（由事件流推導，不儲存）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLevel {
    /// 品項
    pub item: ItemId,
    /// 初始容量
    pub capacity: Decimal,
    /// 累計消耗
    pub consumed: Decimal,
    /// 累計補貨
    pub restocked: Decimal,
    /// 剩餘量
    pub remaining: Decimal,
}

/// 庫存帳計算器
pub struct StockLedger;

impl StockLedger {
    /// 剩餘量 = 初始容量 - Σ 變化量
    ///
    /// 與事件順序無關；沒有事件時即為初始容量。超出 `Decimal` 範圍時回傳 `Overflow`。
    pub fn remaining(capacity: Decimal, events: &[UsageEvent]) -> restock_core::Result<Decimal> {
        let net = Self::checked_sum(events.iter().map(|e| e.quantity_delta))?;
        capacity
            .checked_sub(net)
            .ok_or_else(|| RestockError::overflow(format!("容量 {} 減去淨消耗 {}", capacity, net)))
    }

    /// 依配置取得品項容量後計算剩餘量
    pub fn remaining_for(
        config: &DepletionConfig,
        item: &ItemId,
        events: &[UsageEvent],
    ) -> restock_core::Result<Decimal> {
        Self::remaining(config.capacity_for(item), events)
    }

    /// 計算完整庫存水位
    pub fn stock_level(
        config: &DepletionConfig,
        item: &ItemId,
        events: &[UsageEvent],
    ) -> restock_core::Result<StockLevel> {
        let capacity = config.capacity_for(item);
        let consumed = Self::total_consumption(events)?;
        let restocked = -Self::checked_sum(
            events
                .iter()
                .filter(|e| e.is_restock())
                .map(|e| e.quantity_delta),
        )?;

        Ok(StockLevel {
            item: item.clone(),
            capacity,
            consumed,
            restocked,
            remaining: Self::remaining(capacity, events)?,
        })
    }

    /// 累計消耗量（僅正數變化）
    pub fn total_consumption(events: &[UsageEvent]) -> restock_core::Result<Decimal> {
        Self::checked_sum(
            events
                .iter()
                .filter(|e| e.is_consumption())
                .map(|e| e.quantity_delta),
        )
    }

    fn checked_sum(mut deltas: impl Iterator<Item = Decimal>) -> restock_core::Result<Decimal> {
        deltas.try_fold(Decimal::ZERO, |total, delta| {
            total
                .checked_add(delta)
                .ok_or_else(|| RestockError::overflow(format!("累加 {} 與 {}", total, delta)))
        })
    }

    /// 依時間排序的消耗事件
    pub fn consumption_events(events: &[UsageEvent]) -> Vec<&UsageEvent> {
        let mut usage: Vec<&UsageEvent> = events.iter().filter(|e| e.is_consumption()).collect();
        usage.sort_by_key(|e| e.timestamp);
        usage
    }
}
