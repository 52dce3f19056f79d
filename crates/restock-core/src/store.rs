//! 事件儲存介面
//!
//! 核心只讀取事件；寫入（記錄用量、補貨）由外層服務負責。

use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};

use crate::{ItemId, ThresholdConfig, UsageEvent};

/// 只追加的用量事件儲存
pub trait EventStore: Send + Sync {
    /// 取得品項的所有事件（順序不限）
    fn events_for(&self, item: &ItemId) -> crate::Result<Vec<UsageEvent>>;

    /// 取得所有曾有事件的品項
    fn distinct_items(&self) -> crate::Result<BTreeSet<ItemId>>;

    /// 取得品項的補貨門檻覆寫
    fn threshold_for(&self, item: &ItemId) -> crate::Result<Option<Decimal>>;
}

impl<T: EventStore + ?Sized> EventStore for &T {
    fn events_for(&self, item: &ItemId) -> crate::Result<Vec<UsageEvent>> {
        (**self).events_for(item)
    }

    fn distinct_items(&self) -> crate::Result<BTreeSet<ItemId>> {
        (**self).distinct_items()
    }

    fn threshold_for(&self, item: &ItemId) -> crate::Result<Option<Decimal>> {
        (**self).threshold_for(item)
    }
}

/// 記憶體內事件儲存（測試與示範用）
#[derive(Debug, Clone)]
pub struct InMemoryEventStore {
    events: BTreeMap<ItemId, Vec<UsageEvent>>,
    thresholds: BTreeMap<ItemId, ThresholdConfig>,
    default_threshold: Decimal,
}

impl InMemoryEventStore {
    /// 創建空的儲存，新品項以 `default_threshold` 建立門檻
    pub fn new(default_threshold: Decimal) -> Self {
        Self {
            events: BTreeMap::new(),
            thresholds: BTreeMap::new(),
            default_threshold,
        }
    }

    /// 追加事件；品項首次出現時建立預設門檻
    pub fn record(&mut self, event: UsageEvent) {
        let default_threshold = self.default_threshold;
        self.thresholds
            .entry(event.item.clone())
            .or_insert_with(|| ThresholdConfig::new(event.item.clone(), default_threshold));
        self.events
            .entry(event.item.clone())
            .or_default()
            .push(event);
    }

    /// 批次追加事件
    pub fn record_all(&mut self, events: impl IntoIterator<Item = UsageEvent>) {
        for event in events {
            self.record(event);
        }
    }

    /// 建構器模式：追加事件
    pub fn with_event(mut self, event: UsageEvent) -> Self {
        self.record(event);
        self
    }

    /// 設置品項門檻
    pub fn set_threshold(&mut self, item: ItemId, threshold: Decimal) {
        self.thresholds
            .insert(item.clone(), ThresholdConfig::new(item, threshold));
    }

    /// 取得品項門檻配置
    pub fn threshold_config(&self, item: &ItemId) -> Option<&ThresholdConfig> {
        self.thresholds.get(item)
    }

    /// 有門檻配置的品項（供補貨畫面選單使用）
    pub fn configured_items(&self) -> impl Iterator<Item = &ItemId> {
        self.thresholds.keys()
    }

    /// 事件總數
    pub fn len(&self) -> usize {
        self.events.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryEventStore {
    fn default() -> Self {
        Self::new(Decimal::from(20))
    }
}

impl EventStore for InMemoryEventStore {
    fn events_for(&self, item: &ItemId) -> crate::Result<Vec<UsageEvent>> {
        Ok(self.events.get(item).cloned().unwrap_or_default())
    }

    fn distinct_items(&self) -> crate::Result<BTreeSet<ItemId>> {
        Ok(self.events.keys().cloned().collect())
    }

    fn threshold_for(&self, item: &ItemId) -> crate::Result<Option<Decimal>> {
        Ok(self.thresholds.get(item).map(|t| t.threshold))
    }
}
