//! 推估引擎主入口

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use restock_core::{
    BuyListEntry, DepletionConfig, DepletionEstimate, EventStore, ItemId, UsageEvent,
};
use rust_decimal::Decimal;

use crate::{
    BuyListRanker, BuyListReport, ForecastReport, ItemEstimates, ItemFailure, LinearEstimator,
    RestockReport, SeasonalEstimator, StockLedger, StockLevel, StockSummary, ThresholdClassifier,
};

/// 耗盡推估引擎
///
/// 所有計算都是事件快照上的純函式；全品項操作按品項平行展開，
/// 單一品項失敗只記錄在結果中。
pub struct DepletionEngine<S> {
    /// 事件儲存（只讀）
    store: S,

    /// 引擎配置
    config: DepletionConfig,

    /// 警示分級器
    classifier: ThresholdClassifier,
}

impl<S: EventStore> DepletionEngine<S> {
    /// 創建新的推估引擎
    pub fn new(store: S, config: DepletionConfig) -> restock_core::Result<Self> {
        config.validate()?;
        let classifier = ThresholdClassifier::new(config.severity);
        Ok(Self {
            store,
            config,
            classifier,
        })
    }

    /// 以預設配置創建引擎
    pub fn with_defaults(store: S) -> Self {
        Self {
            store,
            config: DepletionConfig::default(),
            classifier: ThresholdClassifier::default(),
        }
    }

    /// 品項目前剩餘量
    pub fn remaining(&self, item: &ItemId) -> restock_core::Result<Decimal> {
        let events = self.store.events_for(item)?;
        StockLedger::remaining_for(&self.config, item, &events)
    }

    /// 品項庫存水位明細
    pub fn stock_level(&self, item: &ItemId) -> restock_core::Result<StockLevel> {
        let events = self.store.events_for(item)?;
        StockLedger::stock_level(&self.config, item, &events)
    }

    /// 品項的線性與季節預估（以目前時間為基準）
    pub fn depletion_estimate(&self, item: &ItemId) -> restock_core::Result<ItemEstimates> {
        self.depletion_estimate_at(item, Utc::now())
    }

    /// 品項的線性與季節預估
    pub fn depletion_estimate_at(
        &self,
        item: &ItemId,
        now: DateTime<Utc>,
    ) -> restock_core::Result<ItemEstimates> {
        let events = self.store.events_for(item)?;
        self.estimate_from_events(item, &events, now)
    }

    /// 全品項季節預測（以目前時間為基準）
    pub fn forecast_report(&self) -> restock_core::Result<ForecastReport> {
        self.forecast_report_at(Utc::now())
    }

    /// 全品項季節預測
    pub fn forecast_report_at(&self, now: DateTime<Utc>) -> restock_core::Result<ForecastReport> {
        let items = self.catalog()?;
        tracing::info!("開始季節預測：品項 {} 個", items.len());
        let start_time = std::time::Instant::now();

        let outcomes: Vec<_> = items
            .par_iter()
            .map(|item| -> restock_core::Result<DepletionEstimate> {
                let events = self.store.events_for(item)?;
                let remaining = StockLedger::remaining_for(&self.config, item, &events)?;
                let estimate =
                    SeasonalEstimator::estimate(item, &events, remaining, now, &self.config);
                Self::log_estimate_error(item, estimate.error());
                Ok(estimate)
            })
            .collect();

        let (estimates, failures) = Self::split_outcomes(&items, outcomes);

        tracing::info!(
            "季節預測完成，耗時 {:?}，失敗 {} 個",
            start_time.elapsed(),
            failures.len()
        );

        Ok(ForecastReport {
            generated_at: now,
            estimates,
            failures,
            calculation_time_ms: Some(start_time.elapsed().as_millis()),
        })
    }

    /// 全品項補貨摘要（以目前時間為基準）
    pub fn restock_summary(&self) -> restock_core::Result<RestockReport> {
        self.restock_summary_at(Utc::now())
    }

    /// 全品項補貨摘要：剩餘量、線性推估與品項門檻
    pub fn restock_summary_at(&self, now: DateTime<Utc>) -> restock_core::Result<RestockReport> {
        let items = self.catalog()?;
        tracing::debug!("產生補貨摘要：品項 {} 個", items.len());

        let outcomes: Vec<_> = items
            .par_iter()
            .map(|item| -> restock_core::Result<StockSummary> {
                let events = self.store.events_for(item)?;
                let threshold = self
                    .store
                    .threshold_for(item)?
                    .unwrap_or(self.config.per_item_default_threshold);
                let remaining = StockLedger::remaining_for(&self.config, item, &events)?;

                Ok(StockSummary {
                    item: item.clone(),
                    remaining,
                    threshold,
                    below_threshold: remaining <= threshold,
                    linear: LinearEstimator::estimate(item, &events, remaining, now),
                })
            })
            .collect();

        let (items, failures) = Self::split_outcomes(&items, outcomes);
        Ok(RestockReport { items, failures })
    }

    /// 依警示等級排序的採購清單
    pub fn buy_list(&self) -> restock_core::Result<BuyListReport> {
        let items = self.catalog()?;
        tracing::info!("開始產生採購清單：品項 {} 個", items.len());

        let outcomes: Vec<_> = items
            .par_iter()
            .map(|item| -> restock_core::Result<Option<BuyListEntry>> {
                let remaining = self.remaining(item)?;
                Ok(self.classifier.entry(item, remaining))
            })
            .collect();

        let (classified, failures) = Self::split_outcomes(&items, outcomes);
        let entries = BuyListRanker::rank(classified.into_iter().flatten().collect());

        tracing::info!(
            "採購清單完成：需補貨 {} 個，失敗 {} 個",
            entries.len(),
            failures.len()
        );

        Ok(BuyListReport { entries, failures })
    }

    /// 獲取配置引用
    pub fn config(&self) -> &DepletionConfig {
        &self.config
    }

    /// 獲取事件儲存引用
    pub fn store(&self) -> &S {
        &self.store
    }

    fn catalog(&self) -> restock_core::Result<Vec<ItemId>> {
        Ok(self.store.distinct_items()?.into_iter().collect())
    }

    fn estimate_from_events(
        &self,
        item: &ItemId,
        events: &[UsageEvent],
        now: DateTime<Utc>,
    ) -> restock_core::Result<ItemEstimates> {
        let remaining = StockLedger::remaining_for(&self.config, item, events)?;
        let linear = LinearEstimator::estimate(item, events, remaining, now);
        let seasonal = SeasonalEstimator::estimate(item, events, remaining, now, &self.config);
        Self::log_estimate_error(item, seasonal.error());

        tracing::debug!(
            "品項 {} 剩餘 {}，線性 {:?}，季節 {:?}",
            item,
            remaining,
            linear.outcome,
            seasonal.outcome
        );

        Ok(ItemEstimates {
            item: item.clone(),
            remaining,
            linear,
            seasonal,
        })
    }

    fn log_estimate_error(item: &ItemId, error: Option<&restock_core::EstimateError>) {
        match error {
            Some(err) if err.is_informational() => {
                tracing::debug!("品項 {} 無法預測: {}", item, err)
            }
            Some(err) => tracing::warn!("品項 {} 預測失敗: {}", item, err),
            None => {}
        }
    }

    /// 將逐品項結果拆成成功值與失敗註記（保持品項順序）
    fn split_outcomes<T>(
        items: &[ItemId],
        outcomes: Vec<restock_core::Result<T>>,
    ) -> (Vec<T>, Vec<ItemFailure>) {
        let mut values = Vec::with_capacity(outcomes.len());
        let mut failures = Vec::new();

        for (item, outcome) in items.iter().zip(outcomes) {
            match outcome {
                Ok(value) => values.push(value),
                Err(err) => {
                    tracing::warn!("品項 {} 讀取失敗: {}", item, err);
                    failures.push(ItemFailure::new(item.clone(), err.to_string()));
                }
            }
        }

        (values, failures)
    }
}
