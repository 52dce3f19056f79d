//! 引擎配置模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::{ItemId, RestockError};

/// 預測時界上限（天）
pub const MAX_FORECAST_HORIZON_DAYS: u32 = 366;

/// 引擎全域配置（啟動時解析後注入，不使用全域常數）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepletionConfig {
    /// 初始容量（毫升）
    pub initial_capacity_ml: Decimal,

    /// 個別品項的初始容量覆寫
    pub capacity_overrides: BTreeMap<ItemId, Decimal>,

    /// 採購清單分級門檻
    #[serde(flatten)]
    pub severity: SeverityThresholds,

    /// 預測時界（天）
    pub forecast_horizon_days: u32,

    /// 新品項預設補貨門檻
    pub per_item_default_threshold: Decimal,

    /// 季節模型最少觀測筆數
    pub min_observations: usize,

    /// 單一品項模型擬合的時間上限（毫秒）
    pub fit_timeout_ms: u64,

    /// 季節模型參數
    pub seasonal: SeasonalModelConfig,
}

impl Default for DepletionConfig {
    fn default() -> Self {
        Self {
            initial_capacity_ml: Decimal::from(100),
            capacity_overrides: BTreeMap::new(),
            severity: SeverityThresholds::default(),
            forecast_horizon_days: 14,
            per_item_default_threshold: Decimal::from(20),
            min_observations: 2,
            fit_timeout_ms: 2_000,
            seasonal: SeasonalModelConfig::default(),
        }
    }
}

impl DepletionConfig {
    /// 從 JSON 字串載入配置，未提供的欄位使用預設值
    pub fn from_json_str(json: &str) -> crate::Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// 建構器模式：設置初始容量
    pub fn with_initial_capacity(mut self, capacity: Decimal) -> Self {
        self.initial_capacity_ml = capacity;
        self
    }

    /// 建構器模式：設置個別品項容量
    pub fn with_capacity_override(mut self, item: ItemId, capacity: Decimal) -> Self {
        self.capacity_overrides.insert(item, capacity);
        self
    }

    /// 建構器模式：設置分級門檻
    pub fn with_severity_thresholds(mut self, severity: SeverityThresholds) -> Self {
        self.severity = severity;
        self
    }

    /// 建構器模式：設置預測時界
    pub fn with_forecast_horizon(mut self, days: u32) -> Self {
        self.forecast_horizon_days = days;
        self
    }

    /// 建構器模式：設置新品項預設門檻
    pub fn with_per_item_default_threshold(mut self, threshold: Decimal) -> Self {
        self.per_item_default_threshold = threshold;
        self
    }

    /// 建構器模式：設置擬合時間上限
    pub fn with_fit_timeout(mut self, timeout: Duration) -> Self {
        self.fit_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// 建構器模式：設置季節模型參數
    pub fn with_seasonal(mut self, seasonal: SeasonalModelConfig) -> Self {
        self.seasonal = seasonal;
        self
    }

    /// 取得品項的初始容量（有覆寫時使用覆寫值）
    pub fn capacity_for(&self, item: &ItemId) -> Decimal {
        self.capacity_overrides
            .get(item)
            .copied()
            .unwrap_or(self.initial_capacity_ml)
    }

    /// 擬合時間上限
    pub fn fit_timeout(&self) -> Duration {
        Duration::from_millis(self.fit_timeout_ms)
    }

    /// 檢查配置是否合理
    pub fn validate(&self) -> crate::Result<()> {
        if self.initial_capacity_ml <= Decimal::ZERO {
            return Err(RestockError::invalid_config("初始容量必須大於 0"));
        }
        if let Some((item, _)) = self
            .capacity_overrides
            .iter()
            .find(|(_, capacity)| **capacity <= Decimal::ZERO)
        {
            return Err(RestockError::invalid_config(format!(
                "品項 {} 的容量覆寫必須大於 0",
                item
            )));
        }
        if self.forecast_horizon_days == 0 {
            return Err(RestockError::invalid_config("預測時界至少 1 天"));
        }
        if self.forecast_horizon_days > MAX_FORECAST_HORIZON_DAYS {
            return Err(RestockError::invalid_config(format!(
                "預測時界不可超過 {} 天",
                MAX_FORECAST_HORIZON_DAYS
            )));
        }
        if self.min_observations < 2 {
            return Err(RestockError::invalid_config("季節模型至少需要 2 筆觀測"));
        }
        if self.fit_timeout_ms == 0 {
            return Err(RestockError::invalid_config("擬合時間上限必須大於 0"));
        }

        self.severity.validate()?;
        self.seasonal.validate()
    }
}

/// 採購清單分級門檻
///
/// 各區間刻意重疊，判定順序固定為 紅 → 橘 → 黃。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityThresholds {
    /// 黃色門檻（剩餘 ≤ 此值）
    #[serde(rename = "yellow_threshold")]
    pub yellow: Decimal,

    /// 橘色門檻
    #[serde(rename = "orange_threshold")]
    pub orange: Decimal,

    /// 紅色門檻
    #[serde(rename = "red_threshold")]
    pub red: Decimal,
}

impl Default for SeverityThresholds {
    fn default() -> Self {
        Self {
            yellow: Decimal::from(40),
            orange: Decimal::from(30),
            red: Decimal::from(29),
        }
    }
}

impl SeverityThresholds {
    /// 創建新的分級門檻
    pub fn new(yellow: Decimal, orange: Decimal, red: Decimal) -> Self {
        Self { yellow, orange, red }
    }

    /// 紅 ≤ 橘 ≤ 黃，否則較寬鬆的等級永遠不會出現
    pub fn validate(&self) -> crate::Result<()> {
        if self.red > self.orange || self.orange > self.yellow {
            return Err(RestockError::invalid_config(format!(
                "分級門檻須滿足 紅({}) ≤ 橘({}) ≤ 黃({})",
                self.red, self.orange, self.yellow
            )));
        }
        Ok(())
    }
}

/// 季節預測模型參數
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeasonalModelConfig {
    /// 趨勢轉折點的先驗尺度（越小越平滑）
    pub changepoint_prior_scale: f64,

    /// 轉折點可出現的歷史比例
    pub changepoint_range: f64,

    /// 最多轉折點數
    pub max_changepoints: usize,

    /// 日週期傅立葉階數（0 表示停用）
    pub daily_fourier_order: usize,

    /// 週週期傅立葉階數（0 表示停用）
    pub weekly_fourier_order: usize,

    /// 啟用週週期所需的最短歷史（天）
    pub weekly_min_history_days: f64,

    /// 季節項先驗尺度
    pub seasonality_prior_scale: f64,

    /// 截距與斜率先驗尺度
    pub trend_prior_scale: f64,
}

impl Default for SeasonalModelConfig {
    fn default() -> Self {
        Self {
            changepoint_prior_scale: 0.05,
            changepoint_range: 0.8,
            max_changepoints: 25,
            daily_fourier_order: 4,
            weekly_fourier_order: 3,
            weekly_min_history_days: 14.0,
            seasonality_prior_scale: 10.0,
            trend_prior_scale: 5.0,
        }
    }
}

impl SeasonalModelConfig {
    /// 建構器模式：設置轉折點先驗尺度
    pub fn with_changepoint_prior_scale(mut self, scale: f64) -> Self {
        self.changepoint_prior_scale = scale;
        self
    }

    /// 建構器模式：設置日週期階數
    pub fn with_daily_fourier_order(mut self, order: usize) -> Self {
        self.daily_fourier_order = order;
        self
    }

    /// 建構器模式：設置週週期階數
    pub fn with_weekly_fourier_order(mut self, order: usize) -> Self {
        self.weekly_fourier_order = order;
        self
    }

    pub fn validate(&self) -> crate::Result<()> {
        let scales = [
            ("changepoint_prior_scale", self.changepoint_prior_scale),
            ("seasonality_prior_scale", self.seasonality_prior_scale),
            ("trend_prior_scale", self.trend_prior_scale),
        ];
        for (name, value) in scales {
            if !value.is_finite() || value <= 0.0 {
                return Err(RestockError::invalid_config(format!(
                    "{} 必須為正數：{}",
                    name, value
                )));
            }
        }
        if !(self.changepoint_range > 0.0 && self.changepoint_range <= 1.0) {
            return Err(RestockError::invalid_config(format!(
                "changepoint_range 必須介於 (0, 1]：{}",
                self.changepoint_range
            )));
        }
        if !self.weekly_min_history_days.is_finite() || self.weekly_min_history_days < 0.0 {
            return Err(RestockError::invalid_config(
                "weekly_min_history_days 不可為負",
            ));
        }
        Ok(())
    }
}

/// 個別品項補貨門檻（首次記錄時以預設值建立，不會自動刪除）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// 品項
    pub item: ItemId,

    /// 補貨門檻
    pub threshold: Decimal,
}

impl ThresholdConfig {
    pub fn new(item: ItemId, threshold: Decimal) -> Self {
        Self { item, threshold }
    }

    /// 檢查剩餘量是否已達門檻
    pub fn is_reached(&self, remaining: Decimal) -> bool {
        remaining <= self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DepletionConfig::default();

        assert_eq!(config.initial_capacity_ml, Decimal::from(100));
        assert_eq!(config.severity.yellow, Decimal::from(40));
        assert_eq!(config.severity.orange, Decimal::from(30));
        assert_eq!(config.severity.red, Decimal::from(29));
        assert_eq!(config.forecast_horizon_days, 14);
        assert_eq!(config.per_item_default_threshold, Decimal::from(20));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let gauze = ItemId::new("gauze").unwrap();
        let config = DepletionConfig::default()
            .with_initial_capacity(Decimal::from(250))
            .with_capacity_override(gauze.clone(), Decimal::from(500))
            .with_forecast_horizon(7)
            .with_fit_timeout(Duration::from_millis(150));

        assert_eq!(config.capacity_for(&gauze), Decimal::from(500));
        assert_eq!(
            config.capacity_for(&ItemId::new("saline").unwrap()),
            Decimal::from(250)
        );
        assert_eq!(config.forecast_horizon_days, 7);
        assert_eq!(config.fit_timeout(), Duration::from_millis(150));
    }

    #[test]
    fn test_config_from_json_with_defaults() {
        let json = r#"{
            "initial_capacity_ml": 200,
            "yellow_threshold": 60,
            "orange_threshold": 45,
            "red_threshold": 20,
            "capacity_overrides": { "Heparin": 50 },
            "seasonal": { "changepoint_prior_scale": 0.1 }
        }"#;

        let config = DepletionConfig::from_json_str(json).unwrap();

        assert_eq!(config.initial_capacity_ml, Decimal::from(200));
        assert_eq!(config.severity.yellow, Decimal::from(60));
        assert_eq!(config.severity.red, Decimal::from(20));
        assert_eq!(
            config.capacity_for(&ItemId::new("heparin").unwrap()),
            Decimal::from(50)
        );
        assert_eq!(config.seasonal.changepoint_prior_scale, 0.1);
        // 未提供的欄位沿用預設
        assert_eq!(config.forecast_horizon_days, 14);
        assert_eq!(config.seasonal.daily_fourier_order, 4);
    }

    #[test]
    fn test_config_rejects_inverted_thresholds() {
        let json = r#"{ "yellow_threshold": 20, "orange_threshold": 30, "red_threshold": 10 }"#;
        assert!(matches!(
            DepletionConfig::from_json_str(json),
            Err(RestockError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_config_rejects_zero_horizon() {
        let config = DepletionConfig::default().with_forecast_horizon(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_horizon_upper_bound() {
        let at_limit = DepletionConfig::default().with_forecast_horizon(MAX_FORECAST_HORIZON_DAYS);
        assert!(at_limit.validate().is_ok());

        let too_long = DepletionConfig::default().with_forecast_horizon(u32::MAX);
        assert!(matches!(
            too_long.validate(),
            Err(RestockError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_config_rejects_bad_seasonal_scale() {
        let config = DepletionConfig::default()
            .with_seasonal(SeasonalModelConfig::default().with_changepoint_prior_scale(0.0));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_threshold_config_reached() {
        let threshold = ThresholdConfig::new(ItemId::new("gauze").unwrap(), Decimal::from(20));

        assert!(threshold.is_reached(Decimal::from(20)));
        assert!(threshold.is_reached(Decimal::from(3)));
        assert!(!threshold.is_reached(Decimal::from(21)));
    }
}
