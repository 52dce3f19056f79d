//! 加法時間序列模型
//!
//! 趨勢（含轉折點的分段線性）+ 傅立葉季節項，以高斯先驗對應的脊懲罰
//! 擬合，只輸出點預測。

use chrono::{DateTime, Utc};
use restock_core::{EstimateError, SeasonalModelConfig};
use std::f64::consts::PI;
use std::time::{Duration, Instant};

use crate::solver::solve_ridge;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// 模型擬合錯誤
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelFitError {
    #[error("觀測筆數不足：{observations} 筆")]
    TooFewObservations { observations: usize },

    #[error("所有觀測落在同一時間點，無法估計趨勢")]
    ZeroTimeSpan,

    #[error("出現非有限數值: {0}")]
    NonFinite(String),

    #[error("正規方程非正定")]
    NotPositiveDefinite,

    #[error("特徵欄數不符：預期 {expected}，實際 {found}")]
    ShapeMismatch { expected: usize, found: usize },

    #[error("擬合逾時（上限 {limit_ms} 毫秒）")]
    TimedOut { limit_ms: u64 },
}

impl From<ModelFitError> for EstimateError {
    fn from(err: ModelFitError) -> Self {
        match err {
            ModelFitError::TimedOut { limit_ms } => EstimateError::ForecastTimeout { limit_ms },
            other => EstimateError::model_fit(other.to_string()),
        }
    }
}

/// 擬合時間預算（在各迴圈中協作檢查）
#[derive(Debug, Clone, Copy)]
pub struct FitBudget {
    deadline: Option<Instant>,
    limit: Duration,
}

impl FitBudget {
    /// 從現在起算的時間上限
    pub fn new(limit: Duration) -> Self {
        Self {
            deadline: Instant::now().checked_add(limit),
            limit,
        }
    }

    /// 不設上限
    pub fn unlimited() -> Self {
        Self {
            deadline: None,
            limit: Duration::MAX,
        }
    }

    /// 超過期限時回傳 `TimedOut`
    pub fn check(&self) -> Result<(), ModelFitError> {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(ModelFitError::TimedOut {
                limit_ms: u64::try_from(self.limit.as_millis()).unwrap_or(u64::MAX),
            }),
            _ => Ok(()),
        }
    }
}

/// 單筆觀測
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub at: DateTime<Utc>,
    pub value: f64,
}

impl Observation {
    pub fn new(at: DateTime<Utc>, value: f64) -> Self {
        Self { at, value }
    }
}

/// 傅立葉季節項
#[derive(Debug, Clone, Copy, PartialEq)]
struct Seasonality {
    period_days: f64,
    order: usize,
}

/// 已擬合的加法模型
#[derive(Debug, Clone)]
pub struct AdditiveModel {
    origin: DateTime<Utc>,
    last_observation: DateTime<Utc>,
    span_days: f64,
    y_scale: f64,
    changepoints: Vec<f64>,
    seasonalities: Vec<Seasonality>,
    coefficients: Vec<f64>,
}

impl AdditiveModel {
    /// 擬合模型（同一天可有多筆觀測）
    pub fn fit(
        observations: &[Observation],
        config: &SeasonalModelConfig,
        budget: &FitBudget,
    ) -> Result<Self, ModelFitError> {
        if observations.len() < 2 {
            return Err(ModelFitError::TooFewObservations {
                observations: observations.len(),
            });
        }
        if observations.iter().any(|o| !o.value.is_finite()) {
            return Err(ModelFitError::NonFinite("觀測值".to_string()));
        }

        let mut sorted = observations.to_vec();
        sorted.sort_by_key(|o| o.at);

        let origin = sorted[0].at;
        let last_observation = sorted[sorted.len() - 1].at;
        let span_days = days_between(origin, last_observation);
        if span_days <= 0.0 {
            return Err(ModelFitError::ZeroTimeSpan);
        }

        let y_scale = sorted
            .iter()
            .map(|o| o.value.abs())
            .fold(0.0_f64, f64::max);
        let y_scale = if y_scale > 0.0 { y_scale } else { 1.0 };

        let scaled_t: Vec<f64> = sorted
            .iter()
            .map(|o| days_between(origin, o.at) / span_days)
            .collect();

        let mut model = Self {
            origin,
            last_observation,
            span_days,
            y_scale,
            changepoints: Self::place_changepoints(&scaled_t, config),
            seasonalities: Self::select_seasonalities(span_days, config),
            coefficients: Vec::new(),
        };

        let mut design = Vec::with_capacity(sorted.len());
        for observation in &sorted {
            budget.check()?;
            design.push(model.features(observation.at));
        }
        let targets: Vec<f64> = sorted.iter().map(|o| o.value / y_scale).collect();

        model.coefficients = solve_ridge(&design, &targets, &model.penalties(config), budget)?;

        Ok(model)
    }

    /// 點預測
    pub fn predict(&self, at: DateTime<Utc>) -> f64 {
        let dot: f64 = self
            .features(at)
            .iter()
            .zip(&self.coefficients)
            .map(|(x, b)| x * b)
            .sum();
        dot * self.y_scale
    }

    /// 最後一筆觀測時間
    pub fn last_observation(&self) -> DateTime<Utc> {
        self.last_observation
    }

    /// 轉折點數量
    pub fn changepoint_count(&self) -> usize {
        self.changepoints.len()
    }

    /// 季節項的週期（天）
    pub fn seasonal_periods(&self) -> Vec<f64> {
        self.seasonalities.iter().map(|s| s.period_days).collect()
    }

    /// 轉折點放在歷史前段的等距觀測位置上
    fn place_changepoints(scaled_t: &[f64], config: &SeasonalModelConfig) -> Vec<f64> {
        let history = (scaled_t.len() as f64 * config.changepoint_range).floor() as usize;
        let count = config.max_changepoints.min(history.saturating_sub(1));
        if count == 0 {
            return Vec::new();
        }

        let last_index = (history - 1) as f64;
        let mut changepoints: Vec<f64> = (1..=count)
            .map(|k| {
                let index = (k as f64 * last_index / count as f64).round() as usize;
                scaled_t[index]
            })
            .collect();
        changepoints.dedup();
        changepoints
    }

    fn select_seasonalities(span_days: f64, config: &SeasonalModelConfig) -> Vec<Seasonality> {
        let mut seasonalities = Vec::new();
        if config.daily_fourier_order > 0 {
            seasonalities.push(Seasonality {
                period_days: 1.0,
                order: config.daily_fourier_order,
            });
        }
        if config.weekly_fourier_order > 0 && span_days >= config.weekly_min_history_days {
            seasonalities.push(Seasonality {
                period_days: 7.0,
                order: config.weekly_fourier_order,
            });
        }
        seasonalities
    }

    /// 特徵：[截距, 斜率, 轉折點..., (sin, cos)...]
    fn features(&self, at: DateTime<Utc>) -> Vec<f64> {
        let t = days_between(self.origin, at) / self.span_days;
        let epoch_days = at.timestamp_millis() as f64 / MILLIS_PER_DAY;

        let mut row = Vec::with_capacity(2 + self.changepoints.len());
        row.push(1.0);
        row.push(t);
        row.extend(self.changepoints.iter().map(|&c| (t - c).max(0.0)));

        for seasonality in &self.seasonalities {
            for k in 1..=seasonality.order {
                let angle = 2.0 * PI * k as f64 * epoch_days / seasonality.period_days;
                row.push(angle.sin());
                row.push(angle.cos());
            }
        }
        row
    }

    /// 各欄脊懲罰 λ = 1 / 先驗尺度²
    fn penalties(&self, config: &SeasonalModelConfig) -> Vec<f64> {
        let trend = 1.0 / config.trend_prior_scale.powi(2);
        let changepoint = 1.0 / config.changepoint_prior_scale.powi(2);
        let seasonal = 1.0 / config.seasonality_prior_scale.powi(2);

        let fourier_terms: usize = self.seasonalities.iter().map(|s| 2 * s.order).sum();

        let mut penalties = vec![trend, trend];
        penalties.extend(std::iter::repeat(changepoint).take(self.changepoints.len()));
        penalties.extend(std::iter::repeat(seasonal).take(fourier_terms));
        penalties
    }
}

fn days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / MILLIS_PER_DAY
}
