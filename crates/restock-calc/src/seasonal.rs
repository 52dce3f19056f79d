//! 季節預測耗盡推估
//!
//! 對品項消耗紀錄擬合加法模型，預測未來每日用量並逐日扣減剩餘量，
//! 找出首次歸零的日子。

use chrono::{DateTime, Duration, NaiveDate, Utc};
use restock_core::{
    DepletionConfig, DepletionEstimate, EstimateError, EstimateMethod, ItemId, Projection,
    UsageEvent,
};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

use crate::ledger::StockLedger;
use crate::model::{AdditiveModel, FitBudget, Observation};

const SECONDS_PER_DAY: i64 = 86_400;

/// 單日預測
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastPoint {
    /// 日期
    pub date: NaiveDate,
    /// 預測時間點
    pub at: DateTime<Utc>,
    /// 預測用量（可能為負）
    pub predicted: f64,
}

/// 季節預測推估器
pub struct SeasonalEstimator;

impl SeasonalEstimator {
    /// 推估品項耗盡日；擬合失敗只影響此品項
    pub fn estimate(
        item: &ItemId,
        events: &[UsageEvent],
        remaining: Decimal,
        now: DateTime<Utc>,
        config: &DepletionConfig,
    ) -> DepletionEstimate {
        DepletionEstimate {
            item: item.clone(),
            method: EstimateMethod::Seasonal,
            outcome: Self::project(events, remaining, now, config),
        }
    }

    fn project(
        events: &[UsageEvent],
        remaining: Decimal,
        now: DateTime<Utc>,
        config: &DepletionConfig,
    ) -> Result<Projection, EstimateError> {
        let observations = Self::observations(events)?;
        if observations.len() < config.min_observations {
            return Err(EstimateError::InsufficientData {
                observations: observations.len(),
                required: config.min_observations,
            });
        }

        if remaining <= Decimal::ZERO {
            return Ok(Projection::AlreadyDepleted);
        }

        let budget = FitBudget::new(config.fit_timeout());
        let model = AdditiveModel::fit(&observations, &config.seasonal, &budget)?;
        let forecast = Self::forecast(&model, now, config.forecast_horizon_days);

        Ok(Self::simulate(remaining, &forecast, now))
    }

    /// 每筆消耗事件一個觀測點（不先按日彙總）
    pub fn observations(events: &[UsageEvent]) -> Result<Vec<Observation>, EstimateError> {
        StockLedger::consumption_events(events)
            .into_iter()
            .map(|e| {
                e.quantity_delta
                    .to_f64()
                    .map(|value| Observation::new(e.timestamp, value))
                    .ok_or_else(|| EstimateError::model_fit(format!("無法轉換數量 {}", e.quantity_delta)))
            })
            .collect()
    }

    /// 產生今天之後 `horizon_days` 天的預測
    ///
    /// 每日預測時間點沿用最後一筆觀測的時刻。
    pub fn forecast(model: &AdditiveModel, now: DateTime<Utc>, horizon_days: u32) -> Vec<ForecastPoint> {
        let anchor_time = model.last_observation().time();
        let today = now.date_naive();

        (1..=i64::from(horizon_days))
            .filter_map(|offset| today.checked_add_signed(Duration::days(offset)))
            .map(|date| {
                let at = date.and_time(anchor_time).and_utc();
                ForecastPoint {
                    date,
                    at,
                    predicted: model.predict(at),
                }
            })
            .collect()
    }

    /// 依時間順序逐日扣減預測用量（負預測視為 0）
    pub fn simulate(remaining: Decimal, forecast: &[ForecastPoint], now: DateTime<Utc>) -> Projection {
        if remaining <= Decimal::ZERO {
            return Projection::AlreadyDepleted;
        }

        let mut simulated_remaining = remaining;
        for point in forecast {
            let usage = Decimal::from_f64(point.predicted.max(0.0)).unwrap_or(Decimal::MAX);
            simulated_remaining = simulated_remaining
                .checked_sub(usage)
                .unwrap_or(Decimal::MIN);

            if simulated_remaining <= Decimal::ZERO {
                let days_until = (point.at - now).num_seconds().div_euclid(SECONDS_PER_DAY);
                return if days_until >= 0 {
                    Projection::DepletesOn {
                        date: point.date,
                        days_until,
                    }
                } else {
                    Projection::AlreadyDepleted
                };
            }
        }

        Projection::SufficientForNow {
            horizon_days: u32::try_from(forecast.len()).unwrap_or(u32::MAX),
        }
    }
}
