//! 線性耗盡推估
//!
//! 以首次消耗至今的平均日消耗量推估耗盡日期。模型簡單但永遠可算，
//! 也是季節模型資料不足時的後備結果。

use chrono::{DateTime, Duration, Utc};
use restock_core::{
    DepletionEstimate, EstimateError, EstimateMethod, ItemId, Projection, UsageEvent,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::ledger::StockLedger;

const SECONDS_PER_DAY: i64 = 86_400;

/// 平均消耗速率
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearRate {
    /// 首次消耗時間
    pub first_usage: DateTime<Utc>,
    /// 經過天數（至少 1）
    pub elapsed_days: i64,
    /// 累計消耗
    pub total_consumption: Decimal,
    /// 日均消耗
    pub daily_rate: Decimal,
}

/// 線性推估器
pub struct LinearEstimator;

impl LinearEstimator {
    /// 推估品項耗盡日期
    pub fn estimate(
        item: &ItemId,
        events: &[UsageEvent],
        remaining: Decimal,
        now: DateTime<Utc>,
    ) -> DepletionEstimate {
        let outcome = Self::daily_rate(events, now)
            .and_then(|rate| Self::project(remaining, rate.daily_rate, now));

        DepletionEstimate {
            item: item.clone(),
            method: EstimateMethod::Linear,
            outcome,
        }
    }

    /// 計算日均消耗速率
    pub fn daily_rate(events: &[UsageEvent], now: DateTime<Utc>) -> Result<LinearRate, EstimateError> {
        let usage = StockLedger::consumption_events(events);
        let first_usage = usage
            .first()
            .map(|e| e.timestamp)
            .ok_or(EstimateError::NoUsageData)?;

        let total_consumption = StockLedger::total_consumption(events)
            .map_err(|_| EstimateError::InsufficientRate)?;

        // 同日或時間倒置時以 1 天計，避免除以零或速率暴衝
        let elapsed_days = (now - first_usage).num_days().max(1);
        let daily_rate = total_consumption / Decimal::from(elapsed_days);

        if daily_rate <= Decimal::ZERO {
            return Err(EstimateError::InsufficientRate);
        }

        Ok(LinearRate {
            first_usage,
            elapsed_days,
            total_consumption,
            daily_rate,
        })
    }

    /// 由剩餘量與日均速率推算耗盡日
    pub fn project(
        remaining: Decimal,
        daily_rate: Decimal,
        now: DateTime<Utc>,
    ) -> Result<Projection, EstimateError> {
        if daily_rate <= Decimal::ZERO {
            return Err(EstimateError::InsufficientRate);
        }

        let days_to_depletion = remaining
            .checked_div(daily_rate)
            .ok_or(EstimateError::InsufficientRate)?;

        if days_to_depletion < Decimal::ZERO {
            return Ok(Projection::AlreadyDepleted);
        }

        // 速率趨近於零時日期超出可表示範圍
        let depleted_at = days_to_depletion
            .checked_mul(Decimal::from(SECONDS_PER_DAY))
            .and_then(|secs| secs.round().to_i64())
            .and_then(Duration::try_seconds)
            .and_then(|offset| now.checked_add_signed(offset))
            .ok_or(EstimateError::InsufficientRate)?;

        let days_until = days_to_depletion
            .floor()
            .to_i64()
            .ok_or(EstimateError::InsufficientRate)?;

        Ok(Projection::DepletesOn {
            date: depleted_at.date_naive(),
            days_until,
        })
    }
}
