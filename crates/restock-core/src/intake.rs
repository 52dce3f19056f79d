//! 用量紀錄文字解析
//!
//! 將「品名 數量」形式的紀錄轉為已驗證的用量事件，例如 `used 10ml saline`。

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::{ItemId, RestockError, UsageEvent};

/// 數字片段（整數或小數）
static NUMERIC_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+(\.\d+)?)").expect("數字規則格式固定"));

/// 名稱中忽略的字詞（比對前已轉小寫）
const STOP_WORDS: &[&str] = &[
    "use",
    "used",
    "ml",
    "mill",
    "for",
    "milliliter",
    "milliliters",
];

/// 解析後的用量紀錄
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageEntry {
    /// 品項
    pub item: ItemId,

    /// 消耗量
    pub quantity: Decimal,
}

impl UsageEntry {
    /// 轉為消耗事件
    pub fn into_event(self, at: DateTime<Utc>) -> UsageEvent {
        UsageEvent::consumption(self.item, self.quantity, at)
    }
}

/// 解析用量紀錄文字
///
/// 含數字的字詞決定數量（最後一個為準），其餘非停用字組成品名。
pub fn parse_usage_entry(text: &str) -> crate::Result<UsageEntry> {
    let text = text.trim();
    if text.is_empty() {
        return Err(RestockError::invalid_input("用量紀錄不可為空"));
    }

    let mut quantity = None;
    let mut name_parts = Vec::new();

    for word in text.to_lowercase().split_whitespace() {
        if let Some(found) = NUMERIC_TOKEN.find(word) {
            let value = Decimal::from_str(found.as_str()).map_err(|e| {
                RestockError::invalid_input(format!("無法解析數量 {}: {}", found.as_str(), e))
            })?;
            quantity = Some(value);
        } else if !STOP_WORDS.contains(&word) {
            name_parts.push(word.to_string());
        }
    }

    let quantity = quantity
        .ok_or_else(|| RestockError::invalid_input("格式錯誤，請使用「品名 數量」"))?;
    if name_parts.is_empty() {
        return Err(RestockError::invalid_input("格式錯誤，請使用「品名 數量」"));
    }

    Ok(UsageEntry {
        item: ItemId::new(&name_parts.join(" "))?,
        quantity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    #[rstest]
    #[case("saline 10", "saline", "10")]
    #[case("Used 12.5ml Sodium Chloride", "sodium chloride", "12.5")]
    #[case("use 5 mill for betadine", "betadine", "5")]
    #[case("lidocaine 3 then 4", "lidocaine then", "4")]
    #[case("  HEPARIN   7 milliliters ", "heparin", "7")]
    #[case("Min 2 syrup", "min syrup", "2")]
    fn test_parse_usage_entry(
        #[case] text: &str,
        #[case] expected_item: &str,
        #[case] expected_qty: &str,
    ) {
        let entry = parse_usage_entry(text).unwrap();

        assert_eq!(entry.item.as_str(), expected_item);
        assert_eq!(entry.quantity, Decimal::from_str(expected_qty).unwrap());
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("saline")]
    #[case("used 10 ml")]
    #[case("15")]
    fn test_parse_usage_entry_rejects(#[case] text: &str) {
        assert!(matches!(
            parse_usage_entry(text),
            Err(RestockError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_entry_into_event() {
        let at = Utc.with_ymd_and_hms(2025, 11, 3, 14, 0, 0).unwrap();
        let event = parse_usage_entry("gauze 4").unwrap().into_event(at);

        assert_eq!(event.item.as_str(), "gauze");
        assert_eq!(event.quantity_delta, Decimal::from(4));
        assert_eq!(event.timestamp, at);
        assert!(event.is_consumption());
    }
}
