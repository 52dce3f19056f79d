//! 品項識別碼

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::RestockError;

/// 品項識別碼
///
/// 在邊界處統一正規化（去除首尾空白、合併連續空白、轉小寫），
/// 核心計算不再重複處理名稱大小寫。
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemId(String);

impl ItemId {
    /// 建立並正規化品項識別碼
    pub fn new(raw: &str) -> crate::Result<Self> {
        let normalized = raw
            .split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join(" ");

        if normalized.is_empty() {
            return Err(RestockError::invalid_input("品項名稱不可為空"));
        }

        Ok(Self(normalized))
    }

    /// 取得正規化後的名稱
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ItemId {
    type Err = RestockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ItemId {
    type Error = RestockError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<ItemId> for String {
    fn from(value: ItemId) -> Self {
        value.0
    }
}

impl AsRef<str> for ItemId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
