//! 採購清單排序

use restock_core::BuyListEntry;

/// 採購清單排序器
pub struct BuyListRanker;

impl BuyListRanker {
    /// 依 (等級優先級, 剩餘量, 品項) 遞增排序
    ///
    /// 同等級中剩餘量越少越前面；品項名稱保證相同輸入得到相同順序。
    pub fn rank(mut entries: Vec<BuyListEntry>) -> Vec<BuyListEntry> {
        entries.sort_by(|a, b| {
            a.severity
                .priority()
                .cmp(&b.severity.priority())
                .then_with(|| a.remaining.cmp(&b.remaining))
                .then_with(|| a.item.cmp(&b.item))
        });
        entries
    }
}
