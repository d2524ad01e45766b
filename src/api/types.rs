use crate::award_grid::RING_LEN;
use serde::{
    Deserialize,
    Serialize,
};

fn unlocked() -> bool {
    true
}

/// One grid slot as the strategy service describes it.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Award {
    #[serde(rename = "awardId")]
    pub id: i64,
    #[serde(rename = "awardTitle")]
    pub title: String,
    #[serde(rename = "awardSubtitle", default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub sort: i32,
    #[serde(rename = "awardRuleLockCount", default)]
    pub rule_lock_count: u32,
    #[serde(rename = "isAwardUnlock", default = "unlocked")]
    pub unlocked: bool,
    #[serde(rename = "waitUnLockCount", default)]
    pub draws_to_unlock: u32,
}

/// The award picked by a single draw, or one entry of a ten-draw.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DrawAward {
    pub award_id: i64,
    pub award_title: String,
    /// 1-based slot index.
    pub award_index: i64,
}

impl DrawAward {
    pub fn grid_index(&self) -> usize {
        (self.award_index - 1).rem_euclid(RING_LEN as i64) as usize
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ActivityAccount {
    pub total_count: u32,
    pub total_count_surplus: u32,
    pub day_count: u32,
    pub day_count_surplus: u32,
    pub month_count: u32,
    pub month_count_surplus: u32,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RuleWeightAward {
    pub award_id: i64,
    pub award_title: String,
}

/// One tier of the "draw N times to unlock better awards" ladder.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct RuleWeight {
    #[serde(rename = "ruleWeightCount", default)]
    pub threshold: u32,
    #[serde(rename = "userActivityAccountTotalUseCount", default)]
    pub progress: u32,
    #[serde(rename = "strategyAwards", default)]
    pub awards: Vec<RuleWeightAward>,
}

impl RuleWeight {
    pub fn percent(&self) -> u16 {
        let total = self.threshold.max(1) as u64;
        let pct = (self.progress as u64).saturating_mul(100) / total;
        pct.min(100) as u16
    }

    pub fn is_reached(&self) -> bool {
        self.progress >= self.threshold
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ActivityCount {
    pub total_count: u32,
    pub day_count: u32,
    pub month_count: u32,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SkuProduct {
    pub sku: i64,
    #[serde(default)]
    pub activity_id: i64,
    #[serde(default)]
    pub activity_count_id: i64,
    #[serde(default)]
    pub stock_count: u32,
    #[serde(default)]
    pub stock_count_surplus: u32,
    /// Price in credits.
    #[serde(default)]
    pub product_amount: f64,
    #[serde(default)]
    pub activity_count: Option<ActivityCount>,
}

impl SkuProduct {
    pub fn draws_granted(&self) -> u32 {
        self.activity_count
            .as_ref()
            .map(|count| count.day_count)
            .unwrap_or(0)
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecentWinner {
    pub user_id: String,
    #[serde(default)]
    pub award_id: i64,
    pub award_title: String,
    #[serde(default)]
    pub award_time: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SessionBody<'a> {
    pub user_id: &'a str,
    pub activity_id: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExchangeBody<'a> {
    pub user_id: &'a str,
    pub sku: i64,
}
