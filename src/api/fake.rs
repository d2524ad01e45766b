//! In-memory [`RaffleApi`] with canned replies and call counters.

use crate::{
    api::{
        Ack,
        ActivityAccount,
        ApiError,
        ApiResult,
        Award,
        DrawAward,
        RaffleApi,
        RecentWinner,
        RuleWeight,
        SkuProduct,
    },
    config::Session,
};
use std::{
    collections::HashMap,
    sync::{
        Arc,
        Mutex,
    },
};

#[derive(Clone, Debug)]
pub enum Reply<T> {
    Data(T),
    Reject { code: String, info: String },
    Offline,
}

impl<T: Clone> Reply<T> {
    pub fn reject(code: &str, info: &str) -> Self {
        Reply::Reject {
            code: code.to_string(),
            info: info.to_string(),
        }
    }

    fn to_result(&self, endpoint: &str) -> ApiResult<T> {
        match self {
            Reply::Data(data) => Ok(data.clone()),
            Reply::Reject { code, info } => Err(ApiError::Business {
                code: code.clone(),
                info: info.clone(),
            }),
            Reply::Offline => Err(ApiError::Status {
                url: format!("fake://{endpoint}"),
                status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
                body: String::new(),
            }),
        }
    }
}

pub fn award(index: i64) -> Award {
    Award {
        id: 100 + index,
        title: format!("Award {index}"),
        subtitle: None,
        sort: index as i32,
        rule_lock_count: 0,
        unlocked: true,
        draws_to_unlock: 0,
    }
}

pub fn draw_award(award_index: i64) -> DrawAward {
    DrawAward {
        award_id: 100 + award_index,
        award_title: format!("Award {award_index}"),
        award_index,
    }
}

struct FakeState {
    armory: Reply<Ack>,
    award_list: Reply<Vec<Award>>,
    draw: Reply<DrawAward>,
    draw_ten: Reply<Vec<DrawAward>>,
    account: Reply<ActivityAccount>,
    credit: Reply<f64>,
    sign_in: Reply<Ack>,
    sign_in_status: Reply<bool>,
    rule_weights: Reply<Vec<RuleWeight>>,
    skus: Reply<Vec<SkuProduct>>,
    redeem: Reply<Ack>,
    winners: Reply<Vec<RecentWinner>>,
    calls: HashMap<&'static str, usize>,
}

impl Default for FakeState {
    fn default() -> Self {
        FakeState {
            armory: Reply::Data(Ack::Done),
            award_list: Reply::Data((0..8).map(award).collect()),
            draw: Reply::Data(draw_award(1)),
            draw_ten: Reply::Data((1..=10).map(|i| draw_award((i % 8) + 1)).collect()),
            account: Reply::Data(ActivityAccount {
                day_count_surplus: 3,
                ..ActivityAccount::default()
            }),
            credit: Reply::Data(0.0),
            sign_in: Reply::Data(Ack::Done),
            sign_in_status: Reply::Data(false),
            rule_weights: Reply::Data(Vec::new()),
            skus: Reply::Data(Vec::new()),
            redeem: Reply::Data(Ack::Done),
            winners: Reply::Data(Vec::new()),
            calls: HashMap::new(),
        }
    }
}

#[derive(Clone, Default)]
pub struct FakeRaffleApi {
    state: Arc<Mutex<FakeState>>,
}

macro_rules! setter {
    ($name:ident, $field:ident, $ty:ty) => {
        pub fn $name(&self, reply: Reply<$ty>) {
            self.state.lock().unwrap().$field = reply;
        }
    };
}

impl FakeRaffleApi {
    setter!(set_armory, armory, Ack);
    setter!(set_award_list, award_list, Vec<Award>);
    setter!(set_draw, draw, DrawAward);
    setter!(set_draw_ten, draw_ten, Vec<DrawAward>);
    setter!(set_account, account, ActivityAccount);
    setter!(set_credit, credit, f64);
    setter!(set_sign_in, sign_in, Ack);
    setter!(set_sign_in_status, sign_in_status, bool);
    setter!(set_rule_weights, rule_weights, Vec<RuleWeight>);
    setter!(set_skus, skus, Vec<SkuProduct>);
    setter!(set_redeem, redeem, Ack);
    setter!(set_winners, winners, Vec<RecentWinner>);

    pub fn calls(&self, endpoint: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .get(endpoint)
            .copied()
            .unwrap_or(0)
    }

    fn answer<T: Clone>(
        &self,
        endpoint: &'static str,
        pick: impl FnOnce(&FakeState) -> &Reply<T>,
    ) -> ApiResult<T> {
        let mut state = self.state.lock().unwrap();
        *state.calls.entry(endpoint).or_default() += 1;
        pick(&*state).to_result(endpoint)
    }
}

impl RaffleApi for FakeRaffleApi {
    async fn armory(&self, _activity_id: i64) -> ApiResult<Ack> {
        self.answer("armory", |s| &s.armory)
    }

    async fn award_list(&self, _session: &Session) -> ApiResult<Vec<Award>> {
        self.answer("award_list", |s| &s.award_list)
    }

    async fn draw(&self, _session: &Session) -> ApiResult<DrawAward> {
        self.answer("draw", |s| &s.draw)
    }

    async fn draw_ten(&self, _session: &Session) -> ApiResult<Vec<DrawAward>> {
        self.answer("draw_ten", |s| &s.draw_ten)
    }

    async fn activity_account(&self, _session: &Session) -> ApiResult<ActivityAccount> {
        self.answer("activity_account", |s| &s.account)
    }

    async fn credit_balance(&self, _user_id: &str) -> ApiResult<f64> {
        self.answer("credit_balance", |s| &s.credit)
    }

    async fn sign_in(&self, _user_id: &str) -> ApiResult<Ack> {
        self.answer("sign_in", |s| &s.sign_in)
    }

    async fn sign_in_status(&self, _user_id: &str) -> ApiResult<bool> {
        self.answer("sign_in_status", |s| &s.sign_in_status)
    }

    async fn rule_weights(&self, _session: &Session) -> ApiResult<Vec<RuleWeight>> {
        self.answer("rule_weights", |s| &s.rule_weights)
    }

    async fn sku_products(&self, _activity_id: i64) -> ApiResult<Vec<SkuProduct>> {
        self.answer("sku_products", |s| &s.skus)
    }

    async fn redeem_sku(&self, _user_id: &str, _sku: i64) -> ApiResult<Ack> {
        self.answer("redeem_sku", |s| &s.redeem)
    }

    async fn recent_winners(&self, _activity_id: i64) -> ApiResult<Vec<RecentWinner>> {
        self.answer("recent_winners", |s| &s.winners)
    }
}
