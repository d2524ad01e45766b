//! Typed access to the raffle promotion HTTP API.
//!
//! Every endpoint answers with an [`Envelope`]; it is decoded here once and
//! callers only ever see `Result<T, ApiError>`.

use crate::config::Session;

pub mod envelope;
pub mod http;
pub mod types;

#[cfg(test)]
pub mod fake;

pub use envelope::{
    Ack,
    ApiError,
    ApiResult,
    Envelope,
};
pub use http::HttpRaffleApi;
pub use types::{
    ActivityAccount,
    Award,
    DrawAward,
    RecentWinner,
    RuleWeight,
    SkuProduct,
};

pub trait RaffleApi {
    /// Warms the server-side caches for an activity's draw strategy.
    fn armory(&self, activity_id: i64) -> impl Future<Output = ApiResult<Ack>> + Send;

    fn award_list(
        &self,
        session: &Session,
    ) -> impl Future<Output = ApiResult<Vec<Award>>> + Send;

    fn draw(&self, session: &Session) -> impl Future<Output = ApiResult<DrawAward>> + Send;

    fn draw_ten(
        &self,
        session: &Session,
    ) -> impl Future<Output = ApiResult<Vec<DrawAward>>> + Send;

    fn activity_account(
        &self,
        session: &Session,
    ) -> impl Future<Output = ApiResult<ActivityAccount>> + Send;

    fn credit_balance(&self, user_id: &str) -> impl Future<Output = ApiResult<f64>> + Send;

    /// Daily sign-in. Signing twice on the same day is not an error.
    fn sign_in(&self, user_id: &str) -> impl Future<Output = ApiResult<Ack>> + Send;

    fn sign_in_status(&self, user_id: &str) -> impl Future<Output = ApiResult<bool>> + Send;

    fn rule_weights(
        &self,
        session: &Session,
    ) -> impl Future<Output = ApiResult<Vec<RuleWeight>>> + Send;

    fn sku_products(
        &self,
        activity_id: i64,
    ) -> impl Future<Output = ApiResult<Vec<SkuProduct>>> + Send;

    /// Spends credits on a SKU that grants extra draw attempts.
    fn redeem_sku(
        &self,
        user_id: &str,
        sku: i64,
    ) -> impl Future<Output = ApiResult<Ack>> + Send;

    fn recent_winners(
        &self,
        activity_id: i64,
    ) -> impl Future<Output = ApiResult<Vec<RecentWinner>>> + Send;
}
