use crate::{
    api::{
        RaffleApi,
        envelope::{
            Ack,
            ApiError,
            ApiResult,
            Envelope,
        },
        types::{
            ActivityAccount,
            Award,
            DrawAward,
            ExchangeBody,
            RecentWinner,
            RuleWeight,
            SessionBody,
            SkuProduct,
        },
    },
    config::Session,
};
use reqwest::{
    RequestBuilder,
    header::CONTENT_TYPE,
};
use serde::{
    Serialize,
    de::{
        DeserializeOwned,
        IgnoredAny,
    },
};
use tracing::debug;

pub const API_PREFIX: &str = "/api/v1/raffle";

const JSON_CONTENT_TYPE: &str = "application/json;charset=utf-8";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

#[derive(Clone)]
pub struct HttpRaffleApi {
    base_url: String,
    http: reqwest::Client,
}

impl HttpRaffleApi {
    pub fn new(base_url: impl Into<String>) -> ApiResult<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let http = reqwest::Client::builder()
            .build()
            .map_err(|source| ApiError::Client { source })?;
        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, path)
    }

    async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ApiResult<Envelope<T>> {
        let url = self.url(path);
        let request = self.http.get(&url).query(query);
        Self::exchange(url, request).await
    }

    async fn post_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ApiResult<Envelope<T>> {
        let url = self.url(path);
        let request = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .query(query);
        Self::exchange(url, request).await
    }

    async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<Envelope<T>> {
        let url = self.url(path);
        let payload = serde_json::to_vec(body).map_err(|source| ApiError::Decode {
            url: url.clone(),
            source,
        })?;
        let request = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .body(payload);
        Self::exchange(url, request).await
    }

    async fn exchange<T: DeserializeOwned>(
        url: String,
        request: RequestBuilder,
    ) -> ApiResult<Envelope<T>> {
        debug!(%url, "raffle API request");
        let res = match request.send().await {
            Ok(res) => res,
            Err(source) => return Err(ApiError::Transport { url, source }),
        };
        let status = res.status();
        let bytes = match res.bytes().await {
            Ok(bytes) => bytes,
            Err(source) => return Err(ApiError::Transport { url, source }),
        };
        if !status.is_success() {
            let body = String::from_utf8_lossy(&bytes).into_owned();
            return Err(ApiError::Status { url, status, body });
        }
        serde_json::from_slice(&bytes).map_err(|source| ApiError::Decode { url, source })
    }
}

fn session_body(session: &Session) -> SessionBody<'_> {
    SessionBody {
        user_id: &session.user_id,
        activity_id: session.activity_id,
    }
}

impl RaffleApi for HttpRaffleApi {
    async fn armory(&self, activity_id: i64) -> ApiResult<Ack> {
        self.get_with_query::<IgnoredAny>(
            "/activity/armory",
            &[("activityId", activity_id.to_string())],
        )
        .await?
        .into_ack()
    }

    async fn award_list(&self, session: &Session) -> ApiResult<Vec<Award>> {
        self.post_json::<Vec<Award>, _>(
            "/strategy/query_raffle_award_list",
            &session_body(session),
        )
        .await?
        .into_data_or_default()
    }

    async fn draw(&self, session: &Session) -> ApiResult<DrawAward> {
        self.post_json::<DrawAward, _>("/activity/draw", &session_body(session))
            .await?
            .into_data()
    }

    async fn draw_ten(&self, session: &Session) -> ApiResult<Vec<DrawAward>> {
        self.post_json::<Vec<DrawAward>, _>("/activity/drawTen", &session_body(session))
            .await?
            .into_data_or_default()
    }

    async fn activity_account(&self, session: &Session) -> ApiResult<ActivityAccount> {
        self.post_json::<ActivityAccount, _>(
            "/activity/query_user_activity_account",
            &session_body(session),
        )
        .await?
        .into_data()
    }

    async fn credit_balance(&self, user_id: &str) -> ApiResult<f64> {
        self.post_with_query::<f64>(
            "/activity/query_user_credit_account",
            &[("userId", user_id.to_string())],
        )
        .await?
        .into_data()
    }

    async fn sign_in(&self, user_id: &str) -> ApiResult<Ack> {
        self.post_with_query::<IgnoredAny>(
            "/activity/calendar_sign_rebate",
            &[("userId", user_id.to_string())],
        )
        .await?
        .into_idempotent_ack()
    }

    async fn sign_in_status(&self, user_id: &str) -> ApiResult<bool> {
        self.post_with_query::<bool>(
            "/activity/is_calendar_sign_rebate",
            &[("userId", user_id.to_string())],
        )
        .await?
        .into_data()
    }

    async fn rule_weights(&self, session: &Session) -> ApiResult<Vec<RuleWeight>> {
        self.post_json::<Vec<RuleWeight>, _>(
            "/strategy/query_raffle_strategy_rule_weight",
            &session_body(session),
        )
        .await?
        .into_data_or_default()
    }

    async fn sku_products(&self, activity_id: i64) -> ApiResult<Vec<SkuProduct>> {
        self.post_with_query::<Vec<SkuProduct>>(
            "/activity/query_sku_product_list_by_activity_id",
            &[("activityId", activity_id.to_string())],
        )
        .await?
        .into_data_or_default()
    }

    async fn redeem_sku(&self, user_id: &str, sku: i64) -> ApiResult<Ack> {
        self.post_json::<IgnoredAny, _>(
            "/activity/credit_pay_exchange_sku",
            &ExchangeBody { user_id, sku },
        )
        .await?
        .into_ack()
    }

    async fn recent_winners(&self, activity_id: i64) -> ApiResult<Vec<RecentWinner>> {
        self.get_with_query::<Vec<RecentWinner>>(
            "/activity/queryRecentRaffleUsers",
            &[("activityId", activity_id.to_string())],
        )
        .await?
        .into_data_or_default()
    }
}
