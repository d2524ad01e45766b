#![allow(non_snake_case)]

mod common;

use common::MockRaffleServer;
use raffle_console::{
    api::{
        Ack,
        ApiError,
        HttpRaffleApi,
        RaffleApi,
        envelope::NETWORK_ERROR_MESSAGE,
    },
    config::Session,
};
use serde_json::json;

fn session() -> Session {
    Session::new("xiaofuge", 100301)
}

fn client(server: &MockRaffleServer) -> HttpRaffleApi {
    HttpRaffleApi::new(server.base_url()).unwrap()
}

fn awards_json(n: i64) -> serde_json::Value {
    let awards: Vec<_> = (1..=n)
        .map(|i| {
            json!({
                "awardId": 100 + i,
                "awardTitle": format!("Award {i}"),
                "awardSubtitle": null,
                "sort": i,
                "awardRuleLockCount": if i == 8 { 6 } else { 0 },
                "isAwardUnlock": i != 8,
                "waitUnLockCount": if i == 8 { 4 } else { 0 },
            })
        })
        .collect();
    json!({"code": "0000", "info": "ok", "data": awards})
}

#[tokio::test]
async fn award_list__posts_session_as_json_and_decodes_awards() {
    // given
    let server = MockRaffleServer::start();
    server.reply("/strategy/query_raffle_award_list", awards_json(8));
    let api = client(&server);

    // when
    let awards = api.award_list(&session()).await.unwrap();

    // then
    let request = server.last_request();
    assert_eq!(request.method, "POST");
    assert_eq!(request.path, "/api/v1/raffle/strategy/query_raffle_award_list");
    assert!(request.content_type.starts_with("application/json"));
    assert_eq!(
        request.json_body(),
        json!({"userId": "xiaofuge", "activityId": 100301})
    );
    assert_eq!(awards.len(), 8);
    assert_eq!(awards[0].title, "Award 1");
    assert!(!awards[7].unlocked);
    assert_eq!(awards[7].draws_to_unlock, 4);
}

#[tokio::test]
async fn draw__decodes_award_index() {
    // given
    let server = MockRaffleServer::start();
    server.reply(
        "/activity/draw",
        json!({"code": "0000", "info": "ok", "data": {"awardId": 103, "awardTitle": "Cup", "awardIndex": 3}}),
    );
    let api = client(&server);

    // when
    let award = api.draw(&session()).await.unwrap();

    // then
    assert_eq!(award.award_index, 3);
    assert_eq!(award.grid_index(), 2);
    assert_eq!(server.last_request().path, "/api/v1/raffle/activity/draw");
}

#[tokio::test]
async fn draw__business_failure_carries_server_info() {
    // given
    let server = MockRaffleServer::start();
    server.reply(
        "/activity/draw",
        json!({"code": "0001", "info": "insufficient attempts", "data": null}),
    );
    let api = client(&server);

    // when
    let err = api.draw(&session()).await.unwrap_err();

    // then
    assert!(err.is_business());
    assert_eq!(err.user_message(), "insufficient attempts");
}

#[tokio::test]
async fn sign_in__treats_already_signed_code_as_success() {
    // given
    let server = MockRaffleServer::start();
    server.reply(
        "/activity/calendar_sign_rebate",
        json!({"code": "0003", "info": "already signed"}),
    );
    let api = client(&server);

    // when
    let ack = api.sign_in("xiaofuge").await.unwrap();

    // then
    let request = server.last_request();
    assert_eq!(ack, Ack::AlreadyDone);
    assert_eq!(request.method, "POST");
    assert_eq!(request.query, "userId=xiaofuge");
    assert!(
        request
            .content_type
            .starts_with("application/x-www-form-urlencoded")
    );
}

#[tokio::test]
async fn redeem_sku__rejects_already_done_code() {
    // given
    let server = MockRaffleServer::start();
    server.reply(
        "/activity/credit_pay_exchange_sku",
        json!({"code": "0003", "info": "duplicate order"}),
    );
    let api = client(&server);

    // when
    let result = api.redeem_sku("xiaofuge", 9011).await;

    // then
    assert!(matches!(result, Err(ApiError::Business { ref code, .. }) if code == "0003"));
    assert_eq!(
        server.last_request().json_body(),
        json!({"userId": "xiaofuge", "sku": 9011})
    );
}

#[tokio::test]
async fn endpoints__use_documented_methods_paths_and_parameters() {
    // given
    let server = MockRaffleServer::start();
    let ok_null = json!({"code": "0000", "info": "ok", "data": null});
    for path in [
        "/activity/armory",
        "/activity/drawTen",
        "/strategy/query_raffle_strategy_rule_weight",
        "/activity/query_sku_product_list_by_activity_id",
        "/activity/queryRecentRaffleUsers",
    ] {
        server.reply(path, ok_null.clone());
    }
    server.reply(
        "/activity/query_user_activity_account",
        json!({"code": "0000", "info": "ok", "data": {"dayCount": 10, "dayCountSurplus": 7}}),
    );
    server.reply(
        "/activity/query_user_credit_account",
        json!({"code": "0000", "info": "ok", "data": 12.5}),
    );
    server.reply(
        "/activity/is_calendar_sign_rebate",
        json!({"code": "0000", "info": "ok", "data": true}),
    );
    let api = client(&server);
    let session = session();

    // when
    api.armory(100301).await.unwrap();
    let ten = api.draw_ten(&session).await.unwrap();
    let account = api.activity_account(&session).await.unwrap();
    let credit = api.credit_balance("xiaofuge").await.unwrap();
    let signed = api.sign_in_status("xiaofuge").await.unwrap();
    let tiers = api.rule_weights(&session).await.unwrap();
    let skus = api.sku_products(100301).await.unwrap();
    let winners = api.recent_winners(100301).await.unwrap();

    // then
    let seen: Vec<(String, String, String)> = server
        .requests()
        .into_iter()
        .map(|r| {
            (
                r.method,
                r.path.trim_start_matches(common::PREFIX).to_string(),
                r.query,
            )
        })
        .collect();
    let expected = [
        ("GET", "/activity/armory", "activityId=100301"),
        ("POST", "/activity/drawTen", ""),
        ("POST", "/activity/query_user_activity_account", ""),
        ("POST", "/activity/query_user_credit_account", "userId=xiaofuge"),
        ("POST", "/activity/is_calendar_sign_rebate", "userId=xiaofuge"),
        ("POST", "/strategy/query_raffle_strategy_rule_weight", ""),
        (
            "POST",
            "/activity/query_sku_product_list_by_activity_id",
            "activityId=100301",
        ),
        ("GET", "/activity/queryRecentRaffleUsers", "activityId=100301"),
    ];
    let expected: Vec<(String, String, String)> = expected
        .iter()
        .map(|(m, p, q)| (m.to_string(), p.to_string(), q.to_string()))
        .collect();
    assert_eq!(seen, expected);
    assert!(ten.is_empty());
    assert_eq!(account.day_count_surplus, 7);
    assert_eq!(credit, 12.5);
    assert!(signed);
    assert!(tiers.is_empty());
    assert!(skus.is_empty());
    assert!(winners.is_empty());
}

#[tokio::test]
async fn server_error__is_reported_as_network_problem() {
    // given
    let server = MockRaffleServer::start();
    server.reply_raw("/activity/draw", 500, "boom");
    let api = client(&server);

    // when
    let err = api.draw(&session()).await.unwrap_err();

    // then
    assert!(matches!(err, ApiError::Status { .. }));
    assert_eq!(err.user_message(), NETWORK_ERROR_MESSAGE);
}

#[tokio::test]
async fn malformed_body__is_a_decode_failure() {
    let server = MockRaffleServer::start();
    server.reply_raw("/activity/draw", 200, "<html>gateway</html>");
    let api = client(&server);

    let err = api.draw(&session()).await.unwrap_err();

    assert!(matches!(err, ApiError::Decode { .. }));
    assert!(!err.is_business());
}

#[tokio::test]
async fn unreachable_server__is_a_transport_failure() {
    // given
    let port = {
        let listener = std::net::TcpListener::bind(("127.0.0.1", 0)).unwrap();
        listener.local_addr().unwrap().port()
    };
    let api = HttpRaffleApi::new(format!("http://127.0.0.1:{port}")).unwrap();

    // when
    let err = api.sign_in("xiaofuge").await.unwrap_err();

    // then
    assert!(matches!(err, ApiError::Transport { .. }));
    assert_eq!(err.user_message(), NETWORK_ERROR_MESSAGE);
}
