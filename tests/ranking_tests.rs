//! Integration tests for round and global rankings

use axum::http::{header::AUTHORIZATION, StatusCode};
use axum_test::TestServer;
use bolao_server::{
    auth::JwtManager,
    create_test_app,
    db::{
        models::{Role, User},
        DbPool,
    },
};
use serde_json::{json, Value};
use std::sync::Arc;

async fn setup() -> (TestServer, DbPool, Arc<JwtManager>) {
    let (app, pool, jwt) = create_test_app().await;
    (TestServer::new(app).unwrap(), pool, jwt)
}

async fn seed_user(pool: &DbPool, name: &str) -> String {
    seed_user_flags(pool, name, false, false).await
}

async fn seed_user_flags(pool: &DbPool, name: &str, banned: bool, withdrawn: bool) -> String {
    let mut user = User::new(name.to_string());
    user.banned = banned;
    user.withdrawn = withdrawn;
    sqlx::query(
        "INSERT INTO users (id, display_name, banned, withdrawn, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&user.id)
    .bind(&user.display_name)
    .bind(user.banned)
    .bind(user.withdrawn)
    .bind(&user.created_at)
    .execute(pool)
    .await
    .unwrap();
    user.id
}

fn token(jwt: &JwtManager, user_id: &str, name: &str, role: Role, authorized: bool) -> String {
    jwt.create_token(user_id.to_string(), name.to_string(), role, authorized)
        .unwrap()
}

/// Two rounds with one match each; returns (round1, match1, round2, match2).
async fn create_two_rounds(server: &TestServer, admin_token: &str) -> (i64, i64, i64, i64) {
    let pool_resp = server
        .post("/api/pools")
        .add_header(AUTHORIZATION, format!("Bearer {}", admin_token))
        .json(&json!({ "name": "Bolao" }))
        .await;
    let pool_id = pool_resp.json::<Value>()["id"].as_i64().unwrap();

    let tour_resp = server
        .post("/api/tournaments")
        .add_header(AUTHORIZATION, format!("Bearer {}", admin_token))
        .json(&json!({ "pool_id": pool_id, "name": "Serie A" }))
        .await;
    let tournament_id = tour_resp.json::<Value>()["id"].as_i64().unwrap();

    let mut ids = Vec::new();
    for i in 1..=2 {
        let round_resp = server
            .post("/api/rounds")
            .add_header(AUTHORIZATION, format!("Bearer {}", admin_token))
            .json(&json!({ "tournament_id": tournament_id, "name": format!("Rodada {}", i) }))
            .await;
        let round_id = round_resp.json::<Value>()["id"].as_i64().unwrap();

        let match_resp = server
            .post("/api/matches")
            .add_header(AUTHORIZATION, format!("Bearer {}", admin_token))
            .json(&json!({
                "round_id": round_id,
                "team_home": "Casa",
                "team_away": "Fora",
                "scheduled_at": "2026-08-26T20:00:00Z"
            }))
            .await;
        let match_id = match_resp.json::<Value>()["id"].as_i64().unwrap();
        ids.push((round_id, match_id));
    }

    (ids[0].0, ids[0].1, ids[1].0, ids[1].1)
}

async fn place_bet(server: &TestServer, user_token: &str, match_id: i64, pick: &str) {
    server
        .post("/api/bets")
        .add_header(AUTHORIZATION, format!("Bearer {}", user_token))
        .json(&json!({ "match_id": match_id, "pick": pick }))
        .await
        .assert_status_ok();
}

async fn settle(server: &TestServer, admin_token: &str, match_id: i64, outcome: &str) {
    server
        .post(&format!("/api/matches/{}/outcome", match_id))
        .add_header(AUTHORIZATION, format!("Bearer {}", admin_token))
        .json(&json!({ "outcome": outcome }))
        .await
        .assert_status_ok();
}

// ============================================================================
// Round Ranking Tests
// ============================================================================

#[tokio::test]
async fn test_round_ranking_includes_zero_bet_users_and_orders_ties_by_name() {
    let (server, pool, jwt) = setup().await;
    let admin_id = seed_user(&pool, "admin").await;
    let admin_token = token(&jwt, &admin_id, "admin", Role::Admin, true);
    let (round1, match1, _round2, _match2) = create_two_rounds(&server, &admin_token).await;

    let carla = seed_user(&pool, "carla").await;
    let bruno = seed_user(&pool, "Bruno").await;
    // "zeca" never bets but must still appear
    seed_user(&pool, "zeca").await;

    place_bet(&server, &token(&jwt, &carla, "carla", Role::Player, true), match1, "home").await;
    place_bet(&server, &token(&jwt, &bruno, "Bruno", Role::Player, true), match1, "home").await;
    settle(&server, &admin_token, match1, "home").await;

    let response = server
        .get(&format!("/api/rankings/rounds/{}", round1))
        .add_header(
            AUTHORIZATION,
            format!("Bearer {}", token(&jwt, &carla, "carla", Role::Player, true)),
        )
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let entries = body.as_array().unwrap();
    // admin, Bruno, carla, zeca all present exactly once
    assert_eq!(entries.len(), 4);

    // Bruno and carla tie on 1 point; case-insensitive name order breaks it
    assert_eq!(entries[0]["display_name"], "Bruno");
    assert_eq!(entries[0]["points"], 1);
    assert_eq!(entries[1]["display_name"], "carla");
    assert_eq!(entries[1]["points"], 1);
    assert_eq!(entries[2]["display_name"], "admin");
    assert_eq!(entries[2]["points"], 0);
    assert_eq!(entries[3]["display_name"], "zeca");
    assert_eq!(entries[3]["points"], 0);
}

#[tokio::test]
async fn test_round_ranking_counts_only_that_round() {
    let (server, pool, jwt) = setup().await;
    let admin_id = seed_user(&pool, "admin").await;
    let admin_token = token(&jwt, &admin_id, "admin", Role::Admin, true);
    let (round1, match1, _round2, match2) = create_two_rounds(&server, &admin_token).await;

    let ana = seed_user(&pool, "ana").await;
    let ana_token = token(&jwt, &ana, "ana", Role::Player, true);

    place_bet(&server, &ana_token, match1, "draw").await;
    place_bet(&server, &ana_token, match2, "away").await;
    settle(&server, &admin_token, match1, "draw").await;
    settle(&server, &admin_token, match2, "away").await;

    let response = server
        .get(&format!("/api/rankings/rounds/{}", round1))
        .add_header(AUTHORIZATION, format!("Bearer {}", ana_token))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let ana_entry = body
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["display_name"] == "ana")
        .unwrap();
    assert_eq!(ana_entry["points"], 1);
}

#[tokio::test]
async fn test_round_ranking_unknown_round() {
    let (server, pool, jwt) = setup().await;
    let user_id = seed_user(&pool, "ana").await;
    let user_token = token(&jwt, &user_id, "ana", Role::Player, true);

    let response = server
        .get("/api/rankings/rounds/999")
        .add_header(AUTHORIZATION, format!("Bearer {}", user_token))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
}

// ============================================================================
// Global Ranking Tests
// ============================================================================

#[tokio::test]
async fn test_global_ranking_sums_across_rounds() {
    let (server, pool, jwt) = setup().await;
    let admin_id = seed_user(&pool, "admin").await;
    let admin_token = token(&jwt, &admin_id, "admin", Role::Admin, true);
    let (_round1, match1, _round2, match2) = create_two_rounds(&server, &admin_token).await;

    let ana = seed_user(&pool, "ana").await;
    let ana_token = token(&jwt, &ana, "ana", Role::Player, true);

    place_bet(&server, &ana_token, match1, "home").await;
    place_bet(&server, &ana_token, match2, "draw").await;
    settle(&server, &admin_token, match1, "home").await;
    settle(&server, &admin_token, match2, "draw").await;

    let response = server
        .get("/api/rankings/global")
        .add_header(AUTHORIZATION, format!("Bearer {}", ana_token))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let entries = body.as_array().unwrap();
    assert_eq!(entries[0]["display_name"], "ana");
    assert_eq!(entries[0]["points"], 2);
}

// ============================================================================
// Projection Tests
// ============================================================================

#[tokio::test]
async fn test_flags_omitted_for_players_present_for_admin() {
    let (server, pool, jwt) = setup().await;
    let admin_id = seed_user(&pool, "admin").await;
    let admin_token = token(&jwt, &admin_id, "admin", Role::Admin, true);
    seed_user_flags(&pool, "banido", true, false).await;

    let player_id = seed_user(&pool, "ana").await;
    let player_token = token(&jwt, &player_id, "ana", Role::Player, true);

    let player_view = server
        .get("/api/rankings/global")
        .add_header(AUTHORIZATION, format!("Bearer {}", player_token))
        .await;
    player_view.assert_status_ok();
    for entry in player_view.json::<Value>().as_array().unwrap() {
        assert!(entry.get("banned").is_none(), "banned leaked to player");
        assert!(entry.get("withdrawn").is_none(), "withdrawn leaked to player");
    }

    let admin_view = server
        .get("/api/rankings/global")
        .add_header(AUTHORIZATION, format!("Bearer {}", admin_token))
        .await;
    admin_view.assert_status_ok();
    let body: Value = admin_view.json();
    let banido = body
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["display_name"] == "banido")
        .unwrap();
    assert_eq!(banido["banned"], true);
    assert_eq!(banido["withdrawn"], false);
}
