//! Router-level tests against the in-memory backend.

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::{app::build_app, config::AppConfig, state::AppState};

fn app() -> Router {
    build_app(AppState::in_memory(AppConfig::for_tests()))
}

async fn call(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let req = match body {
        Some(body) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => req.body(Body::empty()),
    }
    .unwrap();

    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn register(app: &Router, name: &str, email: &str) -> String {
    let (status, body) = call(
        app,
        Method::POST,
        "/api/v1/auth/register",
        None,
        Some(json!({
            "name": name,
            "email": email,
            "password": "correct-horse",
            "gender": "male",
            "dateOfBirth": "1994-07-21",
            "age": 30,
            "heightCm": 175.0,
            "weightKg": 72.0,
            "gymTiming": "06:00 AM"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["accessToken"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_is_public() {
    let app = app();
    let res = app
        .oneshot(Request::get("/api/v1/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn protected_routes_need_a_token() {
    let app = app();
    let (status, body) = call(&app, Method::GET, "/api/v1/exercise/body-parts", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn duplicate_registration_conflicts_and_login_works() {
    let app = app();
    register(&app, "Kiran", "kiran@mail.com").await;
    let (status, _) = call(
        &app,
        Method::POST,
        "/api/v1/auth/register",
        None,
        Some(json!({
            "name": "Kiran", "email": "KIRAN@mail.com", "password": "correct-horse",
            "gender": "male", "dateOfBirth": "1994-07-21", "age": 30,
            "heightCm": 175.0, "weightKg": 72.0, "gymTiming": "06:00 AM"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({"email": "kiran@mail.com", "password": "correct-horse"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["bmi"], 23.5);

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({"email": "kiran@mail.com", "password": "wrong-horse"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn personal_sets_stop_at_three_and_show_in_history() {
    let app = app();
    let token = register(&app, "Meera", "meera@mail.com").await;
    let token = Some(token.as_str());

    let (status, bp) = call(
        &app,
        Method::POST,
        "/api/v1/exercise/body-part",
        token,
        Some(json!({"name": "Legs", "day": "Monday"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, ex) = call(
        &app,
        Method::POST,
        "/api/v1/exercise",
        token,
        Some(json!({"bodyPartId": bp["id"], "name": "Squat"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    for n in 1..=3 {
        let (status, set) = call(
            &app,
            Method::POST,
            "/api/v1/exercise/set",
            token,
            Some(json!({"exerciseId": ex["id"], "weightKg": 60.0, "reps": 5})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(set["setNumber"], n);
        assert_eq!(set["scopeId"], Value::Null);
    }
    let (status, err) = call(
        &app,
        Method::POST,
        "/api/v1/exercise/set",
        token,
        Some(json!({"exerciseId": ex["id"], "weightKg": 60.0, "reps": 5})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["code"], "DAILY_SET_LIMIT_REACHED");
    assert_eq!(err["message"], "Maximum 3 sets per exercise per day reached");

    let uri = format!("/api/v1/exercise/{}/history?page=0&limit=10", ex["id"].as_str().unwrap());
    let (status, history) = call(&app, Method::GET, &uri, token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history["exerciseName"], "Squat");
    assert_eq!(history["bodyPartName"], "Legs");
    assert_eq!(history["setsCount"], 3);
    assert_eq!(history["averageWeightKg"], 60.0);
    assert_eq!(history["days"].as_array().unwrap().len(), 1);

    let uri = format!("/api/v1/exercise/{}/history?page=abc&limit=", ex["id"].as_str().unwrap());
    let (status, history) = call(&app, Method::GET, &uri, token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history["setsCount"], 3);

    let uri = format!(
        "/api/v1/exercise/{}/history?page=9223372036854775807&limit=10",
        ex["id"].as_str().unwrap()
    );
    let (status, history) = call(&app, Method::GET, &uri, token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history["setsCount"], 0);

    let (_, listing) = call(&app, Method::GET, "/api/v1/exercise/body-parts", token, None).await;
    assert_eq!(listing[0]["exercises"][0]["name"], "Squat");
}

#[tokio::test]
async fn unknown_exercise_cannot_take_sets() {
    let app = app();
    let token = register(&app, "Dev", "dev@mail.com").await;
    let (status, body) = call(
        &app,
        Method::POST,
        "/api/v1/exercise/set",
        Some(&token),
        Some(json!({"exerciseId": "6f1c1a6e-3f0e-4a43-9a5e-1d2f4b7a9c10", "weightKg": 10.0, "reps": 5})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, body) = call(&app, Method::POST, "/api/v1/exercise/set", Some(&token), Some(json!({"reps": 5}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn malformed_requests_are_validation_errors() {
    let app = app();
    let token = register(&app, "Isha", "isha@mail.com").await;
    let token = Some(token.as_str());

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/v1/exercise/set",
        token,
        Some(json!({"exerciseId": "6f1c1a6e-3f0e-4a43-9a5e-1d2f4b7a9c10", "weightKg": "heavy", "reps": 5})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, body) = call(&app, Method::GET, "/api/v1/exercise/not-a-uuid/history", token, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, body) = call(&app, Method::GET, "/api/v1/nutrition?page=x&limit=-4", token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn outsiders_are_forbidden_before_their_input_is_checked() {
    let app = app();
    let owner = register(&app, "Owner", "owner@mail.com").await;
    let outsider = register(&app, "Stranger", "stranger@mail.com").await;
    let (status, group) = call(
        &app,
        Method::POST,
        "/api/v1/groups",
        Some(&owner),
        Some(json!({"name": "Crew"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let group_id = group["id"].as_str().unwrap();

    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/api/v1/groups/{group_id}/set"),
        Some(&outsider),
        Some(json!({"reps": 5})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "SCOPE_FORBIDDEN");

    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/api/v1/groups/{group_id}/invite"),
        Some(&outsider),
        Some(json!({"email": "not-an-email"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "SCOPE_FORBIDDEN");
}

#[tokio::test]
async fn group_flow_with_invites_and_overview() {
    let app = app();
    let owner = register(&app, "Owner", "owner@mail.com").await;
    let owner = Some(owner.as_str());

    let (status, group) = call(&app, Method::POST, "/api/v1/groups", owner, Some(json!({"name": "Dawn Crew"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    let gid = group["id"].as_str().unwrap().to_string();

    let (status, invite) = call(
        &app,
        Method::POST,
        &format!("/api/v1/groups/{gid}/invite"),
        owner,
        Some(json!({"emails": ["Later@mail.com"]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(invite["results"][0]["status"], "invited-pending");

    // registering with the invited email joins the group
    let member = register(&app, "Later", "later@mail.com").await;
    let member = Some(member.as_str());
    let (_, groups) = call(&app, Method::GET, "/api/v1/groups", member, None).await;
    assert_eq!(groups[0]["totalMembers"], 2);

    let outsider = register(&app, "Out", "out@mail.com").await;
    let outsider = Some(outsider.as_str());

    let (_, bp) = call(
        &app,
        Method::POST,
        &format!("/api/v1/groups/{gid}/body-part"),
        owner,
        Some(json!({"name": "Back", "days": "Wednesday"})),
    )
    .await;
    let (status, ex) = call(
        &app,
        Method::POST,
        &format!("/api/v1/groups/{gid}/exercise"),
        member,
        Some(json!({"bodyPartId": bp["id"], "name": "Deadlift"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let ex_id = ex["id"].as_str().unwrap().to_string();

    let set = json!({"exerciseId": ex_id, "weightKg": 100.0, "reps": 3});
    let (status, _) = call(&app, Method::POST, &format!("/api/v1/groups/{gid}/set"), member, Some(set.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = call(&app, Method::POST, &format!("/api/v1/groups/{gid}/set"), outsider, Some(set)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "SCOPE_FORBIDDEN");

    let overview_uri = format!("/api/v1/groups/{gid}/exercise/{ex_id}/overview");
    let (status, overview) = call(&app, Method::GET, &overview_uri, owner, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(overview["exercise"]["bodyPartName"], "Back");
    assert_eq!(overview["participants"][0]["user"]["name"], "Later");
    assert_eq!(overview["participants"][0]["totalSets"], 1);
    assert_eq!(overview["lastSets"].as_array().unwrap().len(), 1);

    let (status, _) = call(&app, Method::GET, &overview_uri, outsider, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(&app, Method::DELETE, &format!("/api/v1/groups/{gid}/exercise/{ex_id}"), member, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = call(&app, Method::DELETE, &format!("/api/v1/groups/{gid}/exercise/{ex_id}"), owner, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call(&app, Method::GET, &overview_uri, owner, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn weight_and_nutrition_feed_the_profile() {
    let app = app();
    let token = register(&app, "Asha", "asha@mail.com").await;
    let token = Some(token.as_str());

    let (status, recorded) = call(&app, Method::POST, "/api/v1/auth/weight", token, Some(json!({"weightKg": 75.0}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(recorded["bmi"], 24.5);
    let (status, _) = call(&app, Method::POST, "/api/v1/auth/weight", token, Some(json!({"weightKg": -1.0}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, log) = call(&app, Method::GET, "/api/v1/auth/weight-log", token, None).await;
    assert_eq!(log["logs"].as_array().unwrap().len(), 2);
    assert_eq!(log["trend"]["direction"], "up");
    assert_eq!(log["trend"]["value"], 3.0);

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/v1/nutrition",
        token,
        Some(json!({"foodName": "Idli", "calories": 300, "quantity": 3, "time": "08:00", "mealType": "breakfast"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = call(
        &app,
        Method::POST,
        "/api/v1/nutrition",
        token,
        Some(json!({"foodName": "Idli", "calories": 300, "quantity": 3, "time": "08:00", "mealType": "brunch"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, daily) = call(&app, Method::GET, "/api/v1/nutrition/summary/daily", token, None).await;
    assert_eq!(daily.as_array().unwrap().len(), 1);
    assert_eq!(daily[0]["totalCalories"], 300.0);

    let (status, profile) = call(&app, Method::GET, "/api/v1/auth/profile", token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["averageDailyCalories"], 300.0);
    assert_eq!(profile["weightKg"], 75.0);
    assert_eq!(profile["weightChart"].as_array().unwrap().len(), 2);
}
