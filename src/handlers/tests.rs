use axum::http::{Method, StatusCode};
use serde_json::json;

use crate::app::api_routes;
use crate::auth::Permission;
use crate::config::AppConfig;
use crate::database::models::{CityDraft, CommentDraft, CommentTarget, PlaceDraft, TargetKind};
use crate::error::{NO_PERMISSION, PLEASE_LOG_IN};
use crate::testing::{send_to, TestContext};

async fn seed_city(ctx: &TestContext, name: &str) -> i64 {
    ctx.store()
        .insert_city(CityDraft { name: name.into(), region: None, description: None })
        .await
        .unwrap()
        .id
}

async fn seed_place(ctx: &TestContext, name: &str, city: i64) -> i64 {
    ctx.store()
        .insert_place(PlaceDraft { name: name.into(), city, category: None, description: None })
        .await
        .unwrap()
        .id
}

async fn seed_comment(ctx: &TestContext, kind: TargetKind, id: i64) -> i64 {
    ctx.store()
        .insert_comment(CommentDraft {
            body: "Worth the trip".into(),
            author: "sara".into(),
            target: CommentTarget { kind, id },
        })
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn add_city_then_list_it() {
    let ctx = TestContext::new();
    let token = ctx.token("noura", &[Permission::CityAdd]);

    let (status, body) = ctx
        .send(Method::POST, "/api/v1/citys/add", Some(&token), Some(json!({ "name": "Riyadh" })))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({ "msg": "city created successfuly!" }));

    let cities = ctx.store().list_cities().await.unwrap();
    assert_eq!(cities.len(), 1);
    assert_eq!(cities[0].name, "Riyadh");

    let (status, body) = ctx.send(Method::GET, "/api/v1/citys/all", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["msg"], "list of all citys");
    assert_eq!(body["citys"][0]["name"], "Riyadh");
    assert_eq!(body["citys"][0]["id"], cities[0].id);
}

#[tokio::test]
async fn create_without_permission_persists_nothing() {
    let ctx = TestContext::new();
    let city = seed_city(&ctx, "Abha").await;
    let token = ctx.token("guest", &[]);

    let attempts = [
        ("/api/v1/citys/add", json!({ "name": "Taif" })),
        ("/api/v1/places/add", json!({ "name": "Habala", "city": city })),
        ("/api/v1/comments/add", json!({ "body": "hi", "target": { "kind": "city", "id": city } })),
    ];
    for (uri, body) in attempts {
        let (status, reply) = ctx.send(Method::POST, uri, Some(&token), Some(body)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", uri);
        assert_eq!(reply, json!({ "msg": NO_PERMISSION }));
    }

    assert_eq!(ctx.store().list_cities().await.unwrap().len(), 1);
    assert!(ctx.store().list_places().await.unwrap().is_empty());
    assert!(ctx.store().list_comments().await.unwrap().is_empty());
}

#[tokio::test]
async fn every_mutation_checks_its_own_permission() {
    let ctx = TestContext::new();
    let city = seed_city(&ctx, "Riyadh").await;
    let place = seed_place(&ctx, "Masmak", city).await;
    let comment = seed_comment(&ctx, TargetKind::Place, place).await;

    let routes = [
        (Permission::CityAdd, Method::POST, "/api/v1/citys/add".to_string(), Some(json!({ "name": "Taif" }))),
        (Permission::CityUpdate, Method::PUT, format!("/api/v1/citys/update/{}", city), Some(json!({ "name": "Jeddah" }))),
        (Permission::CityDelete, Method::DELETE, format!("/api/v1/citys/delete/{}", city), None),
        (Permission::PlaceAdd, Method::POST, "/api/v1/places/add".to_string(), Some(json!({ "name": "Diriyah", "city": city }))),
        (Permission::PlaceUpdate, Method::PUT, format!("/api/v1/places/update/{}", place), Some(json!({ "name": "Murabba", "city": city }))),
        (Permission::PlaceDelete, Method::DELETE, format!("/api/v1/places/delete/{}", place), None),
        (Permission::CommentAdd, Method::POST, "/api/v1/comments/add".to_string(), Some(json!({ "body": "hi", "target": { "kind": "city", "id": city } }))),
        (Permission::CommentDelete, Method::DELETE, format!("/api/v1/comments/delete/{}", comment), None),
    ];
    assert_eq!(routes.len(), Permission::ALL.len());

    let cities = ctx.store().list_cities().await.unwrap();
    let places = ctx.store().list_places().await.unwrap();
    let comments = ctx.store().list_comments().await.unwrap();

    let nobody = ctx.token("guest", &[]);
    for (required, method, uri, body) in routes {
        // every other capability is not enough
        let others: Vec<Permission> = Permission::ALL.into_iter().filter(|p| *p != required).collect();
        let almost = ctx.token("almost", &others);

        for token in [&nobody, &almost] {
            let (status, reply) = ctx.send(method.clone(), &uri, Some(token.as_str()), body.clone()).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{} {} without {}", method, uri, required);
            assert_eq!(reply, json!({ "msg": NO_PERMISSION }));
        }
    }

    assert_eq!(ctx.store().list_cities().await.unwrap(), cities);
    assert_eq!(ctx.store().list_places().await.unwrap(), places);
    assert_eq!(ctx.store().list_comments().await.unwrap(), comments);
}

#[tokio::test]
async fn create_with_missing_fields_lists_them() {
    let ctx = TestContext::new();
    let token = ctx.admin_token();

    let (status, body) = ctx.send(Method::POST, "/api/v1/citys/add", Some(&token), Some(json!({}))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["msg"], "couldn't create city");
    assert_eq!(body["errors"]["name"][0], "This field is required.");

    let (status, body) = ctx.send(Method::POST, "/api/v1/places/add", Some(&token), Some(json!({}))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["msg"], "couldn't create place");
    assert!(body["errors"]["name"].is_array());
    assert!(body["errors"]["city"].is_array());

    let (status, body) = ctx.send(Method::POST, "/api/v1/comments/add", Some(&token), Some(json!({}))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["msg"], "couldn't create a comment");
    assert!(body["errors"]["body"].is_array());
    assert!(body["errors"]["target"].is_array());

    assert!(ctx.store().list_cities().await.unwrap().is_empty());
    assert!(ctx.store().list_places().await.unwrap().is_empty());
    assert!(ctx.store().list_comments().await.unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_city_name_is_a_validation_error() {
    let ctx = TestContext::new();
    seed_city(&ctx, "Riyadh").await;

    let (status, body) = ctx
        .send(Method::POST, "/api/v1/citys/add", Some(&ctx.admin_token()), Some(json!({ "name": "Riyadh" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["errors"]["name"][0], "city with this name already exists.");
}

#[tokio::test]
async fn update_city_without_permission_keeps_name() {
    let ctx = TestContext::new();
    let id = seed_city(&ctx, "Riyadh").await;
    let token = ctx.token("noura", &[Permission::CityAdd]);

    let (status, body) = ctx
        .send(Method::PUT, &format!("/api/v1/citys/update/{}", id), Some(&token), Some(json!({ "name": "Jeddah" })))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["msg"], NO_PERMISSION);
    assert_eq!(ctx.store().get_city(id).await.unwrap().unwrap().name, "Riyadh");
}

#[tokio::test]
async fn update_city_replaces_fields() {
    let ctx = TestContext::new();
    let id = seed_city(&ctx, "Riyadh").await;
    let token = ctx.token("noura", &[Permission::CityUpdate]);

    let (status, body) = ctx
        .send(
            Method::PUT,
            &format!("/api/v1/citys/update/{}", id),
            Some(&token),
            Some(json!({ "name": "Jeddah", "region": "Makkah" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "msg": "city updated successfuly!" }));

    let city = ctx.store().get_city(id).await.unwrap().unwrap();
    assert_eq!(city.name, "Jeddah");
    assert_eq!(city.region.as_deref(), Some("Makkah"));
}

#[tokio::test]
async fn update_missing_or_invalid() {
    let ctx = TestContext::new();
    let token = ctx.admin_token();
    let id = seed_city(&ctx, "Riyadh").await;

    let (status, body) = ctx
        .send(Method::PUT, "/api/v1/citys/update/99", Some(&token), Some(json!({ "name": "X" })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "msg": "This city does not exist!" }));

    let (status, body) = ctx
        .send(Method::PUT, "/api/v1/places/update/abc", Some(&token), Some(json!({ "name": "X" })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "msg": "This place does not exist!" }));

    let (status, body) = ctx
        .send(Method::PUT, &format!("/api/v1/citys/update/{}", id), Some(&token), Some(json!({ "name": "" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["msg"], "couldn't update");
    assert_eq!(body["errors"]["name"][0], "This field may not be blank.");
}

#[tokio::test]
async fn delete_city_reports_name_and_is_not_repeatable() {
    let ctx = TestContext::new();
    let id = seed_city(&ctx, "Al-Ula").await;
    let token = ctx.token("noura", &[Permission::CityDelete]);
    let uri = format!("/api/v1/citys/delete/{}", id);

    let (status, body) = ctx.send(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "msg": "Al-Ula city has been deleted!!" }));

    let (status, body) = ctx.send(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "msg": "city is not found!" }));
}

#[tokio::test]
async fn delete_missing_records_leaves_store_alone() {
    let ctx = TestContext::new();
    let token = ctx.admin_token();
    let city = seed_city(&ctx, "Riyadh").await;
    let place = seed_place(&ctx, "Masmak", city).await;
    seed_comment(&ctx, TargetKind::Place, place).await;

    for (uri, msg) in [
        ("/api/v1/citys/delete/42", "city is not found!"),
        ("/api/v1/places/delete/42", "place is not found!"),
        ("/api/v1/comments/delete/42", "The comment is not found!"),
        ("/api/v1/comments/delete/not-a-number", "The comment is not found!"),
    ] {
        let (status, body) = ctx.send(Method::DELETE, uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(body, json!({ "msg": msg }));
    }

    assert_eq!(ctx.store().list_cities().await.unwrap().len(), 1);
    assert_eq!(ctx.store().list_places().await.unwrap().len(), 1);
    assert_eq!(ctx.store().list_comments().await.unwrap().len(), 1);
}

#[tokio::test]
async fn place_lifecycle() {
    let ctx = TestContext::new();
    let token = ctx.admin_token();
    let riyadh = seed_city(&ctx, "Riyadh").await;
    let diriyah = seed_city(&ctx, "Diriyah").await;

    let (status, body) = ctx
        .send(
            Method::POST,
            "/api/v1/places/add",
            Some(&token),
            Some(json!({ "name": "At-Turaif", "city": riyadh, "category": "heritage" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({ "msg": "place added successfuly!" }));

    let (_, body) = ctx.send(Method::GET, "/api/v1/places/all", Some(&token), None).await;
    assert_eq!(body["msg"], "list of all places");
    let id = body["places"][0]["id"].as_i64().unwrap();
    assert_eq!(body["places"][0]["city"], riyadh);

    let (status, body) = ctx
        .send(
            Method::PUT,
            &format!("/api/v1/places/update/{}", id),
            Some(&token),
            Some(json!({ "name": "At-Turaif District", "city": diriyah })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "msg": "place updated successfuly!" }));
    let place = ctx.store().get_place(id).await.unwrap().unwrap();
    assert_eq!(place.city, diriyah);
    assert_eq!(place.category, None);

    let (status, body) = ctx.send(Method::DELETE, &format!("/api/v1/places/delete/{}", id), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "msg": "At-Turaif District has been deleted!!" }));
}

#[tokio::test]
async fn place_with_unknown_city_is_rejected() {
    let ctx = TestContext::new();
    let (status, body) = ctx
        .send(
            Method::POST,
            "/api/v1/places/add",
            Some(&ctx.admin_token()),
            Some(json!({ "name": "Edge of the World", "city": 7 })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["errors"]["city"][0], "Invalid pk \"7\" - object does not exist.");
}

#[tokio::test]
async fn comment_author_comes_from_token() {
    let ctx = TestContext::new();
    let city = seed_city(&ctx, "Abha").await;
    let token = ctx.token("sara", &[Permission::CommentAdd]);

    let (status, body) = ctx
        .send(
            Method::POST,
            "/api/v1/comments/add",
            Some(&token),
            Some(json!({ "body": "Cool weather", "author": "someone-else", "target": { "kind": "city", "id": city } })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({ "msg": "Comment Added Successfully!" }));

    let (status, body) = ctx.send(Method::GET, "/api/v1/comments/all", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["msg"], "list of all comments");
    assert_eq!(body["comments"][0]["author"], "sara");
    assert_eq!(body["comments"][0]["target"], json!({ "kind": "city", "id": city }));
}

#[tokio::test]
async fn delete_comment_twice() {
    let ctx = TestContext::new();
    let city = seed_city(&ctx, "Abha").await;
    let id = seed_comment(&ctx, TargetKind::City, city).await;
    let token = ctx.token("mod", &[Permission::CommentDelete]);
    let uri = format!("/api/v1/comments/delete/{}", id);

    let (status, body) = ctx.send(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "msg": "the comment was deleted" }));

    let (status, body) = ctx.send(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "msg": "The comment is not found!" }));
}

#[tokio::test]
async fn deleting_city_cascades() {
    let ctx = TestContext::new();
    let city = seed_city(&ctx, "Riyadh").await;
    let place = seed_place(&ctx, "Masmak", city).await;
    seed_comment(&ctx, TargetKind::Place, place).await;
    seed_comment(&ctx, TargetKind::City, city).await;

    let (status, _) = ctx
        .send(Method::DELETE, &format!("/api/v1/citys/delete/{}", city), Some(&ctx.admin_token()), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(ctx.store().list_places().await.unwrap().is_empty());
    assert!(ctx.store().list_comments().await.unwrap().is_empty());
}

#[tokio::test]
async fn lists_need_only_a_token() {
    let ctx = TestContext::new();
    let token = ctx.token("guest", &[]);

    for (uri, key) in [
        ("/api/v1/citys/all", "citys"),
        ("/api/v1/places/all", "places"),
        ("/api/v1/comments/all", "comments"),
    ] {
        let (status, body) = ctx.send(Method::GET, uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[key], json!([]));
    }
}

#[tokio::test]
async fn missing_or_bad_token_is_rejected_by_middleware() {
    let ctx = TestContext::new();

    let (status, body) = ctx.send(Method::GET, "/api/v1/citys/all", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "msg": "Missing Authorization header" }));

    let (status, body) = ctx.send(Method::GET, "/api/v1/citys/all", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["msg"].as_str().unwrap().starts_with("Invalid JWT token"));
}

#[tokio::test]
async fn handlers_ask_to_log_in_without_middleware() {
    let ctx = TestContext::new();
    let router = api_routes().with_state(ctx.state.clone());

    let (status, body) = send_to(router.clone(), Method::GET, "/citys/all", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "msg": PLEASE_LOG_IN }));

    let (status, body) = send_to(router, Method::POST, "/citys/add", None, Some(json!({ "name": "Riyadh" }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "msg": PLEASE_LOG_IN }));
    assert!(ctx.store().list_cities().await.unwrap().is_empty());
}

#[tokio::test]
async fn non_object_body_is_a_bad_request() {
    let ctx = TestContext::new();
    let (status, body) = ctx
        .send(Method::POST, "/api/v1/citys/add", Some(&ctx.admin_token()), Some(json!(["Riyadh"])))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["msg"], "invalid request body");
}

#[tokio::test]
async fn oversized_body_is_payload_too_large() {
    let mut config = AppConfig::development();
    config.api.enable_request_logging = false;
    config.api.max_request_size_bytes = 64;
    let ctx = TestContext::with_config(config);

    let description = "x".repeat(500);
    let (status, body) = ctx
        .send(
            Method::POST,
            "/api/v1/citys/add",
            Some(&ctx.admin_token()),
            Some(json!({ "name": "Riyadh", "description": description })),
        )
        .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["msg"], "request body too large");
    assert!(ctx.store().list_cities().await.unwrap().is_empty());
}

#[tokio::test]
async fn long_usernames_are_kept_as_comment_author() {
    let ctx = TestContext::new();
    let city = seed_city(&ctx, "Abha").await;
    let username = "n".repeat(300);
    let token = ctx.token(&username, &[Permission::CommentAdd]);

    let (status, _) = ctx
        .send(
            Method::POST,
            "/api/v1/comments/add",
            Some(&token),
            Some(json!({ "body": "Foggy", "target": { "kind": "city", "id": city } })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(ctx.store().list_comments().await.unwrap()[0].author, username);
}

#[tokio::test]
async fn health_reports_store_status() {
    let ctx = TestContext::new();
    let (status, body) = ctx.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["store"], "ok");
}
