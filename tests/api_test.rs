mod common;

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use clubhouse::{api::create_app, config::Settings, domain::TargetAudience};
use common::{directory, services, Directory, DEMO_PASSWORD};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn app(dir: &Directory) -> anyhow::Result<(Router, Arc<clubhouse::service::ServiceContext>)> {
    let ctx = services(dir).await?;
    Ok((create_app(ctx.clone(), Arc::new(Settings::default())), ctx))
}

async fn login(app: &Router, email: &str) -> anyhow::Result<String> {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({ "email": email, "password": DEMO_PASSWORD }).to_string(),
                ))?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    Ok(set_cookie.split(';').next().unwrap_or_default().to_string())
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    cookie: &str,
    body: Option<Value>,
) -> anyhow::Result<(StatusCode, Value)> {
    let mut request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::COOKIE, cookie);
    let body = match body {
        Some(json) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(request.body(body)?).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, value))
}

#[tokio::test]
async fn test_api_requires_session() -> anyhow::Result<()> {
    let dir = directory();
    let (app, _) = app(&dir).await?;

    let (status, _) = send(&app, Method::GET, "/api/clubs", "", None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({ "email": dir.member.email, "password": "wrong" }).to_string(),
                ))?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_login_and_browse() -> anyhow::Result<()> {
    let dir = directory();
    let (app, _) = app(&dir).await?;
    let cookie = login(&app, &dir.member.email).await?;

    let (status, me) = send(&app, Method::GET, "/auth/me", &cookie, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["role"], "ppmk_member");

    let (status, clubs) = send(&app, Method::GET, "/api/clubs", &cookie, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(clubs.as_array().map(Vec::len), Some(2));

    // Logging out ends the session
    let (status, _) = send(&app, Method::POST, "/auth/logout", &cookie, None).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::GET, "/api/clubs", &cookie, None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_announcement_flow_over_http() -> anyhow::Result<()> {
    let dir = directory();
    let (app, ctx) = app(&dir).await?;
    let biro = login(&app, &dir.biro.email).await?;
    let member = login(&app, &dir.member.email).await?;

    let request = json!({
        "title": "Open day",
        "content": "Saturday in the main hall",
        "target": { "type": "all" },
        "important": true
    });
    let (status, created) =
        send(&app, Method::POST, "/api/announcements", &biro, Some(request)).await?;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap_or_default().to_string();

    // Members cannot announce
    let request = json!({ "title": "Hi", "content": "Hello", "target": { "type": "all" } });
    let (status, _) =
        send(&app, Method::POST, "/api/announcements", &member, Some(request)).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, count) =
        send(&app, Method::GET, "/api/announcements/unread-count", &member, None).await?;
    assert_eq!(count["count"], 1);

    let uri = format!("/api/announcements/{}/read", id);
    let (status, _) = send(&app, Method::POST, &uri, &member, None).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, listed) = send(&app, Method::GET, "/api/announcements", &member, None).await?;
    assert_eq!(listed[0]["read"], true);
    assert_eq!(listed[0]["title"], "Open day");

    let (_, count) =
        send(&app, Method::GET, "/api/announcements/unread-count", &member, None).await?;
    assert_eq!(count["count"], 0);

    let stored = ctx.store.announcements().snapshot().await;
    assert_eq!(stored.first().map(|a| a.target.clone()), Some(TargetAudience::All));

    Ok(())
}

#[tokio::test]
async fn test_club_announcement_without_clubs_is_a_json_validation_error() -> anyhow::Result<()> {
    let dir = directory();
    let (app, ctx) = app(&dir).await?;
    let hicom = login(&app, &dir.club_hicom.email).await?;

    let request = json!({
        "title": "Club night",
        "content": "Which club?",
        "target": { "type": "club_members" }
    });
    let (status, body) =
        send(&app, Method::POST, "/api/announcements", &hicom, Some(request)).await?;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].is_string());
    assert!(ctx.store.announcements().snapshot().await.is_empty());
    Ok(())
}
