mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{data, error_code, TestServer};

fn request_body(title: &str) -> Value {
    json!({ "title": title, "description": "Kitchen tap drips all night" })
}

#[tokio::test]
async fn user_posts_and_lists_own_requests() -> Result<()> {
    let server = TestServer::start().await?;
    let alice = server.account("user").await?;
    let bob = server.account("user").await?;

    let res = server.post("/repair-requests", &alice.token, request_body("Leaky tap")).send().await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created = data(res).await?;
    assert_eq!(created["user_id"], alice.id.as_str());
    assert_eq!(created["title"], "Leaky tap");

    server.post("/repair-requests", &bob.token, request_body("Broken door")).send().await?;

    let res = server.get("/repair-requests/my-requests", &alice.token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let mine = data(res).await?;
    assert_eq!(mine.as_array().map(Vec::len), Some(1));
    assert_eq!(mine[0]["title"], "Leaky tap");
    Ok(())
}

#[tokio::test]
async fn request_needs_description_or_voice_file() -> Result<()> {
    let server = TestServer::start().await?;
    let alice = server.account("user").await?;

    let res = server
        .post("/repair-requests", &alice.token, json!({ "title": "Mystery noise" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Either description or voice file must be provided");

    let res = server
        .post(
            "/repair-requests",
            &alice.token,
            json!({ "title": "Mystery noise", "voice_file": "uploads/voice/noise.webm" }),
        )
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    Ok(())
}

#[tokio::test]
async fn providers_cannot_post_requests() -> Result<()> {
    let server = TestServer::start().await?;
    let provider = server.account("provider_individual").await?;

    let res = server.post("/repair-requests", &provider.token, request_body("Nope")).send().await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let body: Value = res.json().await?;
    assert_eq!(body["code"], "ACCESS_DENIED");
    assert_eq!(body["allowed_roles"], json!(["user"]));
    Ok(())
}

#[tokio::test]
async fn only_providers_browse_all_requests() -> Result<()> {
    let server = TestServer::start().await?;
    let alice = server.account("user").await?;
    let provider = server.account("provider_organization").await?;
    let admin = server.account("admin").await?;

    server.post("/repair-requests", &alice.token, request_body("Leaky tap")).send().await?;

    let res = server.get("/repair-requests", &provider.token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(data(res).await?.as_array().map(Vec::len), Some(1));

    for token in [&alice.token, &admin.token] {
        let res = server.get("/repair-requests", token).send().await?;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert_eq!(error_code(res).await?, "ACCESS_DENIED");
    }
    Ok(())
}

#[tokio::test]
async fn listing_respects_skip_and_limit() -> Result<()> {
    let server = TestServer::start().await?;
    let alice = server.account("user").await?;
    let provider = server.account("provider_individual").await?;

    for title in ["first", "second", "third"] {
        server.post("/repair-requests", &alice.token, request_body(title)).send().await?;
    }

    let res = server.get("/repair-requests?skip=1&limit=1", &provider.token).send().await?;
    let page = data(res).await?;
    assert_eq!(page.as_array().map(Vec::len), Some(1));

    let res = server.get("/repair-requests?limit=abc", &provider.token).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn only_the_owner_updates_or_deletes() -> Result<()> {
    let server = TestServer::start().await?;
    let alice = server.account("user").await?;
    let mallory = server.account("user").await?;

    let res = server.post("/repair-requests", &alice.token, request_body("Leaky tap")).send().await?;
    let id = data(res).await?["id"].as_str().unwrap_or_default().to_string();
    let path = format!("/repair-requests/{id}");

    let res = server.put(&path, &mallory.token, json!({ "title": "Hijacked" })).send().await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await?;
    assert_eq!(body["code"], "FORBIDDEN");
    assert_eq!(body["message"], "Not enough permissions to modify this repair request");

    let res = server.delete(&path, &mallory.token).send().await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = server.put(&path, &alice.token, json!({ "title": "Leaky kitchen tap" })).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let updated = data(res).await?;
    assert_eq!(updated["title"], "Leaky kitchen tap");
    assert_eq!(updated["description"], "Kitchen tap drips all night");

    let res = server.delete(&path, &alice.token).send().await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = server.get(&path, &alice.token).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn admin_has_no_ownership_bypass_on_user_endpoints() -> Result<()> {
    let server = TestServer::start().await?;
    let alice = server.account("user").await?;
    let admin = server.account("admin").await?;

    let res = server.post("/repair-requests", &alice.token, request_body("Leaky tap")).send().await?;
    let id = data(res).await?["id"].as_str().unwrap_or_default().to_string();

    let res = server.delete(&format!("/repair-requests/{id}"), &admin.token).send().await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(error_code(res).await?, "FORBIDDEN");
    Ok(())
}

#[tokio::test]
async fn missing_request_is_not_found_before_ownership() -> Result<()> {
    let server = TestServer::start().await?;
    let alice = server.account("user").await?;

    let path = format!("/repair-requests/{}", uuid::Uuid::new_v4());
    let res = server.delete(&path, &alice.token).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Repair request not found");
    Ok(())
}

#[tokio::test]
async fn malformed_id_gets_an_error_body() -> Result<()> {
    let server = TestServer::start().await?;
    let alice = server.account("user").await?;
    let admin = server.account("admin").await?;

    let res = server.get("/repair-requests/not-a-uuid", &alice.token).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(res).await?, "BAD_REQUEST");

    let res = server.delete("/admin/users/42", &admin.token).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(res).await?, "BAD_REQUEST");
    Ok(())
}
