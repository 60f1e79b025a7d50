mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{data, error_code, TestServer};

fn service_body(name: &str, service_type: &str) -> Value {
    json!({
        "name": name,
        "service_type": service_type,
        "description": "Same-day call-outs",
        "contact_info": "555-0100"
    })
}

#[tokio::test]
async fn both_provider_kinds_publish_services() -> Result<()> {
    let server = TestServer::start().await?;

    for role in ["provider_individual", "provider_organization"] {
        let provider = server.account(role).await?;
        let res = server
            .post("/services", &provider.token, service_body("Pipe fixing", "plumbing"))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::CREATED, "{role}");
        assert_eq!(data(res).await?["provider_id"], provider.id.as_str());
    }
    Ok(())
}

#[tokio::test]
async fn plain_users_and_admins_cannot_publish() -> Result<()> {
    let server = TestServer::start().await?;

    for role in ["user", "admin"] {
        let account = server.account(role).await?;
        let res = server
            .post("/services", &account.token, service_body("Pipe fixing", "plumbing"))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::FORBIDDEN, "{role}");

        let body: Value = res.json().await?;
        assert_eq!(body["message"], "Access denied. Required roles: [provider_individual, provider_organization]");
    }
    Ok(())
}

#[tokio::test]
async fn blank_fields_are_rejected() -> Result<()> {
    let server = TestServer::start().await?;
    let provider = server.account("provider_individual").await?;

    let res = server
        .post("/services", &provider.token, service_body("  ", "plumbing"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert!(body["field_errors"].get("name").is_some());
    Ok(())
}

#[tokio::test]
async fn users_browse_the_catalogue() -> Result<()> {
    let server = TestServer::start().await?;
    let provider = server.account("provider_individual").await?;
    let user = server.account("user").await?;

    let res = server
        .post("/services", &provider.token, service_body("Rewiring", "electrical"))
        .send()
        .await?;
    let id = data(res).await?["id"].as_str().unwrap_or_default().to_string();

    let res = server.get("/services", &user.token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(data(res).await?.as_array().map(Vec::len), Some(1));

    let res = server.get(&format!("/services/{id}"), &user.token).send().await?;
    assert_eq!(data(res).await?["name"], "Rewiring");

    // the catalogue is for users; providers see their own via /my/services
    let res = server.get("/services", &provider.token).send().await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn my_services_is_scoped_to_the_caller() -> Result<()> {
    let server = TestServer::start().await?;
    let a = server.account("provider_individual").await?;
    let b = server.account("provider_organization").await?;

    server.post("/services", &a.token, service_body("A1", "plumbing")).send().await?;
    server.post("/services", &a.token, service_body("A2", "plumbing")).send().await?;
    server.post("/services", &b.token, service_body("B1", "roofing")).send().await?;

    let res = server.get("/services/my/services", &a.token).send().await?;
    let names: Vec<Value> = data(res)
        .await?
        .as_array()
        .cloned()
        .unwrap_or_default()
        .into_iter()
        .map(|s| s["name"].clone())
        .collect();
    assert_eq!(names.len(), 2);
    assert!(names.iter().all(|n| n.as_str().is_some_and(|n| n.starts_with('A'))));
    Ok(())
}

#[tokio::test]
async fn provider_cannot_touch_another_providers_service() -> Result<()> {
    let server = TestServer::start().await?;
    let a = server.account("provider_individual").await?;
    let b = server.account("provider_individual").await?;

    let res = server.post("/services", &b.token, service_body("B1", "roofing")).send().await?;
    let path = format!("/services/{}", data(res).await?["id"].as_str().unwrap_or_default());

    let res = server.put(&path, &a.token, json!({ "name": "Mine now" })).send().await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(error_code(res).await?, "FORBIDDEN");

    let res = server.delete(&path, &a.token).send().await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = server.put(&path, &b.token, json!({ "contact_info": "555-0199" })).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let updated = data(res).await?;
    assert_eq!(updated["contact_info"], "555-0199");
    assert_eq!(updated["name"], "B1");

    let res = server.delete(&path, &b.token).send().await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    Ok(())
}
