mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{data, error_code, TestServer};

fn listing_body(name: &str) -> Value {
    json!({
        "name": name,
        "service_type": "carpentry",
        "description": "Doors, frames and fitted furniture",
        "contact_info": "shop@example.com"
    })
}

#[tokio::test]
async fn provider_listing_lifecycle() -> Result<()> {
    let server = TestServer::start().await?;
    let provider = server.account("provider_organization").await?;
    let user = server.account("user").await?;

    let res = server.post("/providers", &provider.token, listing_body("Oak & Co")).send().await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let listing = data(res).await?;
    assert_eq!(listing["user_id"], provider.id.as_str());
    let path = format!("/providers/{}", listing["id"].as_str().unwrap_or_default());

    let res = server.get("/providers", &user.token).send().await?;
    assert_eq!(data(res).await?.as_array().map(Vec::len), Some(1));

    // any authenticated role may read a single listing
    for token in [&user.token, &provider.token] {
        let res = server.get(&path, token).send().await?;
        assert_eq!(res.status(), StatusCode::OK);
    }

    let res = server.get("/providers/my/providers", &provider.token).send().await?;
    assert_eq!(data(res).await?.as_array().map(Vec::len), Some(1));

    let res = server.put(&path, &provider.token, json!({ "name": "Oak and Sons" })).send().await?;
    assert_eq!(data(res).await?["name"], "Oak and Sons");

    let res = server.delete(&path, &provider.token).send().await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    Ok(())
}

#[tokio::test]
async fn listing_endpoints_enforce_allow_lists() -> Result<()> {
    let server = TestServer::start().await?;
    let provider = server.account("provider_individual").await?;
    let user = server.account("user").await?;

    let res = server.post("/providers", &user.token, listing_body("Fake")).send().await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(error_code(res).await?, "ACCESS_DENIED");

    let res = server.get("/providers", &provider.token).send().await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = server.get("/providers/my/providers", &user.token).send().await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn listings_are_owned_by_their_creator() -> Result<()> {
    let server = TestServer::start().await?;
    let owner = server.account("provider_individual").await?;
    let rival = server.account("provider_organization").await?;

    let res = server.post("/providers", &owner.token, listing_body("Owner's shop")).send().await?;
    let path = format!("/providers/{}", data(res).await?["id"].as_str().unwrap_or_default());

    let res = server.put(&path, &rival.token, json!({ "name": "Rival's shop" })).send().await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Not enough permissions to modify this service provider");

    let res = server.delete(&path, &rival.token).send().await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    Ok(())
}
