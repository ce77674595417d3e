mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn health_and_root() -> Result<()> {
    let server = common::start_server().await?;

    let res = server.client.get(server.url("/health")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["store"], "memory");

    let body = server.client.get(server.url("/")).send().await?.json::<Value>().await?;
    assert_eq!(body["resources"], json!(["person"]));

    Ok(())
}

#[tokio::test]
async fn person_lifecycle() -> Result<()> {
    let server = common::start_server().await?;

    let created = server.create_person(json!({"name": "Ada", "email": "ada@example.com"})).await?;
    let id = created["id"].as_str().expect("id should be a string").to_string();
    assert_eq!(created["name"], "Ada");
    assert_eq!(created["age"], 0, "default age applied: {}", created);

    let res = server.client.get(server.url(&format!("/person/{}", id))).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?, created);

    let res = server
        .client
        .put(server.url(&format!("/person/{}", id)))
        .json(&json!({"age": 36}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let updated = res.json::<Value>().await?;
    assert_eq!(updated["age"], 36);
    assert_eq!(updated["email"], "ada@example.com", "update merges: {}", updated);

    let res = server.client.delete(server.url(&format!("/person/{}", id))).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?["id"], id.as_str());

    let res = server.client.get(server.url(&format!("/person/{}", id))).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body = res.json::<Value>().await?;
    assert_eq!(body["error"], true);
    assert_eq!(body["code"], "NOT_FOUND");

    Ok(())
}

#[tokio::test]
async fn list_filter_and_count() -> Result<()> {
    let server = common::start_server().await?;

    server.create_person(json!({"name": "Ada", "age": 36})).await?;
    server.create_person(json!({"name": "Grace", "age": 45})).await?;
    server.create_person(json!({"name": "Alan", "age": 36})).await?;

    let all = server.client.get(server.url("/person")).send().await?.json::<Value>().await?;
    assert_eq!(all.as_array().map(Vec::len), Some(3));

    let res = server.client.get(server.url("/person?age=36")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let matched = res.json::<Value>().await?;
    let mut names: Vec<&str> = matched
        .as_array()
        .expect("list returns an array")
        .iter()
        .filter_map(|p| p["name"].as_str())
        .collect();
    names.sort();
    assert_eq!(names, vec!["Ada", "Alan"]);

    let none = server.client.get(server.url("/person?nickname=x")).send().await?.json::<Value>().await?;
    assert_eq!(none, json!([]));

    let count = server.client.get(server.url("/person/count?age=45")).send().await?.json::<Value>().await?;
    assert_eq!(count, json!({"count": 1}));

    Ok(())
}
