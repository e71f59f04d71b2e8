mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn stage_filter_returns_one_pipeline_column() -> Result<()> {
    if !common::db_available() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let suffix = common::unique_suffix();

    let body = common::register_tenant(
        &server,
        &client,
        &format!("Pipeline Org {}", suffix),
        &format!("pipeline-{}@deals.test", suffix),
        "password123",
    )
    .await?;
    let token = common::token_of(&body)?;

    for (title, stage) in [
        ("First proposal", "proposal"),
        ("Second proposal", "proposal"),
        ("Early lead", "lead"),
        ("Already won", "closed_won"),
    ] {
        let resp = client
            .post(format!("{}/api/deals", server.base_url))
            .bearer_auth(&token)
            .json(&json!({ "title": title, "value": 100.0, "stage": stage }))
            .send()
            .await?;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    // Only the requested column comes back
    let resp = client
        .get(format!("{}/api/deals?stage=proposal", server.base_url))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let list: Value = resp.json().await?;
    let deals = list["deals"].as_array().unwrap();
    assert_eq!(deals.len(), 2);
    assert!(deals.iter().all(|d| d["stage"] == json!("proposal")));

    // Unknown stage names are rejected up front
    let resp = client
        .get(format!("{}/api/deals?stage=daydream", server.base_url))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Without the filter, the paginated listing still covers everything
    let resp = client
        .get(format!("{}/api/deals", server.base_url))
        .bearer_auth(&token)
        .send()
        .await?;
    let list: Value = resp.json().await?;
    assert_eq!(list["pagination"]["total"], json!(4));

    Ok(())
}
