mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

async fn create_contact(
    server: &common::TestServer,
    client: &reqwest::Client,
    token: &str,
    first: &str,
    last: &str,
) -> Result<Value> {
    let resp = client
        .post(format!("{}/api/contacts", server.base_url))
        .bearer_auth(token)
        .json(&json!({ "firstName": first, "lastName": last }))
        .send()
        .await?;
    let status = resp.status();
    let body: Value = resp.json().await?;
    anyhow::ensure!(
        status == StatusCode::CREATED,
        "create contact failed ({}): {}",
        status,
        body
    );
    Ok(body)
}

#[tokio::test]
async fn crud_pagination_and_search() -> Result<()> {
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
        &format!("Pager Org {}", suffix),
        &format!("pager-{}@pager.test", suffix),
        "password123",
    )
    .await?;
    let token = common::token_of(&body)?;

    // Fresh tenant starts empty
    let resp = client
        .get(format!("{}/api/contacts", server.base_url))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let list: Value = resp.json().await?;
    assert_eq!(list["pagination"]["total"], json!(0));
    assert_eq!(list["contacts"].as_array().map(Vec::len), Some(0));

    // Seed 5 contacts sharing a searchable surname
    let surname = format!("Paginated{}", suffix);
    for i in 0..5 {
        create_contact(&server, &client, &token, &format!("Person{}", i), &surname).await?;
    }

    // limit=2 over 5 rows: last page carries the remainder
    let resp = client
        .get(format!(
            "{}/api/contacts?page=3&limit=2",
            server.base_url
        ))
        .bearer_auth(&token)
        .send()
        .await?;
    let list: Value = resp.json().await?;
    assert_eq!(list["pagination"]["total"], json!(5));
    assert_eq!(list["pagination"]["pages"], json!(3));
    assert_eq!(list["pagination"]["page"], json!(3));
    assert_eq!(list["contacts"].as_array().map(Vec::len), Some(1));

    // Search is case-insensitive substring match
    let resp = client
        .get(format!(
            "{}/api/contacts?search={}",
            server.base_url,
            surname.to_uppercase()
        ))
        .bearer_auth(&token)
        .send()
        .await?;
    let list: Value = resp.json().await?;
    assert_eq!(list["pagination"]["total"], json!(5));

    // Wildcard characters in search are treated literally, not as patterns
    let resp = client
        .get(format!("{}/api/contacts?search=%25", server.base_url))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let list: Value = resp.json().await?;
    assert_eq!(list["pagination"]["total"], json!(0));

    // Update merges partial input
    let created = create_contact(&server, &client, &token, "Updatable", &surname).await?;
    let id = created["id"].as_str().unwrap().to_string();
    let resp = client
        .put(format!("{}/api/contacts/{}", server.base_url, id))
        .bearer_auth(&token)
        .json(&json!({ "status": "customer", "phone": "+1-555-0100" }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = resp.json().await?;
    assert_eq!(updated["status"], json!("customer"));
    assert_eq!(updated["firstName"], json!("Updatable"));
    assert_eq!(updated["phone"], json!("+1-555-0100"));

    // Unknown status is rejected before any write
    let resp = client
        .put(format!("{}/api/contacts/{}", server.base_url, id))
        .bearer_auth(&token)
        .json(&json!({ "status": "bogus" }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Delete, then the row is gone
    let resp = client
        .delete(format!("{}/api/contacts/{}", server.base_url, id))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = client
        .get(format!("{}/api/contacts/{}", server.base_url, id))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn tenants_cannot_see_each_other() -> Result<()> {
    if !common::db_available() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let suffix = common::unique_suffix();

    let a = common::register_tenant(
        &server,
        &client,
        &format!("Tenant A {}", suffix),
        &format!("a-{}@isolation.test", suffix),
        "password123",
    )
    .await?;
    let b = common::register_tenant(
        &server,
        &client,
        &format!("Tenant B {}", suffix),
        &format!("b-{}@isolation.test", suffix),
        "password123",
    )
    .await?;
    let token_a = common::token_of(&a)?;
    let token_b = common::token_of(&b)?;

    let created = create_contact(&server, &client, &token_a, "Secret", "Customer").await?;
    let id = created["id"].as_str().unwrap().to_string();

    // B's listing never includes A's row
    let resp = client
        .get(format!("{}/api/contacts", server.base_url))
        .bearer_auth(&token_b)
        .send()
        .await?;
    let list: Value = resp.json().await?;
    assert_eq!(list["pagination"]["total"], json!(0));

    // Direct reads, updates, and deletes by id all come back 404 for B
    let resp = client
        .get(format!("{}/api/contacts/{}", server.base_url, id))
        .bearer_auth(&token_b)
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = client
        .put(format!("{}/api/contacts/{}", server.base_url, id))
        .bearer_auth(&token_b)
        .json(&json!({ "firstName": "Hijacked" }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = client
        .delete(format!("{}/api/contacts/{}", server.base_url, id))
        .bearer_auth(&token_b)
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // A still owns the untouched row
    let resp = client
        .get(format!("{}/api/contacts/{}", server.base_url, id))
        .bearer_auth(&token_a)
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let contact: Value = resp.json().await?;
    assert_eq!(contact["firstName"], json!("Secret"));

    Ok(())
}
