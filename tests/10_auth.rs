mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn register_login_verify_flow() -> Result<()> {
    if !common::db_available() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let suffix = common::unique_suffix();
    let email = format!("admin-{}@acme.test", suffix);
    let org_name = format!("Acme Inc {}", suffix);

    // Register: 201 with token, safe user, organization with derived slug
    let body = common::register_tenant(&server, &client, &org_name, &email, "password123").await?;
    let token = common::token_of(&body)?;

    assert_eq!(body["user"]["email"], json!(email));
    assert_eq!(body["user"]["role"], json!("admin"));
    assert!(
        body["user"].get("passwordHash").is_none() && body["user"].get("password").is_none(),
        "auth response must never expose password material: {}",
        body["user"]
    );
    assert_eq!(
        body["organization"]["slug"],
        json!(format!("acme-inc-{}", suffix))
    );
    assert_eq!(body["organization"]["plan"], json!("starter"));

    // Same email again: conflict
    let resp = client
        .post(format!("{}/api/auth/register", server.base_url))
        .json(&json!({
            "firstName": "Test",
            "lastName": "User",
            "email": email,
            "password": "password123",
            "organizationName": format!("Other Org {}", suffix),
        }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // Wrong password: 401 with a generic message
    let resp = client
        .post(format!("{}/api/auth/login", server.base_url))
        .json(&json!({ "email": email, "password": "wrong-password" }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let err: Value = resp.json().await?;
    assert_eq!(err["success"], json!(false));
    assert_eq!(err["message"], json!("Invalid credentials"));

    // Correct password: fresh token
    let resp = client
        .post(format!("{}/api/auth/login", server.base_url))
        .json(&json!({ "email": email, "password": "password123" }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let login: Value = resp.json().await?;
    let login_token = common::token_of(&login)?;
    assert_eq!(login["user"]["id"], body["user"]["id"]);

    // Verify both tokens resolve to the same user
    for t in [&token, &login_token] {
        let resp = client
            .get(format!("{}/api/auth/verify", server.base_url))
            .bearer_auth(t)
            .send()
            .await?;
        assert_eq!(resp.status(), StatusCode::OK);
        let verified: Value = resp.json().await?;
        assert_eq!(verified["user"]["id"], body["user"]["id"]);
        assert_eq!(verified["organization"]["id"], body["organization"]["id"]);
    }

    Ok(())
}

#[tokio::test]
async fn deactivation_revokes_unexpired_tokens() -> Result<()> {
    if !common::db_available() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let suffix = common::unique_suffix();

    let email = format!("revoked-{}@acme.test", suffix);
    let body = common::register_tenant(
        &server,
        &client,
        &format!("Revoked Org {}", suffix),
        &email,
        "password123",
    )
    .await?;
    let token = common::token_of(&body)?;
    let user_id = body["user"]["id"].as_str().unwrap().to_string();

    // Token works while the account is active
    let resp = client
        .get(format!("{}/api/auth/verify", server.base_url))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);

    // No API route deactivates users, so flip the flag in storage directly
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(1)
        .connect(&std::env::var("DATABASE_URL")?)
        .await?;
    sqlx::query("UPDATE users SET is_active = FALSE WHERE id = $1::uuid")
        .bind(&user_id)
        .execute(&pool)
        .await?;

    // The still-unexpired token now fails verification
    let resp = client
        .get(format!("{}/api/auth/verify", server.base_url))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // And a fresh login is refused with the generic credentials message
    let resp = client
        .post(format!("{}/api/auth/login", server.base_url))
        .json(&json!({ "email": email, "password": "password123" }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let err: Value = resp.json().await?;
    assert_eq!(err["message"], json!("Invalid credentials"));

    Ok(())
}

#[tokio::test]
async fn rejects_missing_and_malformed_tokens() -> Result<()> {
    if !common::db_available() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    // No Authorization header
    let resp = client
        .get(format!("{}/api/contacts", server.base_url))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let err: Value = resp.json().await?;
    assert_eq!(err["success"], json!(false));

    // Garbage bearer token
    let resp = client
        .get(format!("{}/api/auth/verify", server.base_url))
        .bearer_auth("not-a-real-token")
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Wrong scheme
    let resp = client
        .get(format!("{}/api/auth/verify", server.base_url))
        .header("Authorization", "Basic dXNlcjpwYXNz")
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn register_validates_input() -> Result<()> {
    if !common::db_available() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let suffix = common::unique_suffix();

    // Short password
    let resp = client
        .post(format!("{}/api/auth/register", server.base_url))
        .json(&json!({
            "firstName": "Test",
            "lastName": "User",
            "email": format!("short-{}@acme.test", suffix),
            "password": "short",
            "organizationName": format!("Short Pw {}", suffix),
        }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Unparseable email
    let resp = client
        .post(format!("{}/api/auth/register", server.base_url))
        .json(&json!({
            "firstName": "Test",
            "lastName": "User",
            "email": "not-an-email",
            "password": "password123",
            "organizationName": format!("Bad Email {}", suffix),
        }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    Ok(())
}
