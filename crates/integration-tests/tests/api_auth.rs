//! Auth flow tests: register, login, profile, refresh.
//!
//! Requires a running API server and `PostgreSQL`; see the crate docs.

use hearthside_integration_tests::{TestContext, expect_data};
use serde_json::{Value, json};

#[tokio::test]
#[ignore = "Requires a running API server and PostgreSQL"]
async fn register_login_and_profile() {
    let ctx = TestContext::new();
    let user = ctx.register_user().await;

    // Login with the same credentials
    let resp = ctx
        .client
        .post(format!("{}/api/auth/login", ctx.base_url))
        .json(&json!({
            "email": user.email,
            "password": "integration-test-password",
        }))
        .send()
        .await
        .expect("login request failed");
    assert_eq!(resp.status(), 200);

    let envelope: Value = resp.json().await.expect("login response not JSON");
    let data = expect_data(&envelope);
    assert_eq!(data["user"]["email"], user.email);
    assert!(data["token"].as_str().is_some());

    // Profile via the registration token
    let resp = ctx
        .get_auth("/api/auth/profile", &user)
        .send()
        .await
        .expect("profile request failed");
    assert_eq!(resp.status(), 200);
    let envelope: Value = resp.json().await.expect("profile response not JSON");
    assert_eq!(expect_data(&envelope)["firstName"], "Test");
}

#[tokio::test]
#[ignore = "Requires a running API server and PostgreSQL"]
async fn duplicate_email_conflicts() {
    let ctx = TestContext::new();
    let user = ctx.register_user().await;

    let resp = ctx
        .client
        .post(format!("{}/api/auth/register", ctx.base_url))
        .json(&json!({
            "email": user.email,
            "password": "integration-test-password",
            "firstName": "Test",
            "lastName": "User",
        }))
        .send()
        .await
        .expect("register request failed");
    assert_eq!(resp.status(), 409);

    let envelope: Value = resp.json().await.expect("error response not JSON");
    assert_eq!(envelope["success"], false);
}

#[tokio::test]
#[ignore = "Requires a running API server and PostgreSQL"]
async fn wrong_password_is_unauthorized() {
    let ctx = TestContext::new();
    let user = ctx.register_user().await;

    let resp = ctx
        .client
        .post(format!("{}/api/auth/login", ctx.base_url))
        .json(&json!({"email": user.email, "password": "not-the-password"}))
        .send()
        .await
        .expect("login request failed");
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
#[ignore = "Requires a running API server and PostgreSQL"]
async fn refresh_reissues_token() {
    let ctx = TestContext::new();
    let user = ctx.register_user().await;

    let resp = ctx
        .post_auth("/api/auth/refresh", &user, &json!({}))
        .send()
        .await
        .expect("refresh request failed");
    assert_eq!(resp.status(), 200);

    let envelope: Value = resp.json().await.expect("refresh response not JSON");
    assert!(expect_data(&envelope)["token"].as_str().is_some());
}

#[tokio::test]
#[ignore = "Requires a running API server and PostgreSQL"]
async fn protected_route_rejects_missing_token() {
    let ctx = TestContext::new();

    let resp = ctx
        .get("/api/cart")
        .send()
        .await
        .expect("cart request failed");
    assert_eq!(resp.status(), 401);
}
