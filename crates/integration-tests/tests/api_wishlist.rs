//! Wishlist tests: saves, moves, duplicate handling.
//!
//! Requires a running API server with the seeded development catalog.

use hearthside_integration_tests::{TestContext, expect_data};
use serde_json::{Value, json};

#[tokio::test]
#[ignore = "Requires a running API server and PostgreSQL"]
async fn add_check_and_remove() {
    let ctx = TestContext::new();
    let user = ctx.register_user().await;
    let product = ctx.any_product().await;
    let product_id = product["id"].as_i64().expect("product id");

    let resp = ctx
        .post_auth("/api/wishlist/items", &user, &json!({"productId": product_id}))
        .send()
        .await
        .expect("wishlist add failed");
    assert_eq!(resp.status(), 201);

    let resp = ctx
        .get_auth(&format!("/api/wishlist/check/{product_id}"), &user)
        .send()
        .await
        .expect("wishlist check failed");
    let envelope: Value = resp.json().await.expect("check not JSON");
    assert_eq!(expect_data(&envelope)["inWishlist"], true);

    let resp = ctx
        .delete_auth(&format!("/api/wishlist/items/{product_id}"), &user)
        .send()
        .await
        .expect("wishlist remove failed");
    assert_eq!(resp.status(), 200);

    let resp = ctx
        .get_auth(&format!("/api/wishlist/check/{product_id}"), &user)
        .send()
        .await
        .expect("wishlist check failed");
    let envelope: Value = resp.json().await.expect("check not JSON");
    assert_eq!(expect_data(&envelope)["inWishlist"], false);
}

#[tokio::test]
#[ignore = "Requires a running API server and PostgreSQL"]
async fn duplicate_add_conflicts() {
    let ctx = TestContext::new();
    let user = ctx.register_user().await;
    let product = ctx.any_product().await;
    let body = json!({"productId": product["id"]});

    let resp = ctx
        .post_auth("/api/wishlist/items", &user, &body)
        .send()
        .await
        .expect("wishlist add failed");
    assert_eq!(resp.status(), 201);

    let resp = ctx
        .post_auth("/api/wishlist/items", &user, &body)
        .send()
        .await
        .expect("wishlist add failed");
    assert_eq!(resp.status(), 409);
}

#[tokio::test]
#[ignore = "Requires a running API server and PostgreSQL"]
async fn move_between_wishlist_and_cart() {
    let ctx = TestContext::new();
    let user = ctx.register_user().await;
    let product = ctx.any_product().await;
    let product_id = product["id"].as_i64().expect("product id");

    // Wishlist -> cart
    let resp = ctx
        .post_auth("/api/wishlist/items", &user, &json!({"productId": product_id}))
        .send()
        .await
        .expect("wishlist add failed");
    assert_eq!(resp.status(), 201);

    let resp = ctx
        .post_auth(
            &format!("/api/wishlist/items/{product_id}/move-to-cart"),
            &user,
            &json!({"quantity": 2}),
        )
        .send()
        .await
        .expect("move to cart failed");
    assert_eq!(resp.status(), 200);

    let envelope: Value = resp.json().await.expect("cart not JSON");
    let cart = expect_data(&envelope);
    let line = &cart["items"][0];
    assert_eq!(line["productId"], product_id);
    assert_eq!(line["quantity"], 2);
    let line_id = line["id"].as_i64().expect("line id");

    // Wishlist no longer holds it
    let resp = ctx
        .get_auth(&format!("/api/wishlist/check/{product_id}"), &user)
        .send()
        .await
        .expect("wishlist check failed");
    let envelope: Value = resp.json().await.expect("check not JSON");
    assert_eq!(expect_data(&envelope)["inWishlist"], false);

    // Cart -> wishlist
    let resp = ctx
        .post_auth(
            &format!("/api/cart/items/{line_id}/move-to-wishlist"),
            &user,
            &json!({}),
        )
        .send()
        .await
        .expect("move to wishlist failed");
    assert_eq!(resp.status(), 200);

    let envelope: Value = resp.json().await.expect("cart not JSON");
    assert_eq!(expect_data(&envelope)["summary"]["itemCount"], 0);
}
