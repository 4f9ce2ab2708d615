//! End-to-end favorites flows against a running server.
//!
//! Run with `cargo test -p favorites-integration-tests -- --ignored`.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use favorites_integration_tests::TestContext;
use reqwest::StatusCode;
use serde_json::{Value, json};

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn test_login_returns_access_token() {
    let ctx = TestContext::new().await;
    let user = ctx.signup().await;

    let response = ctx
        .client
        .post(ctx.url("/sessions"))
        .json(&json!({ "email": user.email, "password": "123456" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    assert!(body["access_token"].is_string());
    assert_eq!(body["user"]["id"], user.id.as_str());

    let response = ctx
        .client
        .post(ctx.url("/sessions"))
        .json(&json!({ "email": user.email, "password": "wrong-password" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    ctx.cleanup(&user).await;
}

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn test_create_list_and_add_product() {
    let ctx = TestContext::new().await;
    let user = ctx.signup().await;
    let product_id = ctx.seed_product("E2E product").await;

    let response = ctx
        .post(
            &user,
            &format!("/favorite/user/{}", user.id),
            &json!({ "title": "My Favorites", "description": "Favorites list description" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let list: Value = response.json().await.unwrap();
    assert!(list["id"].is_string());
    assert_eq!(list["title"], "My Favorites");
    assert_eq!(list["description"], "Favorites list description");

    let response = ctx
        .post(
            &user,
            &format!("/favorite/{}/product/{product_id}", user.id),
            &json!({}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let entry: Value = response.json().await.unwrap();
    assert_eq!(entry["productId"], product_id.as_str());

    let response = ctx.get(&user, &format!("/favorite/user/{}", user.id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    let entries = body["favoriteProducts"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["product"]["id"], product_id.as_str());

    ctx.cleanup(&user).await;
}

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn test_list_invariants() {
    let ctx = TestContext::new().await;
    let user = ctx.signup().await;
    let list_path = format!("/favorites/user/{}", user.id);

    let response = ctx.post(&user, &list_path, &json!({ "title": "First" })).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = ctx.post(&user, &list_path, &json!({ "title": "Second" })).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let mut products = Vec::new();
    for i in 0..6 {
        products.push(ctx.seed_product(&format!("E2E cap product {i}")).await);
    }

    for product_id in products.iter().take(5) {
        let response = ctx
            .post(
                &user,
                &format!("/favorites/{}/product/{product_id}", user.id),
                &json!({}),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = ctx
        .post(
            &user,
            &format!("/favorites/{}/product/{}", user.id, products[0]),
            &json!({}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = ctx
        .post(
            &user,
            &format!("/favorites/{}/product/{}", user.id, products[5]),
            &json!({}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = ctx
        .delete(
            &user,
            &format!("/favorites/{}/product/{}", user.id, products[0]),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = ctx
        .post(
            &user,
            &format!("/favorites/{}/product/{}", user.id, products[5]),
            &json!({}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = ctx.delete(&user, &format!("/favorites/{}", user.id)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = ctx.get(&user, &list_path).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    ctx.cleanup(&user).await;
}

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn test_unknown_user_is_not_found() {
    let ctx = TestContext::new().await;
    let user = ctx.signup().await;

    let response = ctx.get(&user, "/favorite/user/worng-user-id").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["statusCode"], 404);

    ctx.cleanup(&user).await;
}

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn test_products_are_annotated_for_user() {
    let ctx = TestContext::new().await;
    let user = ctx.signup().await;
    let product_id = ctx.seed_product("E2E annotated product").await;

    ctx.post(
        &user,
        &format!("/favorites/user/{}", user.id),
        &json!({ "title": "Annotated" }),
    )
    .await;
    ctx.post(
        &user,
        &format!("/favorites/{}/product/{product_id}", user.id),
        &json!({}),
    )
    .await;

    let response = ctx.get(&user, &format!("/products/{product_id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let product: Value = response.json().await.unwrap();
    assert_eq!(product["isFavorite"], true);

    let response = ctx
        .get(&user, &format!("/products/user/{}?limit=101", user.id))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    ctx.cleanup(&user).await;
}
