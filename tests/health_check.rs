//! Integration tests for the health check, static files and admin endpoints

mod common;

use common::{spawn_app, spawn_app_on_platform};

#[tokio::test]
async fn health_check_works() {
    let app = spawn_app();

    let response = app
        .client
        .get(app.url("/api/healthz"))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());
    assert_eq!(response.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn static_app_hits_are_counted() {
    let app = spawn_app();

    for _ in 0..2 {
        let response = app
            .client
            .get(app.url("/app/"))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(200, response.status().as_u16());
    }

    // Only /app is counted
    let _ = app.client.get(app.url("/api/healthz")).send().await;
    assert_eq!(app.hits.hits(), 2);

    let response = app
        .client
        .get(app.url("/admin/metrics"))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(200, response.status().as_u16());
    let html = response.text().await.unwrap();
    assert!(html.contains("Chirpy has been visited 2 times!"));
}

#[tokio::test]
async fn reset_clears_users_and_hits_in_dev() {
    let app = spawn_app();
    let user = app.signup("walt@breakingbad.com", "123456").await;
    let _ = app.client.get(app.url("/app/")).send().await;

    let response = app
        .client
        .post(app.url("/admin/reset"))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(200, response.status().as_u16());
    assert_eq!(app.hits.hits(), 0);

    let response = app.post_login(&user.email, &user.password).await;
    assert_eq!(401, response.status().as_u16());

    // Tokens die with their user
    let response = app.post_with_bearer("/api/refresh", &user.refresh_token).await;
    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn reset_is_forbidden_outside_dev() {
    let app = spawn_app_on_platform("prod");
    let user = app.signup("walt@breakingbad.com", "123456").await;

    let response = app
        .client
        .post(app.url("/admin/reset"))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(403, response.status().as_u16());

    let response = app.post_login(&user.email, &user.password).await;
    assert_eq!(200, response.status().as_u16());
}
