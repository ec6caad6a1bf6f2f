mod common;

use common::spawn_app;
use serde_json::Value;
use uuid::Uuid;

#[tokio::test]
async fn create_chirp_cleans_profanity() {
    let app = spawn_app();
    let user = app.signup("walt@breakingbad.com", "123456").await;

    let response = app
        .create_chirp(&user.token, "I really need a kerfuffle to go to bed sooner, Fornax !")
        .await;

    assert_eq!(201, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["body"], "I really need a **** to go to bed sooner, **** !");
    assert_eq!(body["user_id"], user.id.as_str());
}

#[tokio::test]
async fn create_chirp_validates_body_and_auth() {
    let app = spawn_app();
    let user = app.signup("walt@breakingbad.com", "123456").await;

    let response = app.create_chirp(&user.token, &"a".repeat(141)).await;
    assert_eq!(400, response.status().as_u16());

    let response = app.create_chirp(&user.token, "").await;
    assert_eq!(400, response.status().as_u16());

    let response = app.create_chirp("not-a-token", "hello").await;
    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn list_chirps_sorts_and_filters() {
    let app = spawn_app();
    let walt = app.signup("walt@breakingbad.com", "123456").await;
    let jesse = app.signup("jesse@breakingbad.com", "123456").await;

    app.create_chirp(&walt.token, "first").await;
    app.create_chirp(&jesse.token, "second").await;
    app.create_chirp(&walt.token, "third").await;

    let bodies = |chirps: &Value| -> Vec<String> {
        chirps
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["body"].as_str().unwrap().to_string())
            .collect()
    };

    let all: Value = app
        .client
        .get(app.url("/api/chirps"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(bodies(&all), vec!["first", "second", "third"]);

    let desc: Value = app
        .client
        .get(app.url("/api/chirps?sort=desc"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(bodies(&desc), vec!["third", "second", "first"]);

    let walts: Value = app
        .client
        .get(app.url(&format!("/api/chirps?author_id={}", walt.id)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(bodies(&walts), vec!["first", "third"]);
}

#[tokio::test]
async fn list_chirps_rejects_bad_parameters() {
    let app = spawn_app();

    for query in ["author_id=nope", "sort=sideways"] {
        let response = app
            .client
            .get(app.url(&format!("/api/chirps?{}", query)))
            .send()
            .await
            .unwrap();
        assert_eq!(400, response.status().as_u16(), "Should reject {}", query);
    }
}

#[tokio::test]
async fn get_chirp_by_id() {
    let app = spawn_app();
    let user = app.signup("walt@breakingbad.com", "123456").await;
    let chirp: Value = app.create_chirp(&user.token, "hello").await.json().await.unwrap();

    let response = app
        .client
        .get(app.url(&format!("/api/chirps/{}", chirp["id"].as_str().unwrap())))
        .send()
        .await
        .unwrap();
    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["body"], "hello");

    let response = app
        .client
        .get(app.url(&format!("/api/chirps/{}", Uuid::new_v4())))
        .send()
        .await
        .unwrap();
    assert_eq!(404, response.status().as_u16());

    let response = app.client.get(app.url("/api/chirps/garbage")).send().await.unwrap();
    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn only_the_author_can_delete_a_chirp() {
    let app = spawn_app();
    let walt = app.signup("walt@breakingbad.com", "123456").await;
    let jesse = app.signup("jesse@breakingbad.com", "123456").await;
    let chirp: Value = app.create_chirp(&walt.token, "mine").await.json().await.unwrap();
    let path = format!("/api/chirps/{}", chirp["id"].as_str().unwrap());

    let response = app
        .client
        .delete(app.url(&path))
        .header("Authorization", format!("Bearer {}", jesse.token))
        .send()
        .await
        .unwrap();
    assert_eq!(403, response.status().as_u16());

    let response = app.client.delete(app.url(&path)).send().await.unwrap();
    assert_eq!(401, response.status().as_u16());

    let response = app
        .client
        .delete(app.url(&path))
        .header("Authorization", format!("Bearer {}", walt.token))
        .send()
        .await
        .unwrap();
    assert_eq!(204, response.status().as_u16());

    let response = app.client.get(app.url(&path)).send().await.unwrap();
    assert_eq!(404, response.status().as_u16());
}
