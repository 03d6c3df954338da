use crate::helpers::{spawn_app, subscriber_json};
use serde_json::Value;
use uuid::Uuid;

#[tokio::test]
async fn deleting_a_subscriber_keeps_its_location() {
    // Arrange
    let app = spawn_app().await;
    let body = subscriber_json("Ursula", "ursula_le_guin@gmail.com", "Reno", "NV");
    let created: Value = app.post_subscribers(&body).await.json().await.unwrap();
    let id = created["id"].as_str().unwrap();

    // Act
    let response = app.delete_subscriber(id).await;

    // Assert
    assert_eq!(204, response.status().as_u16());
    assert_eq!(app.subscriber_count().await, 0);
    assert_eq!(app.location_count().await, 1);
}

#[tokio::test]
async fn a_kept_location_is_reused_by_later_subscribers() {
    // Arrange
    let app = spawn_app().await;
    let body = subscriber_json("Ursula", "ursula_le_guin@gmail.com", "Reno", "NV");
    let created: Value = app.post_subscribers(&body).await.json().await.unwrap();
    app.delete_subscriber(created["id"].as_str().unwrap())
        .await
        .error_for_status()
        .unwrap();

    // Act
    let body = subscriber_json("Octavia", "octavia@example.com", "Reno", "NV");
    app.post_subscribers(&body).await.error_for_status().unwrap();

    // Assert
    assert_eq!(app.location_count().await, 1);
}

#[tokio::test]
async fn deleting_an_unknown_subscriber_returns_a_404() {
    let app = spawn_app().await;

    let response = app.delete_subscriber(&Uuid::new_v4().to_string()).await;

    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn deleting_twice_returns_a_404_the_second_time() {
    // Arrange
    let app = spawn_app().await;
    let body = subscriber_json("Ursula", "ursula_le_guin@gmail.com", "Reno", "NV");
    let created: Value = app.post_subscribers(&body).await.json().await.unwrap();
    let id = created["id"].as_str().unwrap();

    // Act
    let first = app.delete_subscriber(id).await;
    let second = app.delete_subscriber(id).await;

    // Assert
    assert_eq!(204, first.status().as_u16());
    assert_eq!(404, second.status().as_u16());
}
