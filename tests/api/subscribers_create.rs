use crate::helpers::{spawn_app, subscriber_json};
use serde_json::{json, Value};
use uuid::Uuid;

#[tokio::test]
async fn creating_a_single_subscriber_returns_a_201_with_the_record() {
    // Arrange
    let app = spawn_app().await;
    let body = subscriber_json("Ursula", "ursula_le_guin@gmail.com", "Reno", "NV");

    // Act
    let response = app.post_subscribers(&body).await;

    // Assert
    assert_eq!(201, response.status().as_u16());
    let created: Value = response.json().await.unwrap();
    assert!(created["id"].as_str().and_then(|id| Uuid::parse_str(id).ok()).is_some());
    assert!(created["created"].is_string());
    assert_eq!(created["first_name"], "Ursula");
    assert_eq!(created["last_name"], "Le Guin");
    assert_eq!(created["email"], "ursula_le_guin@gmail.com");
    assert_eq!(created["gender"], "F");
    assert_eq!(created["location"], json!({"city": "Reno", "state": "NV"}));
}

#[tokio::test]
async fn a_created_subscriber_is_persisted_as_given() {
    // Arrange
    let app = spawn_app().await;
    let body = subscriber_json("Ursula", "ursula_le_guin@gmail.com", "Reno", "NV");

    // Act
    let created: Value = app.post_subscribers(&body).await.json().await.unwrap();

    // Assert
    let id = Uuid::parse_str(created["id"].as_str().unwrap()).unwrap();
    let saved = sqlx::query_as::<_, (String, String, String, String, String, String)>(
        r#"
        SELECT s.first_name, s.last_name, s.email, s.gender, l.city, l.state
        FROM subscribers s JOIN locations l ON l.id = s.location_id
        WHERE s.id = $1
        "#,
    )
    .bind(id)
    .fetch_one(&app.db_pool)
    .await
    .expect("Failed to fetch saved subscriber.");

    assert_eq!(
        saved,
        (
            "Ursula".to_string(),
            "Le Guin".to_string(),
            "ursula_le_guin@gmail.com".to_string(),
            "F".to_string(),
            "Reno".to_string(),
            "NV".to_string()
        )
    );
}

#[tokio::test]
async fn a_batch_sharing_a_city_and_state_creates_one_location() {
    // Arrange
    let app = spawn_app().await;
    let body = json!([
        {"first_name": "A", "last_name": "B", "email": "a@b.com", "gender": "F",
         "location": {"city": "Reno", "state": "NV"}},
        {"first_name": "C", "last_name": "D", "email": "c@d.com", "gender": "M",
         "location": {"city": "Reno", "state": "NV"}}
    ]);

    // Act
    let response = app.post_subscribers(&body).await;

    // Assert
    assert_eq!(201, response.status().as_u16());
    let created: Vec<Value> = response.json().await.unwrap();
    assert_eq!(created.len(), 2);
    assert_eq!(created[0]["first_name"], "A");
    assert_eq!(created[1]["first_name"], "C");

    assert_eq!(app.subscriber_count().await, 2);
    assert_eq!(app.location_count().await, 1);
    let distinct_locations = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(DISTINCT location_id) FROM subscribers",
    )
    .fetch_one(&app.db_pool)
    .await
    .unwrap();
    assert_eq!(distinct_locations, 1);
}

#[tokio::test]
async fn locations_are_reused_across_requests() {
    // Arrange
    let app = spawn_app().await;

    // Act
    for email in ["one@example.com", "two@example.com"] {
        let body = subscriber_json("Ursula", email, "Reno", "NV");
        assert_eq!(201, app.post_subscribers(&body).await.status().as_u16());
    }
    let batch = json!([
        subscriber_json("Octavia", "three@example.com", "Reno", "NV"),
        subscriber_json("Octavia", "four@example.com", "Austin", "TX")
    ]);
    assert_eq!(201, app.post_subscribers(&batch).await.status().as_u16());

    // Assert
    assert_eq!(app.subscriber_count().await, 4);
    assert_eq!(app.location_count().await, 2);
}

#[tokio::test]
async fn an_empty_batch_creates_nothing() {
    let app = spawn_app().await;

    let response = app.post_subscribers(&json!([])).await;

    assert_eq!(201, response.status().as_u16());
    let created: Vec<Value> = response.json().await.unwrap();
    assert!(created.is_empty());
}

#[tokio::test]
async fn a_payload_that_is_neither_an_object_nor_an_array_is_rejected() {
    // Arrange
    let app = spawn_app().await;
    let test_cases = vec![
        (json!("not an object or array"), "a string"),
        (json!(42), "a number"),
        (json!(null), "null"),
    ];

    for (body, description) in test_cases {
        // Act
        let response = app.post_subscribers(&body).await;

        // Assert
        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 Bad Request when the payload was {}.",
            description
        );
        let message: String = response.json().await.unwrap();
        assert_eq!(message, "Invalid data received");
    }
}

#[tokio::test]
async fn a_first_name_longer_than_64_characters_is_rejected_without_a_write() {
    // Arrange
    let app = spawn_app().await;
    let body = subscriber_json(&"a".repeat(65), "ursula_le_guin@gmail.com", "Reno", "NV");

    // Act
    let response = app.post_subscribers(&body).await;

    // Assert
    assert_eq!(400, response.status().as_u16());
    let errors: Value = response.json().await.unwrap();
    assert_eq!(
        errors,
        json!({"first_name": ["Ensure this field has no more than 64 characters."]})
    );
    assert_eq!(app.subscriber_count().await, 0);
    assert_eq!(app.location_count().await, 0);
}

#[tokio::test]
async fn invalid_records_return_a_400_keyed_by_field() {
    // Arrange
    let app = spawn_app().await;
    let valid = subscriber_json("Ursula", "ursula_le_guin@gmail.com", "Reno", "NV");
    let test_cases = vec![
        ("first_name", json!(""), "an empty first name"),
        ("last_name", Value::Null, "a null last name"),
        ("email", json!("   "), "a blank email"),
        ("gender", json!("a".repeat(9)), "a gender longer than 8 characters"),
        ("location", json!({"city": "Reno"}), "a city without a state"),
        ("location", json!(["Reno", "NV"]), "a location that is not an object"),
    ];

    for (field, value, description) in test_cases {
        let mut body = valid.clone();
        body[field] = value;

        // Act
        let response = app.post_subscribers(&body).await;

        // Assert
        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 Bad Request when the payload had {}.",
            description
        );
        let errors: Value = response.json().await.unwrap();
        assert!(
            errors.get(field).is_some(),
            "The errors for {} did not mention `{}`: {}",
            description,
            field,
            errors
        );
    }
    assert_eq!(app.subscriber_count().await, 0);
}

#[tokio::test]
async fn an_email_is_stored_as_free_text() {
    // Arrange
    let app = spawn_app().await;
    let body = subscriber_json("Ursula", "not-an-address", "Reno", "NV");

    // Act
    let response = app.post_subscribers(&body).await;

    // Assert
    assert_eq!(201, response.status().as_u16());
    let created: Value = response.json().await.unwrap();
    assert_eq!(created["email"], "not-an-address");
    assert_eq!(app.subscriber_count().await, 1);
}

#[tokio::test]
async fn a_record_without_city_and_state_is_rejected_without_a_write() {
    // Arrange
    let app = spawn_app().await;
    let mut body = subscriber_json("Ursula", "ursula_le_guin@gmail.com", "Reno", "NV");
    body["location"] = json!({});

    // Act
    let response = app.post_subscribers(&body).await;

    // Assert
    assert_eq!(400, response.status().as_u16());
    let errors: Value = response.json().await.unwrap();
    assert_eq!(errors, json!(["No location input found"]));
    assert_eq!(app.subscriber_count().await, 0);
    assert_eq!(app.location_count().await, 0);
}

#[tokio::test]
async fn one_invalid_record_rejects_the_whole_batch() {
    // Arrange
    let app = spawn_app().await;
    let mut invalid = subscriber_json("Octavia", "octavia@example.com", "Austin", "TX");
    invalid.as_object_mut().unwrap().remove("email");
    let body = json!([
        subscriber_json("Ursula", "ursula_le_guin@gmail.com", "Reno", "NV"),
        invalid
    ]);

    // Act
    let response = app.post_subscribers(&body).await;

    // Assert
    assert_eq!(400, response.status().as_u16());
    let errors: Value = response.json().await.unwrap();
    assert_eq!(
        errors,
        json!({"subscribers": [{}, {"email": ["This field is required."]}]})
    );
    assert_eq!(app.subscriber_count().await, 0);
    assert_eq!(app.location_count().await, 0);
}

#[tokio::test]
async fn a_batch_record_without_a_location_aborts_before_the_bulk_insert() {
    // Arrange
    let app = spawn_app().await;
    let mut homeless = subscriber_json("Octavia", "octavia@example.com", "Austin", "TX");
    homeless["location"] = json!({"city": "", "state": ""});
    let body = json!([
        subscriber_json("Ursula", "ursula_le_guin@gmail.com", "Reno", "NV"),
        homeless
    ]);

    // Act
    let response = app.post_subscribers(&body).await;

    // Assert
    assert_eq!(400, response.status().as_u16());
    assert_eq!(app.subscriber_count().await, 0);
}

#[tokio::test]
async fn malformed_json_is_rejected() {
    let app = spawn_app().await;

    let response = reqwest::Client::new()
        .post(format!("{}/subscribers", &app.address))
        .header("Content-Type", "application/json")
        .body("{\"first_name\": ")
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(400, response.status().as_u16());
}
