use lilo_client::http_client::ReqwestLiloClient;
use lilo_client::{LiloClient, LiloError, Mood, NewMoodEntry};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn create_mood_wraps_entry_in_data() {
    let server = MockServer::start().await;
    let expected = serde_json::json!({
        "data": {
            "utilisateur": "7",
            "Mood": "Super_Happy",
            "Emotion": ["Fier", "Optimiste"],
            "Journal": "bonne journée"
        }
    });
    Mock::given(method("POST"))
        .and(path("/api/moods"))
        .and(body_json(&expected))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": {"id": 99}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = ReqwestLiloClient::new(&server.uri(), None);
    let mut entry = NewMoodEntry::new("7");
    entry.mood = Some(Mood::SuperHappy);
    entry.emotions = vec!["Fier".into(), "Optimiste".into()];
    entry.journal = Some("  bonne journée \n".into());
    let created = client.create_mood(&entry).await.expect("created");
    assert_eq!(created["data"]["id"], 99);
}

#[tokio::test]
async fn create_mood_validates_before_sending() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/moods"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = ReqwestLiloClient::new(&server.uri(), None);
    let err = client.create_mood(&NewMoodEntry::new("7")).await.unwrap_err();
    assert!(matches!(err, LiloError::InvalidInput(_)));
}

#[tokio::test]
async fn create_mood_surfaces_validation_errors_from_backend() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/moods"))
        .respond_with(ResponseTemplate::new(400).set_body_string("Invalid relation"))
        .mount(&server)
        .await;

    let client = ReqwestLiloClient::new(&server.uri(), None);
    let mut entry = NewMoodEntry::new("7");
    entry.drink = Some("Eau".into());
    let err = client.create_mood(&entry).await.unwrap_err();
    assert!(matches!(err, LiloError::InvalidInput(ref b) if b == "Invalid relation"));
}
