use lilo_client::http_client::ReqwestLiloClient;
use lilo_client::{LiloClient, LiloError, MoodQuery};
use secrecy::SecretString;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn list_moods_returns_data_items() {
    let server = MockServer::start().await;
    let body = serde_json::json!({
        "data": [
            {"id": 1, "Mood": "Happy", "Date": "2025-01-01T10:00:00Z"},
            {"id": 2, "attributes": {"Mood": "Neutre", "Date": "2025-01-02T09:00:00Z"}}
        ],
        "meta": {"pagination": {"total": 2}}
    });
    Mock::given(method("GET"))
        .and(path("/api/moods"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = ReqwestLiloClient::new(&server.uri(), None);
    let items = client.list_moods(&MoodQuery::default()).await.expect("items");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["Mood"], "Happy");
    assert_eq!(items[1]["attributes"]["Mood"], "Neutre");
}

#[tokio::test]
async fn list_moods_filters_by_user_and_sends_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/moods"))
        .and(query_param("filters[utilisateur][$eq]", "42"))
        .and(query_param("pagination[pageSize]", "100"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": []})))
        .mount(&server)
        .await;

    let client = ReqwestLiloClient::new(&server.uri(), Some(SecretString::new("tok".into())));
    let query = MoodQuery {
        user_id: Some("42".into()),
        page_size: Some(100),
    };
    let items = client.list_moods(&query).await.expect("items");
    assert!(items.is_empty());
}

#[tokio::test]
async fn list_moods_rejects_payload_without_data_array() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/moods"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": null})))
        .mount(&server)
        .await;

    let client = ReqwestLiloClient::new(&server.uri(), None);
    let err = client.list_moods(&MoodQuery::default()).await.unwrap_err();
    assert!(matches!(err, LiloError::Decode(_)), "got {err:?}");
}

#[tokio::test]
async fn list_moods_maps_error_statuses() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/moods"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let client = ReqwestLiloClient::new(&server.uri(), None);
    let err = client.list_moods(&MoodQuery::default()).await.unwrap_err();
    match err {
        LiloError::Api { status, ref body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.is_transient());
}

#[tokio::test]
async fn list_moods_forbidden_is_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/moods"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
        .mount(&server)
        .await;

    let client = ReqwestLiloClient::new(&server.uri(), None);
    let err = client.list_moods(&MoodQuery::default()).await.unwrap_err();
    assert!(matches!(err, LiloError::Auth(_)));
}

#[tokio::test]
async fn list_moods_collects_every_page() {
    let server = MockServer::start().await;
    let meta = serde_json::json!({"pagination": {"page": 1, "pageSize": 1, "pageCount": 2, "total": 2}});
    Mock::given(method("GET"))
        .and(path("/api/moods"))
        .and(query_param("pagination[page]", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [{"id": 1, "Mood": "Happy", "Date": "2025-01-01T10:00:00Z"}],
            "meta": meta.clone()
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/moods"))
        .and(query_param("pagination[page]", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [{"id": 2, "Mood": "Neutre", "Date": "2025-01-02T09:00:00Z"}],
            "meta": meta
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ReqwestLiloClient::new(&server.uri(), None);
    let items = client.list_moods(&MoodQuery::default()).await.expect("items");
    let ids: Vec<_> = items.iter().map(|i| i["id"].as_u64()).collect();
    assert_eq!(ids, vec![Some(1), Some(2)]);
}
