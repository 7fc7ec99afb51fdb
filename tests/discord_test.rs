//! Integration tests for the Discord REST messenger using wiremock

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gardenwatch::notifications::{
    colors, DeliveryError, DiscordConfig, DiscordMessenger, MessageContent, MessageHandle,
    Messenger,
};

fn messenger_for(server: &MockServer) -> DiscordMessenger {
    DiscordMessenger::new(DiscordConfig::new("secret-token").with_api_base(server.uri())).unwrap()
}

#[tokio::test]
async fn test_send_returns_handle() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/channels/555/messages"))
        .and(header("authorization", "Bot secret-token"))
        .and(body_partial_json(json!({
            "embeds": [{"title": "Seeds 🌱", "color": colors::STOCK}]
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": "1234567890123", "channel_id": "555"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let handle = messenger_for(&server)
        .send(555, &MessageContent::new("Seeds 🌱", colors::STOCK))
        .await
        .unwrap();

    assert_eq!(
        handle,
        MessageHandle {
            channel_id: 555,
            message_id: 1234567890123
        }
    );
}

#[tokio::test]
async fn test_get_channel() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/channels/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "1", "name": "stock"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/channels/2"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Unknown Channel"})))
        .mount(&server)
        .await;

    let messenger = messenger_for(&server);
    let info = messenger.get_channel(1).await.unwrap().unwrap();
    assert_eq!(info.id, 1);
    assert_eq!(info.name.as_deref(), Some("stock"));

    assert!(messenger.get_channel(2).await.unwrap().is_none());
}

#[tokio::test]
async fn test_deleted_message_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/channels/9/messages/77"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Unknown Message"})))
        .mount(&server)
        .await;

    let handle = MessageHandle {
        channel_id: 9,
        message_id: 77,
    };
    let err = messenger_for(&server).fetch(&handle).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_edit_patches_message() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/channels/9/messages/77"))
        .and(body_partial_json(json!({
            "embeds": [{"fields": [{"name": "⏱️ Ends In", "value": "Ended", "inline": true}]}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "77"})))
        .expect(1)
        .mount(&server)
        .await;

    let handle = MessageHandle {
        channel_id: 9,
        message_id: 77,
    };
    let content = MessageContent::new("🌦️ Rain", colors::WEATHER).with_field("⏱️ Ends In", "Ended", true);
    messenger_for(&server).edit(&handle, &content).await.unwrap();
}

#[tokio::test]
async fn test_rate_limited_and_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/channels/1/messages"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/channels/2/messages"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Missing Permissions"))
        .expect(1)
        .mount(&server)
        .await;

    let messenger = messenger_for(&server);
    let content = MessageContent::new("x", 0);

    let err = messenger.send(1, &content).await.unwrap_err();
    assert!(matches!(err, DeliveryError::RateLimited(ref body) if body == "slow down"));

    let err = messenger.send(2, &content).await.unwrap_err();
    assert!(matches!(err, DeliveryError::Rejected { status: 403, .. }));
    assert!(!err.is_not_found());
}
