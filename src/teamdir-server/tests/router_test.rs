use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Method, Request, StatusCode, header};
use pretty_assertions::assert_eq;
use teamdir_server::{AppState, ServerConfig, create_router};
use teamdir_slack::{
    DirectoryGroup, DirectoryProvider, DirectoryResult, DirectoryUser, RuntimeConfig,
};
use tower::ServiceExt;

struct StaticDirectory;

/// Directory whose user listing never completes.
struct StalledDirectory;

#[async_trait]
impl DirectoryProvider for StalledDirectory {
    async fn list_users(&self) -> DirectoryResult<Vec<DirectoryUser>> {
        std::future::pending().await
    }

    async fn list_groups(&self) -> DirectoryResult<Vec<DirectoryGroup>> {
        Ok(vec![])
    }
}

#[async_trait]
impl DirectoryProvider for StaticDirectory {
    async fn list_users(&self) -> DirectoryResult<Vec<DirectoryUser>> {
        Ok(vec![DirectoryUser {
            id: "U1".to_string(),
            handle: "jdoe".to_string(),
            real_name: "Jane Doe".to_string(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            email: "jane@co.com".to_string(),
            phone: "555-0100".to_string(),
            deleted: false,
        }])
    }

    async fn list_groups(&self) -> DirectoryResult<Vec<DirectoryGroup>> {
        Ok(vec![])
    }
}

fn router(config: ServerConfig) -> axum::Router {
    let runtime = RuntimeConfig::new("right")
        .with_debug_trigger("debug")
        .with_build_info("9.9.9", "/srv/teamdir");
    create_router(AppState::with_provider(
        config,
        runtime,
        Arc::new(StaticDirectory),
    ))
}

fn webhook(body: impl Into<Body>) -> Request<Body> {
    let mut request = Request::builder()
        .method(Method::POST)
        .uri("/slack")
        .header(header::HOST, "bot.example.com")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(body.into())
        .unwrap();
    request
        .extensions_mut()
        .insert(ConnectInfo(SocketAddr::from(([10, 0, 0, 1], 5555))));
    request
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_webhook_returns_matches() {
    let response = router(ServerConfig::default())
        .oneshot(webhook("token=right&user_name=asker&text=jane"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    assert!(response.headers().contains_key("x-response-time"));

    let json = json_body(response).await;
    assert_eq!(json["link_names"], 1);
    assert_eq!(
        json["text"],
        "*Users matching \"jane\":*\n\
         Jane Doe: :dir_phone: 555-0100 :dir_email: <mailto:jane@co.com|jane@co.com> :slack: <@U1|jdoe>\n"
    );
}

#[tokio::test]
async fn test_webhook_bad_token_is_still_200() {
    let response = router(ServerConfig::default())
        .oneshot(webhook("token=wrong&text=jane"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["text"], "unauthenticated request, tsk tsk!");
}

#[tokio::test]
async fn test_webhook_debug_trailer_echoes_request() {
    let response = router(ServerConfig::default())
        .oneshot(webhook("token=right&text=jane+debug"))
        .await
        .unwrap();

    let json = json_body(response).await;
    let text = json["text"].as_str().unwrap();
    assert!(text.contains("*Debug Data:*"));
    assert!(text.contains("env.Version=9.9.9"));
    assert!(text.contains("Host=bot.example.com, URL=/slack, Proto=HTTP/1.1, RemoteAddr=10.0.0.1:5555"));
    assert!(text.contains("DEBUG request Header content-type=application/x-www-form-urlencoded"));
    assert!(text.contains("DEBUG request PostForm token=REDACTED"));
    assert!(text.contains("DEBUG request PostForm text=jane debug"));
    assert!(!text.contains("token=right"));
}

#[tokio::test]
async fn test_webhook_invalid_utf8_is_not_found() {
    let response = router(ServerConfig::default())
        .oneshot(webhook(vec![b't', b'e', b'x', b't', b'=', 0xff, 0xfe]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "not_found");
}

#[tokio::test]
async fn test_webhook_invalid_escape_is_not_found() {
    let response = router(ServerConfig::default())
        .oneshot(webhook("token=right&text=%zz%zz"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "not_found");
}

#[tokio::test]
async fn test_webhook_escaped_invalid_utf8_is_not_found() {
    let response = router(ServerConfig::default())
        .oneshot(webhook("token=right&text=%FF%FE"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "not_found");
}

#[tokio::test]
async fn test_webhook_slow_search_times_out_with_json_body() {
    let config = ServerConfig {
        request_timeout: 0,
        ..Default::default()
    };
    let app = create_router(AppState::with_provider(
        config,
        RuntimeConfig::new("right"),
        Arc::new(StalledDirectory),
    ));

    let response = app
        .oneshot(webhook("token=right&text=jane"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    assert!(response.headers().contains_key("x-request-id"));
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "timeout");
}

#[tokio::test]
async fn test_webhook_oversized_body_rejected() {
    let config = ServerConfig {
        max_body_size: 16,
        ..Default::default()
    };
    let body = "token=right&text=".to_string() + &"a".repeat(64);
    let mut request = webhook(body.clone());
    request
        .headers_mut()
        .insert(header::CONTENT_LENGTH, body.len().into());

    let response = router(config).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_webhook_custom_path() {
    let config = ServerConfig {
        webhook_path: "/whois".to_string(),
        ..Default::default()
    };
    let mut request = webhook("token=right&text=jane");
    *request.uri_mut() = "/whois".parse().unwrap();

    let response = router(config.clone()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = router(config)
        .oneshot(webhook("token=right&text=jane"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health() {
    let response = router(ServerConfig::default())
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["version"], "9.9.9");
}

#[tokio::test]
async fn test_health_disabled() {
    let config = ServerConfig {
        health_enabled: false,
        ..Default::default()
    };
    let response = router(config)
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let mut request = webhook("token=right&text=jane");
    request
        .headers_mut()
        .insert("x-request-id", "req-123".parse().unwrap());

    let response = router(ServerConfig::default())
        .oneshot(request)
        .await
        .unwrap();
    assert_eq!(response.headers()["x-request-id"], "req-123");
}
