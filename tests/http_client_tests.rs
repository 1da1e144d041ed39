//! HTTP 客户端集成测试
//! 在本地端口启动 axum 模拟服务端，验证请求格式与错误映射

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use cyrene_booking::{
    client::{ApiClient, HttpApiClient},
    config::ApiConfig,
    error::AppError,
    models::{
        auth::{LoginResponse, OtpRequest},
        booking::{parse_datetime_local, BookingForm, BookingRequest, PaymentMethod},
        user::RecordId,
    },
};
use secrecy::{ExposeSecret, Secret};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

mod common;
use common::login_request;

/// 服务端收到的请求
#[derive(Debug, Clone)]
struct Received {
    authorization: Option<String>,
    body: Value,
}

type Log = Arc<Mutex<Vec<Received>>>;

/// 收集日志输出
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

async fn list_vehicles() -> Json<Value> {
    Json(json!([
        {
            "id": 1,
            "name": "London Cab",
            "category": "Luxury Sedan",
            "capacity": 4,
            "fuelType": "Petrol",
            "features": ["Leather seats", "WiFi"]
        },
        { "id": "v-2", "name": "Santa Fe", "category": "SUV", "capacity": "7 passengers" }
    ]))
}

async fn create_reservation(
    State(log): State<Log>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    log.lock().unwrap().push(Received {
        authorization,
        body: body.clone(),
    });

    if body["pickup_location"] == "Nowhere" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "Vehicle unavailable" })),
        )
            .into_response();
    }
    if body["pickup_location"] == "Crash" {
        return (StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>").into_response();
    }
    (StatusCode::CREATED, Json(json!({ "id": 77 }))).into_response()
}

async fn login(Json(body): Json<Value>) -> Json<Value> {
    if body["email"] == "direct@example.com" {
        Json(json!({ "user": { "id": 3, "name": "Direct" }, "token": "tok-direct" }))
    } else if body["email"] == "broken@example.com" {
        Json(json!({ "user": null, "token": "real-session" }))
    } else {
        Json(json!({ "token": "provisional", "message": "OTP sent" }))
    }
}

async fn verify_otp(Json(body): Json<Value>) -> impl IntoResponse {
    if body["otp"] == "123456" {
        (
            StatusCode::OK,
            Json(json!({ "user": { "id": 3, "email": body["email"] }, "token": "tok-otp" })),
        )
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Invalid OTP" })))
    }
}

async fn slow_reviews() -> Json<Value> {
    tokio::time::sleep(Duration::from_secs(3)).await;
    Json(json!([]))
}

/// 启动模拟服务端，返回客户端与请求日志
async fn spawn_server(timeout_secs: u64) -> (HttpApiClient, Log) {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/vehicles", get(list_vehicles))
        .route("/reservations", post(create_reservation))
        .route("/auth/login", post(login))
        .route("/auth/verify-otp", post(verify_otp))
        .route("/reviews", get(slow_reviews))
        .with_state(log.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = HttpApiClient::new(&ApiConfig {
        base_url: format!("http://{}/", addr),
        timeout_secs,
    })
    .unwrap();
    (client, log)
}

fn booking_request(pickup: &str) -> BookingRequest {
    let form = BookingForm {
        pickup_location: pickup.to_string(),
        dropoff_location: "Downtown".to_string(),
        pickup_datetime: Some(parse_datetime_local("2026-11-02T09:30").unwrap()),
        dropoff_datetime: Some(parse_datetime_local("2026-11-02T12:00").unwrap()),
        payment_method: Some(PaymentMethod::Paypal),
    };
    BookingRequest::new(RecordId::Number(5), RecordId::Number(1), &form)
}

#[tokio::test]
async fn test_list_vehicles_parses_catalog() {
    let (client, _) = spawn_server(5).await;

    let vehicles = client.list_vehicles().await.unwrap();

    assert_eq!(vehicles.len(), 2);
    assert_eq!(vehicles[0].capacity.as_deref(), Some("4"));
    assert_eq!(vehicles[0].fuel_type.as_deref(), Some("Petrol"));
    assert_eq!(vehicles[0].features, vec!["Leather seats", "WiFi"]);
    assert_eq!(vehicles[1].id, RecordId::Text("v-2".to_string()));
    assert_eq!(vehicles[1].capacity.as_deref(), Some("7 passengers"));
}

#[tokio::test]
async fn test_reservation_sends_bearer_token_and_body() {
    let (client, log) = spawn_server(5).await;
    let token = Secret::new("tok-5".to_string());

    client
        .create_reservation(&token, &booking_request("Benghazi Airport"))
        .await
        .unwrap();

    let received = log.lock().unwrap().clone();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].authorization.as_deref(), Some("Bearer tok-5"));
    let body = &received[0].body;
    assert_eq!(body["userId"], 5);
    assert_eq!(body["vehicle_id"], 1);
    assert_eq!(body["pickup_datetime"], "2026-11-02T09:30");
    assert_eq!(body["payment_method"], "paypal");
}

#[tokio::test]
async fn test_rejection_carries_server_message() {
    let (client, _) = spawn_server(5).await;
    let token = Secret::new("t".to_string());

    let err = client
        .create_reservation(&token, &booking_request("Nowhere"))
        .await
        .unwrap_err();

    match err {
        AppError::RemoteRejected { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message.as_deref(), Some("Vehicle unavailable"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_rejection_with_non_json_body_has_no_message() {
    let (client, _) = spawn_server(5).await;
    let token = Secret::new("t".to_string());

    let err = client
        .create_reservation(&token, &booking_request("Crash"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::RemoteRejected {
            status: 500,
            message: None
        }
    ));
    assert_eq!(err.user_message("Failed to make the booking."), "Failed to make the booking.");
}

#[tokio::test]
async fn test_login_response_shapes() {
    let (client, _) = spawn_server(5).await;

    let response = client.login(&login_request()).await.unwrap();
    assert!(response.requires_otp());

    let mut direct = login_request();
    direct.email = "direct@example.com".to_string();
    match client.login(&direct).await.unwrap() {
        LoginResponse::Authenticated(auth) => {
            assert_eq!(auth.user.id, RecordId::Number(3));
            assert_eq!(auth.token.expose_secret(), "tok-direct");
        }
        other => panic!("expected direct session, got {:?}", other),
    }
}

#[tokio::test]
async fn test_login_with_invalid_user_is_network_failure() {
    let (client, _) = spawn_server(5).await;
    let mut broken = login_request();
    broken.email = "broken@example.com".to_string();

    let err = client.login(&broken).await.unwrap_err();

    assert!(err.is_network());
}

#[tokio::test]
async fn test_reservation_logged_once_at_info() {
    let (client, _) = spawn_server(5).await;
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_ansi(false)
        .with_writer(move || SharedBuffer(writer.clone()))
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    client
        .create_reservation(&Secret::new("t".to_string()), &booking_request("Benina"))
        .await
        .unwrap();

    // 确认日志由预订工作流输出，客户端只记 debug
    let output = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
    assert!(!output.contains("Reservation accepted"), "{}", output);
}

#[tokio::test]
async fn test_verify_otp() {
    let (client, _) = spawn_server(5).await;

    let auth = client
        .verify_otp(&OtpRequest {
            email: "rider@example.com".to_string(),
            otp: "123456".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(auth.token.expose_secret(), "tok-otp");
    assert_eq!(auth.user.email.as_deref(), Some("rider@example.com"));

    let err = client
        .verify_otp(&OtpRequest {
            email: "rider@example.com".to_string(),
            otp: "999999".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.remote_message(), Some("Invalid OTP"));
}

#[tokio::test]
async fn test_timeout_is_network_failure() {
    let (client, _) = spawn_server(1).await;

    let err = client.list_reviews().await.unwrap_err();

    assert!(err.is_network());
}

#[tokio::test]
async fn test_unreachable_server_is_network_failure() {
    let client = HttpApiClient::new(&ApiConfig {
        base_url: "http://127.0.0.1:1".to_string(),
        timeout_secs: 2,
    })
    .unwrap();

    let err = client.list_vehicles().await.unwrap_err();

    assert!(err.is_network());
}
