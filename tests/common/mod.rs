//! 测试公共模块
//! 提供记录调用的 MockApi、测试配置与会失败的存储

#![allow(dead_code)]

use async_trait::async_trait;
use cyrene_booking::{
    client::ApiClient,
    config::{ApiConfig, AppConfig, AuthConfig, BookingConfig, LoggingConfig, StorageConfig},
    error::{AppError, Result},
    models::{
        auth::{AuthenticatedResponse, LoginRequest, LoginResponse, OtpRequest, RegisterRequest},
        booking::BookingRequest,
        review::Review,
        user::User,
        vehicle::Vehicle,
    },
    repository::{MemoryStorage, SessionStorage},
    state::AppState,
};
use secrecy::{ExposeSecret, Secret};
use serde_json::json;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// 记录下来的一次 API 调用
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListVehicles,
    CreateReservation {
        token: String,
        request: BookingRequest,
    },
    Login {
        email: String,
        captcha_token: String,
    },
    VerifyOtp {
        email: String,
        otp: String,
    },
    Register {
        email: String,
    },
    Logout {
        token: Option<String>,
    },
    ListReviews,
}

/// 预设的接口结果
#[derive(Debug, Clone)]
pub enum Outcome<T> {
    Ok(T),
    Rejected(u16, Option<String>),
    NetworkDown,
}

impl<T: Clone> Outcome<T> {
    fn produce(&self) -> Result<T> {
        match self {
            Outcome::Ok(value) => Ok(value.clone()),
            Outcome::Rejected(status, message) => Err(AppError::RemoteRejected {
                status: *status,
                message: message.clone(),
            }),
            Outcome::NetworkDown => Err(AppError::network("connection refused")),
        }
    }
}

pub struct MockApi {
    calls: Mutex<Vec<Call>>,
    pub vehicles: Mutex<Outcome<Vec<Vehicle>>>,
    pub reservation: Mutex<Outcome<()>>,
    pub login: Mutex<Outcome<serde_json::Value>>,
    pub verify_otp: Mutex<Outcome<serde_json::Value>>,
    pub register: Mutex<Outcome<()>>,
    pub logout: Mutex<Outcome<()>>,
    pub reviews: Mutex<Outcome<Vec<Review>>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            vehicles: Mutex::new(Outcome::Ok(Vec::new())),
            reservation: Mutex::new(Outcome::Ok(())),
            login: Mutex::new(Outcome::Ok(json!({ "token": "provisional" }))),
            verify_otp: Mutex::new(Outcome::Ok(authenticated_body(1, "session-token"))),
            register: Mutex::new(Outcome::Ok(())),
            logout: Mutex::new(Outcome::Ok(())),
            reviews: Mutex::new(Outcome::Ok(Vec::new())),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn set<T>(slot: &Mutex<Outcome<T>>, outcome: Outcome<T>) {
        *slot.lock().unwrap() = outcome;
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

fn decode<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| AppError::Network(e.to_string()))
}

#[async_trait]
impl ApiClient for MockApi {
    async fn list_vehicles(&self) -> Result<Vec<Vehicle>> {
        self.record(Call::ListVehicles);
        self.vehicles.lock().unwrap().produce()
    }

    async fn create_reservation(
        &self,
        token: &Secret<String>,
        request: &BookingRequest,
    ) -> Result<()> {
        self.record(Call::CreateReservation {
            token: token.expose_secret().clone(),
            request: request.clone(),
        });
        self.reservation.lock().unwrap().produce()
    }

    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse> {
        self.record(Call::Login {
            email: request.email.clone(),
            captcha_token: request.captcha_token.clone(),
        });
        let body = self.login.lock().unwrap().produce()?;
        decode(body)
    }

    async fn verify_otp(&self, request: &OtpRequest) -> Result<AuthenticatedResponse> {
        self.record(Call::VerifyOtp {
            email: request.email.clone(),
            otp: request.otp.clone(),
        });
        let body = self.verify_otp.lock().unwrap().produce()?;
        decode(body)
    }

    async fn register(&self, request: &RegisterRequest) -> Result<()> {
        self.record(Call::Register {
            email: request.email.clone(),
        });
        self.register.lock().unwrap().produce()
    }

    async fn logout(&self, token: Option<&Secret<String>>) -> Result<()> {
        self.record(Call::Logout {
            token: token.map(|t| t.expose_secret().clone()),
        });
        self.logout.lock().unwrap().produce()
    }

    async fn list_reviews(&self) -> Result<Vec<Review>> {
        self.record(Call::ListReviews);
        self.reviews.lock().unwrap().produce()
    }
}

/// 写入总是失败的存储（模拟配额耗尽）
pub struct FailingStorage;

impl SessionStorage for FailingStorage {
    fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(AppError::persistence("storage unavailable"))
    }

    fn set_all(&self, _entries: &[(&str, &str)]) -> Result<()> {
        Err(AppError::persistence("quota exceeded"))
    }

    fn remove_all(&self, _keys: &[&str]) -> Result<()> {
        Err(AppError::persistence("storage unavailable"))
    }
}

/// 创建测试配置
pub fn create_test_config() -> AppConfig {
    AppConfig {
        api: ApiConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 5,
        },
        storage: StorageConfig {
            session_file: PathBuf::from("unused-session.json"),
        },
        auth: AuthConfig {
            // 缩短跳转延迟以加快测试
            redirect_delay_ms: 20,
        },
        booking: BookingConfig {
            enforce_required_fields: true,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "compact".to_string(),
        },
    }
}

/// 使用 MockApi 与内存存储构建应用状态
pub fn create_test_state(api: Arc<MockApi>) -> AppState {
    AppState::with_components(create_test_config(), api, Arc::new(MemoryStorage::new()))
}

pub fn test_user(id: i64) -> User {
    User {
        id: id.into(),
        name: Some("Test Rider".to_string()),
        email: Some("rider@example.com".to_string()),
    }
}

pub fn authenticated_body(id: i64, token: &str) -> serde_json::Value {
    json!({
        "user": { "id": id, "name": "Test Rider", "email": "rider@example.com" },
        "token": token,
    })
}

pub fn vehicle(id: i64, name: &str, category: &str) -> Vehicle {
    serde_json::from_value(json!({ "id": id, "name": name, "category": category })).unwrap()
}

pub fn sample_fleet() -> Vec<Vehicle> {
    vec![
        vehicle(1, "London Cab", "Luxury Sedan"),
        vehicle(2, "Santa Fe", "SUV"),
        vehicle(3, "Chairman VIP", "Limousine"),
        vehicle(4, "Hongqi HS", "SUV"),
    ]
}

pub fn login_request() -> LoginRequest {
    LoginRequest {
        email: "rider@example.com".to_string(),
        password: "Secret123".to_string(),
        captcha_token: "captcha-proof".to_string(),
    }
}
