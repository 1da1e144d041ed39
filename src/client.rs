//! 远端 API 客户端
//!
//! `ApiClient` 是工作流与网络之间的接缝；`HttpApiClient` 基于 reqwest 实现。
//! 每个端点的响应在此处解析为明确的结构，失败统一转换为
//! `RemoteRejected` 或 `Network`。

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, Secret};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::error::{AppError, Result};
use crate::models::{
    auth::{AuthenticatedResponse, LoginRequest, LoginResponse, OtpRequest, RegisterRequest},
    booking::BookingRequest,
    review::Review,
    vehicle::Vehicle,
};

/// 远端 API 接口
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// GET /vehicles
    async fn list_vehicles(&self) -> Result<Vec<Vehicle>>;

    /// POST /reservations（需要 Bearer 令牌）
    async fn create_reservation(&self, token: &Secret<String>, request: &BookingRequest)
        -> Result<()>;

    /// POST /auth/login
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse>;

    /// POST /auth/verify-otp
    async fn verify_otp(&self, request: &OtpRequest) -> Result<AuthenticatedResponse>;

    /// POST /auth/register
    async fn register(&self, request: &RegisterRequest) -> Result<()>;

    /// POST /auth/logout，调用方忽略结果
    async fn logout(&self, token: Option<&Secret<String>>) -> Result<()>;

    /// GET /reviews
    async fn list_reviews(&self) -> Result<Vec<Review>>;
}

/// 错误响应体 `{ "message": ... }`
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// 基于 reqwest 的 API 客户端
#[derive(Clone)]
pub struct HttpApiClient {
    client: Client,
    base_url: String,
}

impl HttpApiClient {
    /// 创建新的客户端
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("cyrene-booking/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// 发送请求，非 2xx 转换为 RemoteRejected
    async fn send(&self, request: RequestBuilder, endpoint: &str) -> Result<Response> {
        let response = request.send().await.map_err(|e| {
            warn!(endpoint, error = %e, "Request failed before a response was received");
            AppError::from(e)
        })?;

        let status = response.status();
        if status.is_success() {
            debug!(endpoint, status = status.as_u16(), "Request succeeded");
            return Ok(response);
        }

        // 错误体可能不是 JSON，解析失败时不带消息
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message);

        warn!(
            endpoint,
            status = status.as_u16(),
            message = message.as_deref().unwrap_or(""),
            "Remote rejected request"
        );

        Err(AppError::RemoteRejected {
            status: status.as_u16(),
            message,
        })
    }

    async fn parse<T: DeserializeOwned>(response: Response, endpoint: &str) -> Result<T> {
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| {
            warn!(endpoint, error = %e, "Failed to parse response body");
            AppError::Network(format!("invalid response body from {}: {}", endpoint, e))
        })
    }
}

#[async_trait]
impl ApiClient for HttpApiClient {
    async fn list_vehicles(&self) -> Result<Vec<Vehicle>> {
        let endpoint = "/vehicles";
        let response = self.send(self.client.get(self.url(endpoint)), endpoint).await?;
        let vehicles: Vec<Vehicle> = Self::parse(response, endpoint).await?;
        debug!(count = vehicles.len(), "Fetched vehicles");
        Ok(vehicles)
    }

    async fn create_reservation(
        &self,
        token: &Secret<String>,
        request: &BookingRequest,
    ) -> Result<()> {
        let endpoint = "/reservations";
        let builder = self
            .client
            .post(self.url(endpoint))
            .bearer_auth(token.expose_secret())
            .json(request);
        self.send(builder, endpoint).await?;

        debug!(vehicle_id = %request.vehicle_id, "Reservation accepted");
        Ok(())
    }

    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse> {
        let endpoint = "/auth/login";
        let response = self
            .send(self.client.post(self.url(endpoint)).json(request), endpoint)
            .await?;
        Self::parse(response, endpoint).await
    }

    async fn verify_otp(&self, request: &OtpRequest) -> Result<AuthenticatedResponse> {
        let endpoint = "/auth/verify-otp";
        let response = self
            .send(self.client.post(self.url(endpoint)).json(request), endpoint)
            .await?;
        Self::parse(response, endpoint).await
    }

    async fn register(&self, request: &RegisterRequest) -> Result<()> {
        let endpoint = "/auth/register";
        self.send(self.client.post(self.url(endpoint)).json(request), endpoint)
            .await?;
        Ok(())
    }

    async fn logout(&self, token: Option<&Secret<String>>) -> Result<()> {
        let endpoint = "/auth/logout";
        let mut builder = self.client.post(self.url(endpoint));
        if let Some(token) = token {
            builder = builder.bearer_auth(token.expose_secret());
        }
        self.send(builder, endpoint).await?;
        Ok(())
    }

    async fn list_reviews(&self) -> Result<Vec<Review>> {
        let endpoint = "/reviews";
        let response = self.send(self.client.get(self.url(endpoint)), endpoint).await?;
        Self::parse(response, endpoint).await
    }
}
