//! Authentication-related models

use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::user::User;

/// 登录凭证（第一阶段）
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    /// 人机验证组件给出的证明令牌
    #[serde(rename = "captchaToken")]
    #[validate(length(min = 1, message = "Please complete the CAPTCHA"))]
    pub captcha_token: String,
}

/// OTP 校验请求（第二阶段）
#[derive(Debug, Clone, Serialize, Validate)]
pub struct OtpRequest {
    pub email: String,
    #[validate(length(min = 1, message = "OTP code is required"))]
    pub otp: String,
}

/// 注册请求
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    #[validate(length(min = 1, message = "Phone number is required"))]
    pub phone_number: String,
    #[validate(length(min = 1, message = "Address is required"))]
    pub address: String,
}

/// 已认证响应：用户身份 + 令牌
#[derive(Debug, Deserialize)]
pub struct AuthenticatedResponse {
    pub user: User,
    pub token: Secret<String>,
}

/// /auth/login 响应
///
/// 带 `user` 的响应直接建立会话；否则需要进入 OTP 阶段。
/// `user` 出现但无法解析（包括 `null`）时整个响应无效，不会退化为 OTP 阶段。
#[derive(Debug, Deserialize)]
#[serde(try_from = "RawLoginResponse")]
pub enum LoginResponse {
    Authenticated(AuthenticatedResponse),
    OtpRequired {
        /// 临时令牌，仅在 OTP 阶段持有，不建立会话
        token: Option<Secret<String>>,
        message: Option<String>,
    },
}

/// 线上格式；区分 `user` 缺失与 `user` 存在
#[derive(Deserialize)]
struct RawLoginResponse {
    #[serde(default, deserialize_with = "present")]
    user: Option<serde_json::Value>,
    #[serde(default)]
    token: Option<Secret<String>>,
    #[serde(default)]
    message: Option<String>,
}

/// 键存在即为 Some，`null` 也算
fn present<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}

impl TryFrom<RawLoginResponse> for LoginResponse {
    type Error = String;

    fn try_from(raw: RawLoginResponse) -> Result<Self, Self::Error> {
        match raw.user {
            Some(user) => {
                let user: User = serde_json::from_value(user)
                    .map_err(|e| format!("invalid user in login response: {}", e))?;
                let token = raw
                    .token
                    .ok_or_else(|| "login response has a user but no token".to_string())?;
                Ok(LoginResponse::Authenticated(AuthenticatedResponse { user, token }))
            }
            None => Ok(LoginResponse::OtpRequired {
                token: raw.token,
                message: raw.message,
            }),
        }
    }
}

impl LoginResponse {
    pub fn requires_otp(&self) -> bool {
        matches!(self, LoginResponse::OtpRequired { .. })
    }
}

/// 克隆 Secret（secrecy 0.8 对 String 不提供 Clone）
pub fn clone_secret(secret: &Secret<String>) -> Secret<String> {
    Secret::new(secret.expose_secret().clone())
}
