//! 认证服务：两阶段登录（凭证 -> OTP）、注册、登出

use secrecy::Secret;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use validator::Validate;

use crate::client::ApiClient;
use crate::config::AuthConfig;
use crate::error::{AppError, Result};
use crate::models::auth::{LoginRequest, LoginResponse, OtpRequest, RegisterRequest};
use crate::navigation::{NavigationBus, Route, ScheduledRedirect};
use crate::services::session_service::SessionStore;

pub const LOGIN_FAILED_MESSAGE: &str = "Login failed";
pub const OTP_FAILED_MESSAGE: &str = "OTP verification failed";
pub const REGISTRATION_FAILED_MESSAGE: &str = "Registration failed";
pub const LOGIN_SUCCESS_MESSAGE: &str = "Login successful! Redirecting...";
pub const OTP_SENT_MESSAGE: &str = "A verification code has been sent to your email.";
pub const REGISTRATION_SUCCESS_MESSAGE: &str = "Registration successful! You can now log in.";

/// 提示类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashKind {
    Success,
    Error,
}

/// 表单上方展示的提示
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashMessage {
    pub kind: FlashKind,
    pub text: String,
}

impl FlashMessage {
    pub fn success(text: &str) -> Self {
        Self {
            kind: FlashKind::Success,
            text: text.to_string(),
        }
    }

    pub fn error(text: String) -> Self {
        Self {
            kind: FlashKind::Error,
            text,
        }
    }
}

/// 认证服务：登出，以及创建登录/注册工作流
pub struct AuthService {
    api: Arc<dyn ApiClient>,
    sessions: Arc<SessionStore>,
    navigation: NavigationBus,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(
        api: Arc<dyn ApiClient>,
        sessions: Arc<SessionStore>,
        navigation: NavigationBus,
        config: AuthConfig,
    ) -> Self {
        Self {
            api,
            sessions,
            navigation,
            config,
        }
    }

    pub fn login_workflow(&self) -> LoginWorkflow {
        LoginWorkflow::new(
            self.api.clone(),
            self.sessions.clone(),
            self.navigation.clone(),
            self.config.redirect_delay(),
        )
    }

    pub fn signup_workflow(&self) -> SignupWorkflow {
        SignupWorkflow::new(
            self.api.clone(),
            self.navigation.clone(),
            self.config.redirect_delay(),
        )
    }

    /// 登出：先同步清除本地会话，再尽力通知服务端
    ///
    /// 通知在独立任务中执行，失败只记录日志，不影响本地登出。
    pub fn logout(&self) -> JoinHandle<()> {
        let token = self.sessions.current_user().map(|s| s.token);
        self.sessions.logout();

        let api = self.api.clone();
        tokio::spawn(async move {
            match api.logout(token.as_ref()).await {
                Ok(()) => debug!("Logout notification delivered"),
                Err(e) => debug!(error = %e, "Logout notification failed (ignored)"),
            }
        })
    }
}

/// 登录工作流状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginStatus {
    EnteringCredentials,
    VerifyingCredentials,
    AwaitingOtp,
    VerifyingOtp,
    Authenticated,
}

/// 两阶段登录工作流
///
/// `/auth/login` 返回 `{user, token}` 时直接建立会话；
/// 否则进入 AwaitingOtp，只持有临时令牌，`/auth/verify-otp` 成功后才建立会话。
pub struct LoginWorkflow {
    api: Arc<dyn ApiClient>,
    sessions: Arc<SessionStore>,
    navigation: NavigationBus,
    redirect_delay: Duration,
    status: LoginStatus,
    /// 凭证阶段通过后的邮箱，供 OTP 阶段使用
    pending_email: Option<String>,
    provisional_token: Option<Secret<String>>,
    message: Option<FlashMessage>,
    redirect: Option<ScheduledRedirect>,
}

impl LoginWorkflow {
    pub fn new(
        api: Arc<dyn ApiClient>,
        sessions: Arc<SessionStore>,
        navigation: NavigationBus,
        redirect_delay: Duration,
    ) -> Self {
        Self {
            api,
            sessions,
            navigation,
            redirect_delay,
            status: LoginStatus::EnteringCredentials,
            pending_email: None,
            provisional_token: None,
            message: None,
            redirect: None,
        }
    }

    pub fn status(&self) -> LoginStatus {
        self.status
    }

    pub fn message(&self) -> Option<&FlashMessage> {
        self.message.as_ref()
    }

    pub fn redirect(&self) -> Option<&ScheduledRedirect> {
        self.redirect.as_ref()
    }

    pub fn has_provisional_token(&self) -> bool {
        self.provisional_token.is_some()
    }

    pub fn can_submit(&self) -> bool {
        !matches!(
            self.status,
            LoginStatus::VerifyingCredentials | LoginStatus::VerifyingOtp
        )
    }

    /// 放弃 OTP 阶段，回到凭证输入
    pub fn restart(&mut self) {
        if !self.can_submit() {
            return;
        }
        self.status = LoginStatus::EnteringCredentials;
        self.pending_email = None;
        self.provisional_token = None;
        self.message = None;
        self.redirect = None;
    }

    /// 第一阶段：提交邮箱、密码与 CAPTCHA 令牌
    pub async fn submit_credentials(&mut self, request: LoginRequest) -> Result<LoginStatus> {
        if !self.can_submit() {
            return Err(AppError::Busy);
        }

        self.restart();
        if let Err(e) = request.validate() {
            let error = AppError::from(e);
            self.message = Some(FlashMessage::error(error.user_message(LOGIN_FAILED_MESSAGE)));
            return Err(error);
        }

        self.status = LoginStatus::VerifyingCredentials;

        match self.api.login(&request).await {
            Ok(LoginResponse::Authenticated(auth)) => {
                info!(user_id = %auth.user.id, "Credentials accepted, no OTP required");
                self.establish(auth.user, auth.token);
                Ok(self.status)
            }
            Ok(LoginResponse::OtpRequired { token, message }) => {
                info!("Credentials accepted, awaiting OTP");
                self.status = LoginStatus::AwaitingOtp;
                self.pending_email = Some(request.email);
                self.provisional_token = token;
                let text = message.filter(|m| !m.is_empty());
                self.message = Some(FlashMessage::success(
                    text.as_deref().unwrap_or(OTP_SENT_MESSAGE),
                ));
                Ok(self.status)
            }
            Err(e) => {
                warn!(error = %e, "Credential verification failed");
                self.status = LoginStatus::EnteringCredentials;
                self.message = Some(FlashMessage::error(e.user_message(LOGIN_FAILED_MESSAGE)));
                Err(e)
            }
        }
    }

    /// 第二阶段：提交 OTP
    pub async fn submit_otp(&mut self, otp: &str) -> Result<()> {
        if !self.can_submit() {
            return Err(AppError::Busy);
        }

        let email = match (&self.status, &self.pending_email) {
            (LoginStatus::AwaitingOtp, Some(email)) => email.clone(),
            _ => {
                return Err(AppError::validation(
                    "Please sign in with your email and password first",
                ))
            }
        };

        let request = OtpRequest {
            email,
            otp: otp.trim().to_string(),
        };
        if let Err(e) = request.validate() {
            let error = AppError::from(e);
            self.message = Some(FlashMessage::error(error.user_message(OTP_FAILED_MESSAGE)));
            return Err(error);
        }

        self.status = LoginStatus::VerifyingOtp;

        match self.api.verify_otp(&request).await {
            Ok(auth) => {
                info!(user_id = %auth.user.id, "OTP verified");
                self.establish(auth.user, auth.token);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "OTP verification failed");
                self.status = LoginStatus::AwaitingOtp;
                self.message = Some(FlashMessage::error(e.user_message(OTP_FAILED_MESSAGE)));
                Err(e)
            }
        }
    }

    fn establish(&mut self, user: crate::models::user::User, token: Secret<String>) {
        self.sessions.login(user, token);
        self.status = LoginStatus::Authenticated;
        self.pending_email = None;
        self.provisional_token = None;
        self.message = Some(FlashMessage::success(LOGIN_SUCCESS_MESSAGE));
        self.redirect = Some(ScheduledRedirect::schedule(
            &self.navigation,
            Route::Home,
            self.redirect_delay,
        ));
    }
}

/// 注册工作流状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignupStatus {
    Editing,
    Submitting,
    Succeeded,
    Failed { message: String },
}

/// 注册工作流：Editing -> Submitting -> {Succeeded, Failed}
pub struct SignupWorkflow {
    api: Arc<dyn ApiClient>,
    navigation: NavigationBus,
    redirect_delay: Duration,
    form: RegisterRequest,
    status: SignupStatus,
    notice: Option<String>,
    redirect: Option<ScheduledRedirect>,
}

impl SignupWorkflow {
    pub fn new(api: Arc<dyn ApiClient>, navigation: NavigationBus, redirect_delay: Duration) -> Self {
        Self {
            api,
            navigation,
            redirect_delay,
            form: RegisterRequest::default(),
            status: SignupStatus::Editing,
            notice: None,
            redirect: None,
        }
    }

    pub fn status(&self) -> &SignupStatus {
        &self.status
    }

    pub fn form(&self) -> &RegisterRequest {
        &self.form
    }

    pub fn redirect(&self) -> Option<&ScheduledRedirect> {
        self.redirect.as_ref()
    }

    pub fn message(&self) -> Option<&str> {
        match &self.status {
            SignupStatus::Failed { message } => Some(message),
            SignupStatus::Succeeded => Some(REGISTRATION_SUCCESS_MESSAGE),
            _ => self.notice.as_deref(),
        }
    }

    pub fn can_submit(&self) -> bool {
        !matches!(self.status, SignupStatus::Submitting)
    }

    pub fn edit<F>(&mut self, apply: F)
    where
        F: FnOnce(&mut RegisterRequest),
    {
        if !self.can_submit() {
            return;
        }
        apply(&mut self.form);
        self.status = SignupStatus::Editing;
        self.notice = None;
    }

    /// 提交注册，成功后排期跳转到登录页
    pub async fn submit(&mut self) -> Result<()> {
        if !self.can_submit() {
            return Err(AppError::Busy);
        }

        if let Err(e) = self.form.validate() {
            let error = AppError::from(e);
            self.status = SignupStatus::Editing;
            self.notice = Some(error.user_message(REGISTRATION_FAILED_MESSAGE));
            return Err(error);
        }

        self.status = SignupStatus::Submitting;
        self.notice = None;

        match self.api.register(&self.form).await {
            Ok(()) => {
                info!("Registration accepted");
                self.form = RegisterRequest::default();
                self.status = SignupStatus::Succeeded;
                self.redirect = Some(ScheduledRedirect::schedule(
                    &self.navigation,
                    Route::Login,
                    self.redirect_delay,
                ));
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Registration failed");
                self.status = SignupStatus::Failed {
                    message: e.user_message(REGISTRATION_FAILED_MESSAGE),
                };
                Err(e)
            }
        }
    }
}
