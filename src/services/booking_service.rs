//! 预订工作流：Editing -> Submitting -> {Succeeded, Failed}

use std::sync::Arc;
use tracing::{info, warn};
use validator::Validate;

use crate::client::ApiClient;
use crate::config::BookingConfig;
use crate::error::{AppError, Result};
use crate::models::booking::{BookingForm, BookingRequest};
use crate::models::vehicle::Vehicle;
use crate::services::catalog_service::CatalogService;
use crate::services::session_service::SessionStore;

/// 服务端拒绝且未给出消息时的默认文案
pub const BOOKING_FAILED_MESSAGE: &str = "Failed to make the booking.";

/// 所选车辆已不在最近一次拉取的车队中
pub const VEHICLE_UNAVAILABLE_MESSAGE: &str =
    "The selected vehicle is no longer available. Please choose another vehicle.";

/// 预订成功确认文案
pub const BOOKING_CONFIRMED_MESSAGE: &str = "Your booking has been confirmed. Enjoy your ride!";

/// 预订工作流状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingStatus {
    Editing,
    Submitting,
    /// 确认信息一直展示，直到用户关闭
    Succeeded,
    Failed { message: String },
}

pub struct BookingWorkflow {
    api: Arc<dyn ApiClient>,
    sessions: Arc<SessionStore>,
    catalog: Arc<CatalogService>,
    vehicle: Vehicle,
    form: BookingForm,
    status: BookingStatus,
    /// 停留在 Editing 时的提示（未登录、字段缺失）
    notice: Option<String>,
    enforce_required_fields: bool,
}

impl BookingWorkflow {
    /// `vehicle` 应来自 `catalog.select`；提交时会再次核对
    pub fn new(
        api: Arc<dyn ApiClient>,
        sessions: Arc<SessionStore>,
        catalog: Arc<CatalogService>,
        vehicle: Vehicle,
        config: &BookingConfig,
    ) -> Self {
        Self {
            api,
            sessions,
            catalog,
            vehicle,
            form: BookingForm::default(),
            status: BookingStatus::Editing,
            notice: None,
            enforce_required_fields: config.enforce_required_fields,
        }
    }

    pub fn status(&self) -> &BookingStatus {
        &self.status
    }

    pub fn form(&self) -> &BookingForm {
        &self.form
    }

    pub fn vehicle(&self) -> &Vehicle {
        &self.vehicle
    }

    /// 当前应展示给用户的文本
    pub fn message(&self) -> Option<&str> {
        match &self.status {
            BookingStatus::Failed { message } => Some(message),
            BookingStatus::Succeeded => Some(BOOKING_CONFIRMED_MESSAGE),
            _ => self.notice.as_deref(),
        }
    }

    /// 提交按钮是否可用
    pub fn can_submit(&self) -> bool {
        !matches!(self.status, BookingStatus::Submitting)
    }

    /// 编辑表单；Failed 回到 Editing，Succeeded 的确认保留到 `dismiss_confirmation`
    pub fn edit<F>(&mut self, apply: F)
    where
        F: FnOnce(&mut BookingForm),
    {
        if matches!(self.status, BookingStatus::Submitting) {
            return;
        }
        apply(&mut self.form);
        if self.status != BookingStatus::Succeeded {
            self.status = BookingStatus::Editing;
        }
        self.notice = None;
    }

    /// 关闭成功确认
    pub fn dismiss_confirmation(&mut self) {
        if self.status == BookingStatus::Succeeded {
            self.status = BookingStatus::Editing;
        }
    }

    /// 提交预订，每次调用最多一次网络请求
    ///
    /// 本地拦截（未登录、车辆已下架、字段缺失）保持 Editing；远端失败进入 Failed 且保留字段。
    pub async fn submit(&mut self) -> Result<()> {
        if !self.can_submit() {
            return Err(AppError::Busy);
        }

        let Some(session) = self.sessions.current_user() else {
            warn!("Booking attempted without a session");
            return Err(self.block(AppError::AuthorizationMissing));
        };

        if self.catalog.select(&self.vehicle.id).is_none() {
            warn!(vehicle_id = %self.vehicle.id, "Selected vehicle is not in the current catalog");
            return Err(self.block(AppError::validation(VEHICLE_UNAVAILABLE_MESSAGE)));
        }

        if self.enforce_required_fields {
            if let Err(e) = self.form.validate() {
                return Err(self.block(e.into()));
            }
        }

        let request = BookingRequest::new(session.user.id.clone(), self.vehicle.id.clone(), &self.form);

        self.status = BookingStatus::Submitting;
        self.notice = None;

        match self.api.create_reservation(&session.token, &request).await {
            Ok(()) => {
                info!(vehicle_id = %self.vehicle.id, user_id = %session.user.id, "Booking confirmed");
                self.form = BookingForm::default();
                self.status = BookingStatus::Succeeded;
                Ok(())
            }
            Err(e) => {
                warn!(vehicle_id = %self.vehicle.id, error = %e, "Booking failed");
                self.status = BookingStatus::Failed {
                    message: e.user_message(BOOKING_FAILED_MESSAGE),
                };
                Err(e)
            }
        }
    }

    fn block(&mut self, error: AppError) -> AppError {
        self.status = BookingStatus::Editing;
        self.notice = Some(error.user_message(BOOKING_FAILED_MESSAGE));
        error
    }
}
