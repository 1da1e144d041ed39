//! Booking (reservation) models

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use super::user::RecordId;

/// 与 HTML datetime-local 输入一致的时间格式
pub const DATETIME_LOCAL_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// 支付方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    CreditCard,
    Paypal,
    Cash,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CreditCard => "credit_card",
            PaymentMethod::Paypal => "paypal",
            PaymentMethod::Cash => "cash",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "credit_card" | "card" => Ok(PaymentMethod::CreditCard),
            "paypal" => Ok(PaymentMethod::Paypal),
            "cash" => Ok(PaymentMethod::Cash),
            other => Err(format!(
                "unknown payment method: {} (expected credit_card, paypal or cash)",
                other
            )),
        }
    }
}

/// 解析 datetime-local 文本，允许带秒
pub fn parse_datetime_local(s: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(s.trim(), DATETIME_LOCAL_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(s.trim(), "%Y-%m-%dT%H:%M:%S"))
}

/// 预订表单中用户可编辑的字段
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct BookingForm {
    #[validate(length(min = 1, message = "Pickup location is required"))]
    pub pickup_location: String,
    #[validate(length(min = 1, message = "Dropoff location is required"))]
    pub dropoff_location: String,
    #[validate(required(message = "Pickup date and time is required"))]
    pub pickup_datetime: Option<NaiveDateTime>,
    #[validate(required(message = "Dropoff date and time is required"))]
    pub dropoff_datetime: Option<NaiveDateTime>,
    #[validate(required(message = "Payment method is required"))]
    pub payment_method: Option<PaymentMethod>,
}

impl BookingForm {
    /// 所有字段是否为空（成功提交后的状态）
    pub fn is_empty(&self) -> bool {
        *self == BookingForm::default()
    }
}

/// POST /reservations 请求体
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingRequest {
    #[serde(rename = "userId")]
    pub user_id: RecordId,
    pub vehicle_id: RecordId,
    pub pickup_location: String,
    pub dropoff_location: String,
    #[serde(serialize_with = "serialize_datetime_local")]
    pub pickup_datetime: Option<NaiveDateTime>,
    #[serde(serialize_with = "serialize_datetime_local")]
    pub dropoff_datetime: Option<NaiveDateTime>,
    pub payment_method: Option<PaymentMethod>,
}

impl BookingRequest {
    pub fn new(user_id: RecordId, vehicle_id: RecordId, form: &BookingForm) -> Self {
        Self {
            user_id,
            vehicle_id,
            pickup_location: form.pickup_location.trim().to_string(),
            dropoff_location: form.dropoff_location.trim().to_string(),
            pickup_datetime: form.pickup_datetime,
            dropoff_datetime: form.dropoff_datetime,
            payment_method: form.payment_method,
        }
    }
}

fn serialize_datetime_local<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(dt) => serializer.collect_str(&dt.format(DATETIME_LOCAL_FORMAT)),
        None => serializer.serialize_none(),
    }
}
