//! 车队目录服务：拉取车辆列表并在本地过滤

use std::sync::{Arc, RwLock};
use tracing::{info, warn};

use crate::client::ApiClient;
use crate::error::Result;
use crate::models::user::RecordId;
use crate::models::vehicle::{Vehicle, CATEGORIES};

pub struct CatalogService {
    api: Arc<dyn ApiClient>,
    /// 最近一次成功拉取的列表
    vehicles: RwLock<Vec<Vehicle>>,
}

impl CatalogService {
    pub fn new(api: Arc<dyn ApiClient>) -> Self {
        Self {
            api,
            vehicles: RwLock::new(Vec::new()),
        }
    }

    /// 拉取全部车辆并整体替换本地列表
    ///
    /// 失败时本地列表置空，错误交给调用方展示，不自动重试。
    pub async fn fetch_all(&self) -> Result<Vec<Vehicle>> {
        match self.api.list_vehicles().await {
            Ok(vehicles) => {
                info!(count = vehicles.len(), "Vehicle catalog refreshed");
                *self.write() = vehicles.clone();
                Ok(vehicles)
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch vehicles");
                self.write().clear();
                Err(e)
            }
        }
    }

    /// 当前列表的快照
    pub fn vehicles(&self) -> Vec<Vehicle> {
        self.read().clone()
    }

    /// 按分类过滤，"All" 返回原列表
    pub fn by_category(&self, category: &str) -> Vec<Vehicle> {
        self.filter(category, "")
    }

    /// 按名称子串过滤（大小写不敏感）
    pub fn by_name_contains(&self, query: &str) -> Vec<Vehicle> {
        self.filter(crate::models::vehicle::CATEGORY_ALL, query)
    }

    /// 分类与名称同时过滤
    pub fn filter(&self, category: &str, query: &str) -> Vec<Vehicle> {
        self.read()
            .iter()
            .filter(|v| v.in_category(category) && v.name_contains(query))
            .cloned()
            .collect()
    }

    /// 在最近一次拉取结果中选取车辆，作为预订目标
    pub fn select(&self, id: &RecordId) -> Option<Vehicle> {
        self.read().iter().find(|v| &v.id == id).cloned()
    }

    pub fn categories(&self) -> &'static [&'static str] {
        &CATEGORIES
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<Vehicle>> {
        self.vehicles.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Vec<Vehicle>> {
        self.vehicles.write().unwrap_or_else(|e| e.into_inner())
    }
}

/// 根据历史预订分类推荐车型
pub fn recommend_categories(history: &[String]) -> Vec<&'static str> {
    if history.iter().any(|c| c.eq_ignore_ascii_case("SUV")) {
        vec!["Luxury Sedan", "Limousine"]
    } else {
        vec!["SUV", "Compact Car"]
    }
}
