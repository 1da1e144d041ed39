//! 应用状态：显式依赖注入，所有工作流从这里取共享组件

use std::sync::Arc;

use crate::client::{ApiClient, HttpApiClient};
use crate::config::AppConfig;
use crate::error::Result;
use crate::models::vehicle::Vehicle;
use crate::navigation::NavigationBus;
use crate::repository::{FileStorage, SessionStorage};
use crate::services::{AuthService, BookingWorkflow, CatalogService, ReviewService, SessionStore};

pub struct AppState {
    pub config: AppConfig,
    pub api: Arc<dyn ApiClient>,
    pub sessions: Arc<SessionStore>,
    pub navigation: NavigationBus,
    pub catalog: Arc<CatalogService>,
    pub auth: AuthService,
    pub reviews: ReviewService,
}

impl AppState {
    /// 使用 HTTP 客户端与文件存储构建
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let api: Arc<dyn ApiClient> = Arc::new(HttpApiClient::new(&config.api)?);
        let storage: Arc<dyn SessionStorage> =
            Arc::new(FileStorage::new(config.storage.session_file.clone()));
        Ok(Self::with_components(config, api, storage))
    }

    /// 注入任意 API 客户端与存储（测试使用）
    pub fn with_components(
        config: AppConfig,
        api: Arc<dyn ApiClient>,
        storage: Arc<dyn SessionStorage>,
    ) -> Self {
        let sessions = Arc::new(SessionStore::open(storage));
        let navigation = NavigationBus::default();

        let catalog = Arc::new(CatalogService::new(api.clone()));
        let auth = AuthService::new(
            api.clone(),
            sessions.clone(),
            navigation.clone(),
            config.auth.clone(),
        );
        let reviews = ReviewService::new(api.clone());

        Self {
            config,
            api,
            sessions,
            navigation,
            catalog,
            auth,
            reviews,
        }
    }

    /// 为选中的车辆创建预订工作流
    pub fn booking_workflow(&self, vehicle: Vehicle) -> BookingWorkflow {
        BookingWorkflow::new(
            self.api.clone(),
            self.sessions.clone(),
            self.catalog.clone(),
            vehicle,
            &self.config.booking,
        )
    }
}
