//! 导航事件与延迟跳转
//!
//! 工作流不直接操作视图，只向 `NavigationBus` 发布 `Route`。
//! 延迟跳转由 `ScheduledRedirect` 持有，句柄被丢弃时定时器随之取消。

use std::fmt;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::services::session_service::Session;

/// 站点路由
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Booking,
    Fleet,
    Reviews,
    Contact,
    Login,
    Signup,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Booking => "/booking",
            Route::Fleet => "/fleet",
            Route::Reviews => "/reviews",
            Route::Contact => "/contact",
            Route::Login => "/login",
            Route::Signup => "/signup",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// 导航事件总线
#[derive(Clone)]
pub struct NavigationBus {
    sender: broadcast::Sender<Route>,
}

impl NavigationBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// 发布跳转；没有订阅者时静默丢弃
    pub fn navigate(&self, route: Route) {
        if self.sender.send(route).is_err() {
            tracing::debug!(route = %route, "Navigation dropped: no active view");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Route> {
        self.sender.subscribe()
    }
}

impl Default for NavigationBus {
    fn default() -> Self {
        Self::new(16)
    }
}

/// 已排期的延迟跳转，丢弃即取消
pub struct ScheduledRedirect {
    route: Route,
    handle: JoinHandle<()>,
}

impl ScheduledRedirect {
    /// 在 `delay` 之后向总线发布 `route`
    pub fn schedule(bus: &NavigationBus, route: Route, delay: Duration) -> Self {
        let bus = bus.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            bus.navigate(route);
        });
        tracing::debug!(route = %route, delay_ms = delay.as_millis() as u64, "Redirect scheduled");
        Self { route, handle }
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn cancel(self) {
        // Drop 负责 abort
    }
}

impl Drop for ScheduledRedirect {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

impl fmt::Debug for ScheduledRedirect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduledRedirect")
            .field("route", &self.route)
            .field("finished", &self.handle.is_finished())
            .finish()
    }
}

/// 菜单动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Navigate(Route),
    Logout,
}

/// 菜单项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub label: &'static str,
    pub action: MenuAction,
}

impl MenuItem {
    fn link(label: &'static str, route: Route) -> Self {
        Self {
            label,
            action: MenuAction::Navigate(route),
        }
    }
}

/// 根据当前会话生成导航菜单
pub fn menu_items(session: Option<&Session>) -> Vec<MenuItem> {
    let mut items = vec![
        MenuItem::link("Home", Route::Home),
        MenuItem::link("Book", Route::Booking),
        MenuItem::link("Fleet", Route::Fleet),
        MenuItem::link("Reviews", Route::Reviews),
        MenuItem::link("Contact", Route::Contact),
    ];

    match session {
        Some(_) => items.push(MenuItem {
            label: "Logout",
            action: MenuAction::Logout,
        }),
        None => {
            items.push(MenuItem::link("Login", Route::Login));
            items.push(MenuItem::link("Sign Up", Route::Signup));
        }
    }

    items
}
