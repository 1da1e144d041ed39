//! 会话服务：当前登录身份的唯一来源

use secrecy::{ExposeSecret, Secret};
use std::fmt;
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

use crate::models::auth::clone_secret;
use crate::models::user::User;
use crate::repository::{SessionStorage, TOKEN_KEY, USER_KEY};

/// 已认证会话：用户与令牌总是同时存在
pub struct Session {
    pub user: User,
    pub token: Secret<String>,
}

impl Session {
    pub fn new(user: User, token: Secret<String>) -> Self {
        Self { user, token }
    }
}

impl Clone for Session {
    fn clone(&self) -> Self {
        Self {
            user: self.user.clone(),
            token: clone_secret(&self.token),
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// 会话存储
///
/// 内存状态是唯一真相；持久化失败只记录日志，不阻塞内存状态变化。
pub struct SessionStore {
    storage: Arc<dyn SessionStorage>,
    current: RwLock<Option<Session>>,
}

impl SessionStore {
    /// 创建并从持久化存储恢复一次
    pub fn open(storage: Arc<dyn SessionStorage>) -> Self {
        let current = Self::hydrate(storage.as_ref());
        Self {
            storage,
            current: RwLock::new(current),
        }
    }

    /// 从存储恢复会话；任何缺失或损坏都视为未登录
    fn hydrate(storage: &dyn SessionStorage) -> Option<Session> {
        let user_json = match storage.get(USER_KEY) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Failed to read persisted user, starting logged out");
                return None;
            }
        };
        let token = match storage.get(TOKEN_KEY) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Failed to read persisted token, starting logged out");
                return None;
            }
        };

        match (user_json, token) {
            (Some(user_json), Some(token)) if !token.is_empty() => {
                match serde_json::from_str::<User>(&user_json) {
                    Ok(user) => {
                        debug!(user_id = %user.id, "Session restored from storage");
                        Some(Session::new(user, Secret::new(token)))
                    }
                    Err(e) => {
                        warn!(error = %e, "Failed to parse persisted user, starting logged out");
                        None
                    }
                }
            }
            (None, None) => None,
            _ => {
                warn!("Persisted session is incomplete, starting logged out");
                None
            }
        }
    }

    /// 登录：原子写入两个键并更新内存状态
    pub fn login(&self, user: User, token: Secret<String>) {
        match serde_json::to_string(&user) {
            Ok(user_json) => {
                let entries = [
                    (USER_KEY, user_json.as_str()),
                    (TOKEN_KEY, token.expose_secret().as_str()),
                ];
                if let Err(e) = self.storage.set_all(&entries) {
                    warn!(error = %e, "Failed to persist session; it will last for this run only");
                }
            }
            Err(e) => warn!(error = %e, "Failed to encode user for persistence"),
        }

        info!(user_id = %user.id, "User logged in");
        *self.write() = Some(Session::new(user, token));
    }

    /// 登出：幂等，未登录时调用为空操作
    pub fn logout(&self) {
        let previous = self.write().take();

        if let Err(e) = self.storage.remove_all(&[USER_KEY, TOKEN_KEY]) {
            warn!(error = %e, "Failed to clear persisted session");
        }

        if let Some(session) = previous {
            info!(user_id = %session.user.id, "User logged out");
        }
    }

    /// 当前会话（同步读取内存状态）
    pub fn current_user(&self) -> Option<Session> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Option<Session>> {
        self.current.write().unwrap_or_else(|e| e.into_inner())
    }
}
