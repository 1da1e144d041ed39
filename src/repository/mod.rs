//! Durable client-side storage layer
//!
//! 会话以两个固定键持久化，语义与浏览器 localStorage 相同：
//! 任一键缺失都视为未登录。

pub mod file_repo;
pub mod memory_repo;

pub use file_repo::FileStorage;
pub use memory_repo::MemoryStorage;

use crate::error::Result;

/// 用户身份（JSON）的存储键
pub const USER_KEY: &str = "user";

/// 令牌的存储键
pub const TOKEN_KEY: &str = "token";

/// 键值存储接口
///
/// 批量写入/删除必须是原子的：读者要么看到整批结果，要么看到之前的状态。
pub trait SessionStorage: Send + Sync {
    /// 读取单个键
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// 原子写入多个键
    fn set_all(&self, entries: &[(&str, &str)]) -> Result<()>;

    /// 原子删除多个键，键不存在不报错
    fn remove_all(&self, keys: &[&str]) -> Result<()>;
}
