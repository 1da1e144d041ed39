//! Cyrene 租车预订客户端库
//! 会话存储、车队目录、预订与认证工作流

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod navigation;
pub mod repository;
pub mod services;
pub mod state;
pub mod telemetry;
