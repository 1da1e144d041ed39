//! 数据模型模块
//! 与远端 API 交互的请求/响应结构，以及客户端本地表单

pub mod auth;
pub mod booking;
pub mod review;
pub mod user;
pub mod vehicle;
