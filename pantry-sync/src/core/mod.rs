//! 核心模块 - 配置与后台任务
//!
//! # 模块结构
//!
//! - [`Config`] - 环境变量配置
//! - [`PantrySync`] - 组件装配与生命周期
//! - [`BackgroundTasks`] - 后台任务注册与关闭

pub mod app;
pub mod config;
pub mod tasks;

pub use app::PantrySync;
pub use config::{Config, StoreBackend};
pub use tasks::BackgroundTasks;
