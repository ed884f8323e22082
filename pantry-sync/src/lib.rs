//! Pantry Sync - 食材库存同步与临期提醒核心
//!
//! # 架构概述
//!
//! - **存储** (`store`): 远端文档存储抽象，内存 / HTTP 两种后端
//! - **仓库** (`repository`): 按用户命名空间的 CRUD 与实时订阅
//! - **会话** (`session`): 当前用户 → 集合命名空间
//! - **调度** (`scheduler`): 唯一命名的持久化周期作业
//! - **临期扫描** (`expiry`): 周期扫描 + 通知分发
//! - **菜谱** (`recipes`): AI 文本生成
//!
//! # 模块结构
//!
//! ```text
//! pantry-sync/src/
//! ├── core/          # 配置、后台任务、组件装配
//! ├── store/         # RemoteStore: MemoryStore / HttpStore
//! ├── repository/    # CollectionRepository, Subscription, PantryRepository
//! ├── inventory/     # 前台实时视图 (搜索、分组)
//! ├── session/       # FileSessionStore, UserScope
//! ├── scheduler/     # JobScheduler, JobRegistry, BatteryProbe
//! ├── expiry/        # ExpiryScanner
//! ├── notify/        # NotificationDispatcher, Notifier
//! ├── recipes/       # RecipeService, GeminiGenerator
//! └── utils/         # 日志、时钟
//! ```

pub mod core;
pub mod expiry;
pub mod inventory;
pub mod notify;
pub mod recipes;
pub mod repository;
pub mod scheduler;
pub mod session;
pub mod store;
pub mod utils;

// Re-export 公共类型
pub use crate::core::{Config, PantrySync};
pub use expiry::{ExpiryScanner, ScanOutcome};
pub use inventory::{InventoryView, LiveInventory};
pub use notify::{Notification, NotificationDispatcher, Notifier};
pub use repository::{CollectionRepository, PantryRepository, Subscription, SubscriptionEvent};
pub use session::{FileSessionStore, SessionProvider, UserScope};
pub use store::{HttpStore, MemoryStore, RemoteStore};
pub use utils::{AppError, AppResult, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// 加载 .env 并初始化日志
pub fn setup_environment() -> Config {
    // .env is optional
    let _ = dotenv::dotenv();
    let config = Config::from_env();
    init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref());
    config
}
