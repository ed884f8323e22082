use std::path::PathBuf;
use std::time::Duration;

/// 存储后端
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// 同进程内存存储（本地模式）
    Memory,
    /// REST 文档 API
    Http,
}

impl StoreBackend {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "memory" => Some(Self::Memory),
            "http" => Some(Self::Http),
            _ => None,
        }
    }
}

/// 同步核心配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 (会话文件、作业注册表) |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_DIR | (未设置) | 滚动日志目录 |
/// | STORE_BACKEND | memory | memory 或 http |
/// | STORE_URL | http://localhost:8080 | 文档 API 地址 |
/// | STORE_POLL_INTERVAL_SECS | 15 | 集合轮询间隔(秒) |
/// | REQUEST_TIMEOUT_MS | 10000 | 请求超时(毫秒) |
/// | EXPIRY_THRESHOLD_DAYS | 3 | 临期阈值(天) |
/// | SCAN_PERIOD_HOURS | 24 | 扫描周期(小时) |
/// | SCAN_INITIAL_DELAY_MINS | 60 | 首次扫描延迟(分钟) |
/// | SCAN_TIMEOUT_SECS | 600 | 单次扫描超时(秒) |
/// | GEMINI_API_KEY | (未设置) | 启用菜谱生成 |
/// | GEMINI_MODEL | gemini-2.5-flash | 生成模型 |
/// | GEMINI_TIMEOUT_SECS | 60 | 生成请求超时(秒) |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/tmp/pantry STORE_BACKEND=http cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录
    pub work_dir: String,
    pub log_level: String,
    pub log_dir: Option<String>,

    // === 存储 ===
    pub store_backend: StoreBackend,
    pub store_url: String,
    pub store_poll_interval_secs: u64,
    /// 请求超时时间 (毫秒)
    pub request_timeout_ms: u64,

    // === 临期扫描 ===
    pub expiry_threshold_days: i64,
    pub scan_period_hours: u64,
    pub scan_initial_delay_mins: u64,
    pub scan_timeout_secs: u64,

    // === 菜谱生成 ===
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    /// 生成请求超时 (秒)，独立于存储请求超时
    pub gemini_timeout_secs: u64,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 未设置或无法解析的变量使用默认值
    pub fn from_env() -> Self {
        let store_backend = match env_opt("STORE_BACKEND") {
            Some(raw) => StoreBackend::parse(&raw).unwrap_or_else(|| {
                tracing::warn!(value = %raw, "Unknown STORE_BACKEND, falling back to memory");
                StoreBackend::Memory
            }),
            None => StoreBackend::Memory,
        };

        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: env_opt("LOG_DIR"),

            store_backend,
            store_url: std::env::var("STORE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".into()),
            store_poll_interval_secs: env_or("STORE_POLL_INTERVAL_SECS", 15),
            request_timeout_ms: env_or("REQUEST_TIMEOUT_MS", 10_000),

            expiry_threshold_days: env_or("EXPIRY_THRESHOLD_DAYS", 3),
            scan_period_hours: env_or("SCAN_PERIOD_HOURS", 24),
            scan_initial_delay_mins: env_or("SCAN_INITIAL_DELAY_MINS", 60),
            scan_timeout_secs: env_or("SCAN_TIMEOUT_SECS", 600),

            gemini_api_key: env_opt("GEMINI_API_KEY"),
            gemini_model: std::env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-2.5-flash".into()),
            gemini_timeout_secs: env_or("GEMINI_TIMEOUT_SECS", 60),
        }
    }

    /// 使用自定义工作目录覆盖配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.store_backend = StoreBackend::Memory;
        config
    }

    pub fn work_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir)
    }

    /// 会话文件路径
    pub fn session_file(&self) -> PathBuf {
        self.work_path().join("session.json")
    }

    /// 作业注册表路径
    pub fn job_registry_file(&self) -> PathBuf {
        self.work_path().join("jobs.json")
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn gemini_timeout(&self) -> Duration {
        Duration::from_secs(self.gemini_timeout_secs.max(1))
    }

    pub fn store_poll_interval(&self) -> Duration {
        Duration::from_secs(self.store_poll_interval_secs.max(1))
    }

    pub fn scan_period(&self) -> Duration {
        Duration::from_secs(self.scan_period_hours.max(1) * 3600)
    }

    pub fn scan_initial_delay(&self) -> Duration {
        Duration::from_secs(self.scan_initial_delay_mins * 60)
    }

    pub fn scan_timeout(&self) -> Duration {
        Duration::from_secs(self.scan_timeout_secs.max(1))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
