//! 后台任务管理
//!
//! 统一管理调度器拥有的后台任务：注册、panic 捕获、健康检查与关闭。
//!
//! 每个周期作业一个执行循环，按作业名登记。Subscriptions own their consumer
//! task directly (see `repository::Subscription`), so they are not registered here.

use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

struct RegisteredTask {
    name: String,
    handle: JoinHandle<()>,
}

/// 后台任务管理器
///
/// ```ignore
/// let mut tasks = BackgroundTasks::new();
/// let token = tasks.shutdown_token();
/// tasks.spawn("expiry_check_work", async move {
///     token.cancelled().await;
/// });
/// tasks.shutdown(Duration::from_secs(5)).await;
/// ```
pub struct BackgroundTasks {
    tasks: Vec<RegisteredTask>,
    /// 全局取消令牌
    shutdown: CancellationToken,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            shutdown: CancellationToken::new(),
        }
    }

    /// 获取取消令牌（任务内部监听 shutdown 信号）
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// 注册并启动一个后台任务
    ///
    /// 任务被包装以捕获 panic。
    pub fn spawn<F>(&mut self, name: impl Into<String>, future: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let name = name.into();
        let task_name = name.clone();
        let token = self.shutdown.clone();

        let wrapped_future = async move {
            let result = AssertUnwindSafe(future).catch_unwind().await;
            match result {
                Ok(()) => {
                    tracing::debug!(task = %task_name, cancelled = token.is_cancelled(), "Background task stopped");
                }
                Err(panic_info) => {
                    let panic_msg: String = if let Some(s) = panic_info.downcast_ref::<&str>() {
                        (*s).to_string()
                    } else if let Some(s) = panic_info.downcast_ref::<String>() {
                        s.clone()
                    } else {
                        "Unknown panic".to_string()
                    };
                    tracing::error!(
                        task = %task_name,
                        panic = %panic_msg,
                        "Background task panicked"
                    );
                }
            }
        };

        let handle = tokio::spawn(wrapped_future);
        tracing::debug!(task = %name, "Registered background task");
        self.tasks.push(RegisteredTask { name, handle });
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// 同名任务是否仍在运行
    ///
    /// 已结束（含 panic）的任务会先被清除，调用方可以重新 spawn。
    pub fn is_running(&mut self, name: &str) -> bool {
        self.prune_finished();
        self.tasks.iter().any(|t| t.name == name)
    }

    /// 注销一个任务（不取消）。任务自行退出前调用，避免被健康检查计为异常。
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.name != name);
        self.tasks.len() != before
    }

    /// 检查所有任务健康状态
    ///
    /// 返回已经结束的任务数量；这些任务随后被清除。
    pub fn check_health(&mut self) -> usize {
        let finished = self.prune_finished();
        if finished > 0 {
            tracing::error!(failed = finished, remaining = self.tasks.len(), "Background task health check failed");
        }
        finished
    }

    fn prune_finished(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|task| {
            let finished = task.handle.is_finished();
            if finished {
                tracing::error!(task = %task.name, "Background task finished early");
            }
            !finished
        });
        before - self.tasks.len()
    }

    /// Graceful shutdown - 取消所有任务并等待完成
    ///
    /// 超过 `grace` 仍未结束的任务会被 abort。
    pub async fn shutdown(self, grace: Duration) {
        tracing::info!("Shutting down {} background tasks...", self.tasks.len());
        self.shutdown.cancel();

        for task in self.tasks {
            let abort = task.handle.abort_handle();
            match tokio::time::timeout(grace, task.handle).await {
                Ok(Ok(())) => tracing::debug!(task = %task.name, "Task completed"),
                Ok(Err(e)) if e.is_cancelled() => tracing::debug!(task = %task.name, "Task cancelled"),
                Ok(Err(e)) => tracing::error!(task = %task.name, error = ?e, "Task panicked"),
                Err(_) => {
                    tracing::warn!(task = %task.name, "Task did not stop in time, aborting");
                    abort.abort();
                }
            }
        }

        tracing::info!("All background tasks stopped");
    }
}

impl Default for BackgroundTasks {
    fn default() -> Self {
        Self::new()
    }
}
