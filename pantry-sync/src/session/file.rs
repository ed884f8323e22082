//! FileSessionStore - 持久化的当前会话
//!
//! 文件路径: `{work_dir}/session.json`。登录时写入，登出时删除，重启后仍然有效。

use std::path::{Path, PathBuf};

use shared::models::UserSession;

use super::{SessionError, SessionProvider};

/// 会话文件存储
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    file_path: PathBuf,
}

impl FileSessionStore {
    pub const FILE_NAME: &'static str = "session.json";

    /// 会话文件位于 `work_dir` 下
    pub fn new(work_dir: &Path) -> Self {
        Self {
            file_path: work_dir.join(Self::FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// 登录成功后保存会话
    pub fn save_user(&self, session: &UserSession) -> Result<(), SessionError> {
        if let Some(parent) = self.file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(session)?;
        let tmp = self.file_path.with_extension("json.tmp");
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, &self.file_path)?;
        tracing::info!(user = %session.id, "Session saved");
        Ok(())
    }

    /// 读取会话；文件缺失或损坏都视为未登录
    pub fn load(&self) -> Option<UserSession> {
        let content = match std::fs::read_to_string(&self.file_path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %self.file_path.display(), error = %e, "Failed to read session file");
                return None;
            }
        };
        match serde_json::from_str::<UserSession>(&content) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!(path = %self.file_path.display(), error = %e, "Malformed session file");
                None
            }
        }
    }

    /// 登出：删除会话文件
    pub fn logout(&self) -> Result<(), SessionError> {
        match std::fs::remove_file(&self.file_path) {
            Ok(()) => {
                tracing::info!("Session cleared");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl SessionProvider for FileSessionStore {
    fn current_user(&self) -> Option<UserSession> {
        self.load()
    }
}
