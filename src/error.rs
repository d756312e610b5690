use thiserror::Error;

#[derive(Debug, Error)]
pub enum CleanupError {
    /// 运行中内核的 release 无法解析出简化版本
    #[error("Unexpected (non Ubuntu?) Linux version: {platform}")]
    KernelVersion { platform: String },

    #[error("{command} failed (exit={code:?}): {stderr}")]
    Query {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("unknown package: {0}")]
    UnknownPackage(String),

    #[error("{command} failed to commit changes (exit={code:?})")]
    Commit { command: String, code: Option<i32> },
}
