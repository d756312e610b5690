use crate::error::CleanupError;
use crate::version::SimpleVersion;
use std::ffi::CStr;

/// 运行中内核的 uname 信息
#[derive(Debug, Clone)]
pub struct SystemInfo {
    pub sysname: String,
    /// 内核 release，如 `5.4.0-42-generic`
    pub release: String,
    pub machine: String,
}

impl SystemInfo {
    /// 通过 uname(2) 获取，失败时退回 `uname` 命令
    pub fn detect() -> Self {
        Self::from_syscall().unwrap_or_else(|| Self {
            sysname: Self::run_cmd("uname", &["-s"]),
            release: Self::run_cmd("uname", &["-r"]),
            machine: Self::run_cmd("uname", &["-m"]),
        })
    }

    fn from_syscall() -> Option<Self> {
        let mut uts: libc::utsname = unsafe { std::mem::zeroed() };
        if unsafe { libc::uname(&mut uts) } != 0 {
            return None;
        }
        let field = |raw: &[libc::c_char]| unsafe {
            CStr::from_ptr(raw.as_ptr()).to_string_lossy().into_owned()
        };
        Some(Self {
            sysname: field(&uts.sysname),
            release: field(&uts.release),
            machine: field(&uts.machine),
        })
    }

    fn run_cmd(cmd: &str, args: &[&str]) -> String {
        duct::cmd(cmd, args)
            .stderr_null()
            .read()
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|_| "unknown".to_string())
    }

    /// 平台描述，如 `Linux-5.4.0-42-generic-x86_64`
    pub fn platform(&self) -> String {
        format!("{}-{}-{}", self.sysname, self.release, self.machine)
    }

    /// 从内核 release 的第一个词中提取简化版本
    pub fn kernel_version(&self) -> Result<SimpleVersion, CleanupError> {
        self.release
            .split_whitespace()
            .next()
            .and_then(SimpleVersion::extract)
            .ok_or_else(|| CleanupError::KernelVersion {
                platform: self.platform(),
            })
    }
}
