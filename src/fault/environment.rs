// src/fault/environment.rs

//! Process-level facts the fault hook depends on.
//!
//! Only the fault hook talks to this trait: it needs the identity of the host
//! the current execution context runs on, access to environment variables,
//! and a way to kill the parent process and the current process.

use std::fmt::Debug;

/// Abstract view of the hosting process.
pub trait Environment: Send + Sync + Debug {
    /// Host name used to match the fault-injection variables.
    fn host_identity(&self) -> String;

    /// Read an environment variable.
    fn var(&self, name: &str) -> Option<String>;

    /// Abruptly terminate the parent process.
    fn terminate_parent(&self);

    /// Abruptly terminate the current process.
    ///
    /// The production implementation never returns.
    fn terminate_self(&self);
}

/// The real process environment.
#[derive(Debug, Clone)]
pub struct ProcessEnvironment {
    host: String,
}

impl ProcessEnvironment {
    /// Resolve the host name once at startup.
    pub fn detect() -> Self {
        let host = hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| "localhost".to_string());
        Self { host }
    }
}

impl Environment for ProcessEnvironment {
    fn host_identity(&self) -> String {
        self.host.clone()
    }

    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }

    fn terminate_parent(&self) {
        #[cfg(unix)]
        unsafe {
            libc::kill(libc::getppid(), libc::SIGKILL);
        }
    }

    fn terminate_self(&self) {
        #[cfg(unix)]
        unsafe {
            libc::kill(libc::getpid(), libc::SIGKILL);
        }
        std::process::abort();
    }
}
