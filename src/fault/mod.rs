// src/fault/mod.rs

//! Fault injection used to exercise crash recovery of the surrounding
//! execution environment.
//!
//! Three crash points exist, each armed by an environment variable holding a
//! host name. When the host identity of the running context matches, the task
//! reaching that point stops and the engine kills the parent process and the
//! current process:
//!
//! - `SPECTREE_TEST_SUBORDINATE_FAILURE`: a file task dies before reading.
//! - `SPECTREE_TEST_SUPERIOR_FAILURE`: the main task dies 100 ms after it has
//!   dispatched the directory task.
//! - `SPECTREE_TEST_SUPERIOR_COPY_FAILURE`: the directory task dies before
//!   scanning, optionally after sleeping `SPECTREE_TEST_SLEEP_FOR` seconds.
//!
//! With none of the variables set the hook is inert.

pub mod environment;

use std::fmt;
use std::time::Duration;

use tracing::{debug, warn};

pub use environment::{Environment, ProcessEnvironment};

pub const SUBORDINATE_FAILURE_VAR: &str = "SPECTREE_TEST_SUBORDINATE_FAILURE";
pub const SUPERIOR_FAILURE_VAR: &str = "SPECTREE_TEST_SUPERIOR_FAILURE";
pub const SUPERIOR_COPY_FAILURE_VAR: &str = "SPECTREE_TEST_SUPERIOR_COPY_FAILURE";
pub const SLEEP_FOR_VAR: &str = "SPECTREE_TEST_SLEEP_FOR";

/// Delay between dispatching the directory task and killing the main task.
pub const SUPERIOR_FAILURE_DELAY: Duration = Duration::from_millis(100);

/// Named place in the pipeline where a crash can be simulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultPoint {
    /// A leaf doing file I/O dies mid fan-out.
    Subordinate,
    /// The coordinating root dies after spawning work, before reacting.
    Superior,
    /// The remotely placed copy of the coordinator dies before fanning out.
    SuperiorCopy,
}

impl fmt::Display for FaultPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaultPoint::Subordinate => f.write_str("subordinate"),
            FaultPoint::Superior => f.write_str("superior"),
            FaultPoint::SuperiorCopy => f.write_str("superior copy"),
        }
    }
}

/// Host names (and optional delay) read from the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FaultConfig {
    pub subordinate_failure: Option<String>,
    pub superior_failure: Option<String>,
    pub superior_copy_failure: Option<String>,
    pub sleep_for: Option<Duration>,
}

impl FaultConfig {
    pub fn from_env(env: &dyn Environment) -> Self {
        let host = |name: &str| env.var(name).filter(|value| !value.trim().is_empty());

        let sleep_for = env.var(SLEEP_FOR_VAR).and_then(|raw| match raw.trim().parse::<u64>() {
            Ok(seconds) => Some(Duration::from_secs(seconds)),
            Err(_) => {
                warn!(value = %raw, "ignoring {SLEEP_FOR_VAR}: not a number of seconds");
                None
            }
        });

        Self {
            subordinate_failure: host(SUBORDINATE_FAILURE_VAR),
            superior_failure: host(SUPERIOR_FAILURE_VAR),
            superior_copy_failure: host(SUPERIOR_COPY_FAILURE_VAR),
            sleep_for,
        }
    }

    fn host_for(&self, point: FaultPoint) -> Option<&str> {
        match point {
            FaultPoint::Subordinate => self.subordinate_failure.as_deref(),
            FaultPoint::Superior => self.superior_failure.as_deref(),
            FaultPoint::SuperiorCopy => self.superior_copy_failure.as_deref(),
        }
    }
}

/// What the engine must do once a task hit an armed fault point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrashPlan {
    pub point: FaultPoint,
    pub host: String,
    /// Wait this long before killing anything.
    pub delay: Duration,
}

/// Decides whether a fault point is armed for the current host.
#[derive(Debug, Clone, Default)]
pub struct FaultHook {
    config: FaultConfig,
}

impl FaultHook {
    pub fn new(config: FaultConfig) -> Self {
        Self { config }
    }

    /// A hook that never fires.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Return a crash plan if `point` is armed for the host `env` runs on.
    pub fn arm(&self, point: FaultPoint, env: &dyn Environment) -> Option<CrashPlan> {
        let wanted = self.config.host_for(point)?;
        let host = env.host_identity();
        if host != wanted {
            debug!(%point, %host, wanted, "fault point armed for another host");
            return None;
        }

        let delay = match point {
            FaultPoint::Subordinate => Duration::ZERO,
            FaultPoint::Superior => SUPERIOR_FAILURE_DELAY,
            FaultPoint::SuperiorCopy => self.config.sleep_for.unwrap_or(Duration::ZERO),
        };

        Some(CrashPlan { point, host, delay })
    }
}
