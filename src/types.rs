use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Where a task executes relative to the task that spawned it, and where a
/// commit is reported.
///
/// - `Local`: same execution context, scheduled synchronously, no
///   serialization.
/// - `Remote`: another execution context; state is serialized and copied
///   across the boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    #[default]
    Local,
    Remote,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Local => f.write_str("local"),
            Target::Remote => f.write_str("remote"),
        }
    }
}

impl FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(Target::Local),
            "remote" => Ok(Target::Remote),
            other => Err(format!(
                "invalid placement target: {other} (expected \"local\" or \"remote\")"
            )),
        }
    }
}
