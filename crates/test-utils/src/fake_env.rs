use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use spectree::fault::Environment;

/// What a fake environment was asked to kill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Parent,
    Current,
}

/// Environment with a fixed host name and variables, which records
/// terminations instead of killing anything.
#[derive(Debug, Clone)]
pub struct FakeEnvironment {
    host: String,
    vars: HashMap<String, String>,
    terminations: Arc<Mutex<Vec<Termination>>>,
}

impl FakeEnvironment {
    pub fn new(host: &str) -> Self {
        Self {
            host: host.to_string(),
            vars: HashMap::new(),
            terminations: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_var(mut self, name: &str, value: &str) -> Self {
        self.vars.insert(name.to_string(), value.to_string());
        self
    }

    /// Terminations requested so far, across all clones.
    pub fn terminations(&self) -> Vec<Termination> {
        self.terminations.lock().unwrap().clone()
    }
}

impl Environment for FakeEnvironment {
    fn host_identity(&self) -> String {
        self.host.clone()
    }

    fn var(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }

    fn terminate_parent(&self) {
        self.terminations.lock().unwrap().push(Termination::Parent);
    }

    fn terminate_self(&self) {
        self.terminations.lock().unwrap().push(Termination::Current);
    }
}
