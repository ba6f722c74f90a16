//! Application-level session state
//!
//! Successful activation and login both end in `App::make_login`. The app is
//! resolved once at startup and passed to every flow that needs it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// Credentials returned by the server on activation or login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Login {
    pub name: String,
    pub sid: String,
}

/// The application object that owns login state
pub trait App: Send + Sync {
    fn make_login(&self, name: &str, sid: &str) -> anyhow::Result<()>;
}

impl<A: App> App for Arc<A> {
    fn make_login(&self, name: &str, sid: &str) -> anyhow::Result<()> {
        (**self).make_login(name, sid)
    }
}

/// Current login held by [`Session`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveLogin {
    pub login: Login,
    pub since: DateTime<Utc>,
}

/// In-memory session. Cheap to clone; clones share state.
#[derive(Debug, Clone, Default)]
pub struct Session {
    current: Arc<Mutex<Option<ActiveLogin>>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// The logged-in user, if any
    pub fn current(&self) -> Option<ActiveLogin> {
        self.current.lock().ok().and_then(|c| c.clone())
    }
}

impl App for Session {
    fn make_login(&self, name: &str, sid: &str) -> anyhow::Result<()> {
        if sid.is_empty() {
            anyhow::bail!("server returned an empty session id");
        }

        let mut current = self
            .current
            .lock()
            .map_err(|_| anyhow::anyhow!("session state poisoned"))?;
        *current = Some(ActiveLogin {
            login: Login {
                name: name.to_string(),
                sid: sid.to_string(),
            },
            since: Utc::now(),
        });

        tracing::info!("Logged in as {}", name);
        Ok(())
    }
}
