//! Anti-forgery state tokens for the login redirect.
//!
//! Two modes are supported:
//! - per-session: a fresh random token per login, kept in a pending set
//!   with a TTL and mirrored into an `HttpOnly` cookie; each token is
//!   accepted once
//! - pinned: a single operator-supplied token compared by equality

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use gglance_providers::google::generate_state;
use tracing::debug;

/// Name of the cookie carrying the per-session state token.
pub const STATE_COOKIE: &str = "gglance_oauth_state";

/// Upper bound on unconsumed per-session tokens.
const MAX_PENDING_STATES: usize = 1024;

/// How state tokens are produced and checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateMode {
    /// Random token per login, valid once for `ttl`.
    PerSession {
        /// How long an issued token stays acceptable.
        ttl: Duration,
    },
    /// A fixed token.
    Pinned(String),
}

impl StateMode {
    /// Default lifetime of a per-session token.
    pub const DEFAULT_TTL: Duration = Duration::from_secs(600);
}

impl Default for StateMode {
    fn default() -> Self {
        Self::PerSession {
            ttl: Self::DEFAULT_TTL,
        }
    }
}

/// Why a callback's state was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateRejection {
    /// No `state` query parameter.
    Missing,
    /// The query value differs from the expected one.
    Mismatch,
    /// Per-session mode and the browser sent no state cookie.
    MissingCookie,
    /// Never issued, or already consumed.
    Unknown,
    /// Issued but older than the TTL.
    Expired,
}

impl StateRejection {
    /// Returns a short label for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::Mismatch => "mismatch",
            Self::MissingCookie => "missing_cookie",
            Self::Unknown => "unknown",
            Self::Expired => "expired",
        }
    }
}

/// Issues and verifies state tokens.
#[derive(Debug)]
pub struct StateGuard {
    mode: StateMode,
    pending: Mutex<HashMap<String, Instant>>,
}

impl StateGuard {
    /// Creates a guard for the given mode.
    pub fn new(mode: StateMode) -> Self {
        Self {
            mode,
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Returns true if tokens must be echoed through the state cookie.
    pub fn uses_cookie(&self) -> bool {
        matches!(self.mode, StateMode::PerSession { .. })
    }

    /// Returns a state token for a new login attempt.
    pub fn issue(&self) -> String {
        match &self.mode {
            StateMode::Pinned(value) => value.clone(),
            StateMode::PerSession { ttl } => {
                let token = generate_state();
                let mut pending = self.lock();
                pending.retain(|_, issued| issued.elapsed() < *ttl);
                if pending.len() >= MAX_PENDING_STATES
                    && let Some(oldest) = pending
                        .iter()
                        .min_by_key(|(_, issued)| **issued)
                        .map(|(k, _)| k.clone())
                {
                    pending.remove(&oldest);
                }
                pending.insert(token.clone(), Instant::now());
                debug!(pending = pending.len(), "issued state token");
                token
            }
        }
    }

    /// Checks the `state` returned by the provider.
    ///
    /// `cookie` is the value of [`STATE_COOKIE`] sent by the browser, if
    /// any. In per-session mode a successful check consumes the token.
    pub fn verify(&self, received: Option<&str>, cookie: Option<&str>) -> Result<(), StateRejection> {
        let received = received.ok_or(StateRejection::Missing)?;

        match &self.mode {
            StateMode::Pinned(expected) => {
                if received == expected {
                    Ok(())
                } else {
                    Err(StateRejection::Mismatch)
                }
            }
            StateMode::PerSession { ttl } => {
                let cookie = cookie.ok_or(StateRejection::MissingCookie)?;
                if cookie != received {
                    return Err(StateRejection::Mismatch);
                }
                let issued = self
                    .lock()
                    .remove(received)
                    .ok_or(StateRejection::Unknown)?;
                if issued.elapsed() >= *ttl {
                    return Err(StateRejection::Expired);
                }
                Ok(())
            }
        }
    }

    /// Returns the number of issued, unconsumed tokens.
    #[cfg(test)]
    pub(crate) fn pending_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Instant>> {
        // The map holds no invariants a panic could break.
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }
}
