use crate::storage::{Change, JsonDocument, StorageError};
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Last permitted request per session.
pub type Ledger = BTreeMap<String, DateTime<Utc>>;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Permitted,
    Throttled { retry_after: Duration },
}

/// Allows one request per session per cooldown, tracked in a persisted ledger.
#[derive(Clone)]
pub struct RateLimiter {
    ledger: JsonDocument<Ledger>,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    pub fn new(ledger: JsonDocument<Ledger>, clock: Arc<dyn Clock>) -> Self {
        Self { ledger, clock }
    }

    /// Throttles `session` if it was last permitted less than `cooldown` ago,
    /// otherwise records the current time for it.
    pub async fn check_and_record(
        &self,
        session: &str,
        cooldown: Duration,
    ) -> Result<Permission, StorageError> {
        let cooldown = TimeDelta::from_std(cooldown).unwrap_or(TimeDelta::MAX);

        let permission = self
            .ledger
            .update(|ledger| {
                let now = self.clock.now();
                if let Some(last) = ledger.get(session) {
                    let elapsed = now.signed_duration_since(*last);
                    if elapsed < cooldown {
                        let retry_after = (cooldown - elapsed).to_std().unwrap_or_default();
                        return Change::Discard(Permission::Throttled { retry_after });
                    }
                }
                ledger.insert(session.to_string(), now);
                Change::Commit(Permission::Permitted)
            })
            .await?;

        match permission {
            Permission::Permitted => debug!("Session {session:?} permitted"),
            Permission::Throttled { retry_after } => info!(
                "Session {session:?} throttled for another {}s",
                retry_after.as_secs()
            ),
        }
        Ok(permission)
    }
}
