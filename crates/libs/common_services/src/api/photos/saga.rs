use crate::alert;
use crate::storage::{ObjectStore, validate_key};
use app_state::BucketSettings;
use common_types::PhotoUploadRequest;
use std::fmt;
use tracing::{debug, info};

/// Undo action for one object an upload batch may have written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compensation {
    pub bucket: String,
    pub key: String,
}

impl fmt::Display for Compensation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "delete {}/{}", self.bucket, self.key)
    }
}

/// Rollback plan for an upload batch.
///
/// Compensations are registered up front for the image and thumbnail of every item in the
/// batch, so a rollback leaves none of the batch's ids behind no matter where it failed.
#[derive(Debug)]
pub struct Saga {
    compensations: Vec<Compensation>,
    uploaded: Vec<Compensation>,
}

impl Saga {
    #[must_use]
    pub fn for_batch(batch: &[PhotoUploadRequest], buckets: &BucketSettings) -> Self {
        let compensations = batch
            .iter()
            .filter(|item| validate_key(&item.id).is_ok())
            .flat_map(|item| {
                [&buckets.images, &buckets.thumbnails].map(|bucket| Compensation {
                    bucket: bucket.clone(),
                    key: item.id.clone(),
                })
            })
            .collect();

        Self {
            compensations,
            uploaded: vec![],
        }
    }

    /// Notes an object that was written. Only used for logging.
    pub fn record_upload(&mut self, bucket: &str, key: &str) {
        self.uploaded.push(Compensation {
            bucket: bucket.to_string(),
            key: key.to_string(),
        });
    }

    /// The rollback, last batch item first.
    pub fn compensations(&self) -> impl Iterator<Item = &Compensation> {
        self.compensations.iter().rev()
    }

    /// Runs every compensation. Failures are logged and do not stop the rollback.
    /// Returns the number of compensations that failed.
    pub async fn compensate(self, store: &dyn ObjectStore) -> usize {
        info!(
            "Rolling back upload batch ({} objects written so far)",
            self.uploaded.len()
        );
        let mut failures = 0;
        for compensation in self.compensations() {
            debug!("Rollback: {compensation}");
            if let Err(e) = store
                .delete(&compensation.bucket, &compensation.key)
                .await
            {
                failures += 1;
                alert!("Rollback step '{compensation}' failed: {e}");
            }
        }
        failures
    }
}
