use crate::models::QuotaStatus;
use std::sync::atomic::{AtomicU32, Ordering};

/// Global budget on calls to the external classification backend.
///
/// Shared across all organisations, not partitioned. The counter uses a
/// compare-and-increment so the configured maximum is a hard cap even under
/// concurrent classification requests.
#[derive(Debug)]
pub struct ClassificationQuota {
    used: AtomicU32,
    max: u32,
}

impl ClassificationQuota {
    pub fn new(max: u32) -> Self {
        Self {
            used: AtomicU32::new(0),
            max,
        }
    }

    /// Claim one unit of quota; false once the maximum is reached
    pub fn try_acquire(&self) -> bool {
        self.used
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |used| {
                if used < self.max {
                    Some(used + 1)
                } else {
                    None
                }
            })
            .is_ok()
    }

    pub fn status(&self) -> QuotaStatus {
        let used = self.used.load(Ordering::SeqCst).min(self.max);
        QuotaStatus {
            used,
            max: self.max,
            remaining: self.max - used,
            exhausted: used >= self.max,
        }
    }
}
