use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::{PopError, Result, TargetHandle};

/// Shared, thread-safe queue of strike notifications.
///
/// A physics layer running elsewhere pushes struck handles; the scheduler
/// drains the queue at the start of every tick.
#[derive(Clone, Default)]
pub struct StrikeInbox {
    shared: Arc<Mutex<VecDeque<TargetHandle>>>,
}

impl StrikeInbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, target: TargetHandle) -> Result<()> {
        self.lock()?.push_back(target);
        Ok(())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.is_empty())
    }

    /// Removes and returns every pending strike in arrival order.
    pub fn drain(&self) -> Result<Vec<TargetHandle>> {
        Ok(self.lock()?.drain(..).collect())
    }

    fn lock(&self) -> Result<MutexGuard<'_, VecDeque<TargetHandle>>> {
        self.shared
            .lock()
            .map_err(|_| PopError::msg("strike inbox has been poisoned"))
    }
}

impl std::fmt::Debug for StrikeInbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrikeInbox").finish()
    }
}
