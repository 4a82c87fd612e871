//! View mount tracking.
//!
//! Every mounted view holds a [`MountToken`]. Mounting the next view
//! invalidates all earlier tokens, so a response that lands after its
//! view was torn down can be recognized and dropped.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Default)]
pub struct Mounts {
    current: Arc<AtomicU64>,
}

impl Mounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount a new view, tearing down whichever view held the last token.
    pub fn mount(&self) -> MountToken {
        let generation = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        MountToken {
            current: self.current.clone(),
            generation,
        }
    }

    /// Tear down the active view without mounting another.
    #[cfg(test)]
    pub fn unmount(&self) {
        self.current.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone)]
pub struct MountToken {
    current: Arc<AtomicU64>,
    generation: u64,
}

impl MountToken {
    pub fn is_live(&self) -> bool {
        self.current.load(Ordering::SeqCst) == self.generation
    }
}
