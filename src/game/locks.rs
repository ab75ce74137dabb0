// src/game/locks.rs — Per-conversation serialization
//
// Each conversation id maps to its own async mutex. Operations on the same
// key run one at a time; different keys never wait on each other. Entries
// are dropped from the map when the last guard or waiter goes away.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::OwnedMutexGuard;

type Slot = Arc<tokio::sync::Mutex<()>>;

#[derive(Default)]
pub struct KeyLocks {
    slots: Arc<Mutex<HashMap<String, Slot>>>,
}

impl KeyLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `key`.
    pub async fn lock(&self, key: &str) -> KeyGuard {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
            slots
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
                .clone()
        };
        let guard = slot.clone().lock_owned().await;
        KeyGuard {
            key: key.to_string(),
            slots: self.slots.clone(),
            slot: Some(slot),
            guard: Some(guard),
        }
    }

    /// Number of keys currently tracked.
    pub fn len(&self) -> usize {
        self.slots.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct KeyGuard {
    key: String,
    slots: Arc<Mutex<HashMap<String, Slot>>>,
    slot: Option<Slot>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for KeyGuard {
    fn drop(&mut self) {
        // Release the async lock first so its Arc reference is gone.
        self.guard.take();
        let Some(slot) = self.slot.take() else {
            return;
        };
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        // One reference here, one in the map: nobody else is waiting.
        if Arc::strong_count(&slot) == 2 {
            slots.remove(&self.key);
        }
    }
}
