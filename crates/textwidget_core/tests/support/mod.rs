#![allow(dead_code)]

use std::cell::Cell;
use textwidget_core::{Clock, KeyValueStore, StoreError, StoreResult};

/// Clock returning a settable instant.
pub struct FixedClock {
    now: Cell<i64>,
}

impl FixedClock {
    pub fn at(now: i64) -> Self {
        Self {
            now: Cell::new(now),
        }
    }

    pub fn set(&self, now: i64) {
        self.now.set(now);
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.now.get()
    }
}

/// Store whose reads see `value` and whose writes always fail.
pub struct ReadOnlyStore {
    pub value: Option<String>,
}

impl KeyValueStore for ReadOnlyStore {
    fn namespace(&self) -> &str {
        "read.only"
    }

    fn get(&self, _key: &str) -> StoreResult<Option<String>> {
        Ok(self.value.clone())
    }

    fn set(&self, _key: &str, _value: &str) -> StoreResult<()> {
        Err(StoreError::InvalidData("disk full".to_string()))
    }

    fn remove(&self, _key: &str) -> StoreResult<bool> {
        Err(StoreError::InvalidData("disk full".to_string()))
    }
}
