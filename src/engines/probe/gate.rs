use std::sync::{Condvar, Mutex};

/// Single-use synchronization gate.
///
/// Starts closed; `open` releases every current and future waiter and is
/// idempotent. Workers signal "reached target depth" through one gate per
/// iteration, and heavyweight workers park on the shared release gate inside
/// their evolution predicate.
pub struct Gate {
    opened: Mutex<bool>,
    signal: Condvar,
}

impl Gate {
    pub fn new() -> Self {
        Self {
            opened: Mutex::new(false),
            signal: Condvar::new(),
        }
    }

    /// Open the gate, waking all waiters. Subsequent calls are no-ops.
    pub fn open(&self) {
        let mut opened = self.opened.lock().unwrap();
        if !*opened {
            *opened = true;
            self.signal.notify_all();
        }
    }

    /// Block until the gate is opened. Returns immediately if already open.
    pub fn wait(&self) {
        let mut opened = self.opened.lock().unwrap();
        while !*opened {
            opened = self.signal.wait(opened).unwrap();
        }
    }

    pub fn is_open(&self) -> bool {
        *self.opened.lock().unwrap()
    }
}

impl Default for Gate {
    fn default() -> Self {
        Self::new()
    }
}
