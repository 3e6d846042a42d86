//! Multicast output sinks

use std::fmt;

/// A list of listeners invoked in connection order on every emission
pub struct Signal<T> {
    slots: Vec<Box<dyn FnMut(T)>>,
}

impl<T: Clone> Signal<T> {
    /// Create a signal with no listeners
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Add a listener
    pub fn connect<F>(&mut self, slot: F)
    where
        F: FnMut(T) + 'static,
    {
        self.slots.push(Box::new(slot));
    }

    /// Invoke every listener with `value`
    pub fn emit(&mut self, value: T) {
        for slot in &mut self.slots {
            slot(value.clone());
        }
    }

    /// Number of connected listeners
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if nothing is connected
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl<T: Clone> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("listeners", &self.slots.len())
            .finish()
    }
}
