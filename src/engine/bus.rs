//! Hardware event bus
//!
//! A single-threaded listener registry standing between the MIDI transport
//! and the mappers. Each subscriber holds a [`Subscription`] handle; dropping
//! the handle removes the listener, so no listener outlives its owner.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// Receiver of decoded hardware events
///
/// Values are normalized to 0.0-1.0. Every method defaults to doing nothing.
pub trait MidiListener {
    /// A knob (control change) moved
    fn on_knob(&mut self, _channel: u8, _number: u8, _value: f32) {}

    /// A key was pressed
    fn on_note_on(&mut self, _channel: u8, _note: u8, _velocity: f32) {}

    /// A key was released
    fn on_note_off(&mut self, _channel: u8, _note: u8) {}
}

type ListenerRef = Rc<RefCell<dyn MidiListener>>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(u64, Weak<RefCell<dyn MidiListener>>)>,
}

impl Registry {
    fn remove(&mut self, id: u64) {
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
    }

    /// Live listeners in subscription order
    fn snapshot(&self) -> Vec<ListenerRef> {
        self.listeners
            .iter()
            .filter_map(|(_, listener)| listener.upgrade())
            .collect()
    }
}

/// Broadcasts hardware events to every subscribed listener
#[derive(Clone, Default)]
pub struct MidiBus {
    registry: Rc<RefCell<Registry>>,
}

impl MidiBus {
    /// Create a bus with no listeners
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener until the returned handle is dropped
    ///
    /// The bus only keeps a weak reference; the caller owns the listener.
    pub fn subscribe(&self, listener: &ListenerRef) -> Subscription {
        let mut registry = self.registry.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.push((id, Rc::downgrade(listener)));

        tracing::debug!("Subscribed listener {} ({} total)", id, registry.listeners.len());

        Subscription {
            id,
            registry: Rc::downgrade(&self.registry),
        }
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.registry.borrow().listeners.len()
    }

    /// Deliver a knob update to every listener
    pub fn knob(&self, channel: u8, number: u8, value: f32) {
        self.each(|listener| listener.on_knob(channel, number, value));
    }

    /// Deliver a note-on to every listener
    pub fn note_on(&self, channel: u8, note: u8, velocity: f32) {
        self.each(|listener| listener.on_note_on(channel, note, velocity));
    }

    /// Deliver a note-off to every listener
    pub fn note_off(&self, channel: u8, note: u8) {
        self.each(|listener| listener.on_note_off(channel, note));
    }

    fn each<F>(&self, mut deliver: F)
    where
        F: FnMut(&mut dyn MidiListener),
    {
        // Snapshot first so listeners may unsubscribe while we deliver
        let listeners = self.registry.borrow().snapshot();

        for listener in listeners {
            match listener.try_borrow_mut() {
                Ok(mut listener) => deliver(&mut *listener),
                Err(_) => tracing::warn!("Skipping listener already handling an event"),
            }
        }
    }
}

impl fmt::Debug for MidiBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MidiBus")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Keeps a listener registered; unsubscribes on drop
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    registry: Weak<RefCell<Registry>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            if let Ok(mut registry) = registry.try_borrow_mut() {
                registry.remove(self.id);
                tracing::debug!("Unsubscribed listener {}", self.id);
            }
        }
    }
}
