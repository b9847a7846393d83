//! Dropdown menu state with scoped outside-click listening
//!
//! An open menu holds an [`OutsideClickGuard`] registered with the host's
//! [`ListenerRegistry`]. Closing the menu or dropping it releases the guard,
//! so no listener outlives the menu that installed it.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Host-side registry of installed outside-click listeners
#[derive(Debug, Clone, Default)]
pub struct ListenerRegistry {
    active: Arc<AtomicUsize>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of listeners currently installed
    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    fn acquire(&self) -> OutsideClickGuard {
        self.active.fetch_add(1, Ordering::SeqCst);
        OutsideClickGuard {
            active: Arc::clone(&self.active),
        }
    }
}

/// An installed outside-click listener, removed on drop
#[derive(Debug)]
pub struct OutsideClickGuard {
    active: Arc<AtomicUsize>,
}

impl Drop for OutsideClickGuard {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Where a click landed relative to the menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    Inside,
    Outside,
}

/// Open/closed state of a dropdown (sort selector, facet picker)
#[derive(Debug)]
pub struct MenuState {
    registry: ListenerRegistry,
    listener: Option<OutsideClickGuard>,
}

impl MenuState {
    pub fn new(registry: &ListenerRegistry) -> Self {
        Self {
            registry: registry.clone(),
            listener: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.listener.is_some()
    }

    pub fn open(&mut self) {
        if self.listener.is_none() {
            self.listener = Some(self.registry.acquire());
        }
    }

    pub fn close(&mut self) {
        self.listener = None;
    }

    pub fn toggle(&mut self) {
        if self.is_open() {
            self.close();
        } else {
            self.open();
        }
    }

    /// Route a click; clicks outside an open menu close it
    ///
    /// Returns whether the menu closed.
    pub fn click(&mut self, target: ClickTarget) -> bool {
        if target == ClickTarget::Outside && self.is_open() {
            self.close();
            return true;
        }
        false
    }

    /// Pick an option: the menu closes and the choice is handed back
    pub fn select<T>(&mut self, choice: T) -> T {
        self.close();
        choice
    }
}
