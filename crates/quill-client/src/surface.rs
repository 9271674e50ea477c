//! The editable text surface the controller drives.
//!
//! In a browser this is a textarea; anywhere else it is whatever holds the
//! user's text. The controller only needs the five capabilities of
//! [`EditingSurface`]. [`MemorySurface`] is a headless implementation for
//! tests and embedders without a UI.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

/// Callback fired whenever the surface's value changes.
#[derive(Clone)]
pub struct ChangeNotifier(Arc<dyn Fn() + Send + Sync>);

impl ChangeNotifier {
    pub fn new(f: impl Fn() + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn notify(&self) {
        (self.0)();
    }
}

impl fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ChangeNotifier")
    }
}

/// Capabilities the controller needs from an editing surface.
pub trait EditingSurface {
    fn value(&self) -> String;

    /// Programmatic assignment. Surfaces may (and browsers do) fire their
    /// change notification for this too.
    fn set_value(&mut self, value: &str);

    fn set_visible(&mut self, visible: bool);

    fn set_editable(&mut self, editable: bool);

    fn subscribe(&mut self, notifier: ChangeNotifier);
}

#[derive(Debug, Default)]
struct SurfaceState {
    value: String,
    visible: bool,
    editable: bool,
    subscribers: Vec<ChangeNotifier>,
}

/// Headless, cloneable surface. Clones share one underlying text.
#[derive(Clone, Debug, Default)]
pub struct MemorySurface {
    inner: Arc<Mutex<SurfaceState>>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: impl Into<String>) -> Self {
        let surface = Self::new();
        surface.inner.lock().value = value.into();
        surface
    }

    /// Simulate the user replacing the text. Refused while not editable.
    pub fn edit(&self, value: impl Into<String>) -> bool {
        {
            let mut state = self.inner.lock();
            if !state.editable {
                return false;
            }
            state.value = value.into();
        }
        self.fire();
        true
    }

    /// Simulate the user typing `text` at the end.
    pub fn type_text(&self, text: &str) -> bool {
        let next = format!("{}{}", self.current(), text);
        self.edit(next)
    }

    pub fn current(&self) -> String {
        self.inner.lock().value.clone()
    }

    pub fn is_visible(&self) -> bool {
        self.inner.lock().visible
    }

    pub fn is_editable(&self) -> bool {
        self.inner.lock().editable
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().subscribers.len()
    }

    fn fire(&self) {
        // Notify outside the lock; subscribers may read the value back.
        let subscribers = self.inner.lock().subscribers.clone();
        for notifier in &subscribers {
            notifier.notify();
        }
    }
}

impl EditingSurface for MemorySurface {
    fn value(&self) -> String {
        self.current()
    }

    fn set_value(&mut self, value: &str) {
        self.inner.lock().value = value.to_string();
        self.fire();
    }

    fn set_visible(&mut self, visible: bool) {
        self.inner.lock().visible = visible;
    }

    fn set_editable(&mut self, editable: bool) {
        self.inner.lock().editable = editable;
    }

    fn subscribe(&mut self, notifier: ChangeNotifier) {
        self.inner.lock().subscribers.push(notifier);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting() -> (ChangeNotifier, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let notifier = ChangeNotifier::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        (notifier, count)
    }

    #[test]
    fn test_edit_requires_editable() {
        let mut surface = MemorySurface::new();
        assert!(!surface.edit("nope"));
        assert_eq!(surface.current(), "");

        surface.set_editable(true);
        assert!(surface.edit("yes"));
        assert_eq!(surface.value(), "yes");
        assert!(surface.type_text("!"));
        assert_eq!(surface.value(), "yes!");
    }

    #[test]
    fn test_programmatic_and_user_changes_both_notify() {
        let mut surface = MemorySurface::new();
        let (notifier, count) = counting();
        surface.subscribe(notifier);
        surface.set_editable(true);

        surface.set_value("from code");
        surface.edit("from user");
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_clones_share_state() {
        let mut surface = MemorySurface::with_value("shared");
        let view = surface.clone();
        surface.set_visible(true);
        assert!(view.is_visible());
        assert_eq!(view.current(), "shared");
    }
}
