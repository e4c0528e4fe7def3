use std::fmt;
use std::sync::Arc;

/// Identifier of an action within one sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActionId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionStyle {
    Default,
    Destructive,
    Cancel,
}

type SecondaryLabel = Arc<dyn Fn(usize) -> String + Send + Sync>;
type Handler = Arc<dyn Fn(usize) + Send + Sync>;

/// One user action shown below the preview strip.
///
/// The secondary label and the handler both receive the number of selected assets.
#[derive(Clone)]
pub struct Action {
    pub id: ActionId,
    pub label: String,
    pub style: ActionStyle,
    secondary_label: SecondaryLabel,
    handler: Handler,
}

impl Action {
    /// Create an action whose label does not change with the selection.
    pub fn new(id: ActionId, label: impl Into<String>, style: ActionStyle) -> Self {
        let label = label.into();
        let fixed = label.clone();
        Self {
            id,
            label,
            style,
            secondary_label: Arc::new(move |_| fixed.clone()),
            handler: Arc::new(|_| {}),
        }
    }

    pub fn cancel(id: ActionId, label: impl Into<String>) -> Self {
        Self::new(id, label, ActionStyle::Cancel)
    }

    pub fn with_secondary_label<F>(mut self, secondary: F) -> Self
    where
        F: Fn(usize) -> String + Send + Sync + 'static,
    {
        self.secondary_label = Arc::new(secondary);
        self
    }

    pub fn with_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.handler = Arc::new(handler);
        self
    }

    pub fn is_cancel(&self) -> bool {
        self.style == ActionStyle::Cancel
    }

    pub fn secondary_label(&self, count: usize) -> String {
        (self.secondary_label)(count)
    }

    /// Run the handler with the final selection count.
    pub fn handle(&self, count: usize) {
        (self.handler)(count)
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("style", &self.style)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_secondary_label_receives_count() {
        let action = Action::new(ActionId(1), "Photo Library", ActionStyle::Default)
            .with_secondary_label(|n| format!("Add {} Photos", n));
        assert_eq!(action.secondary_label(3), "Add 3 Photos");
    }

    #[test]
    fn test_default_secondary_label_is_label() {
        let action = Action::cancel(ActionId(9), "Cancel");
        assert_eq!(action.secondary_label(2), "Cancel");
        assert!(action.is_cancel());
    }

    #[test]
    fn test_handler_receives_count() {
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_clone = Arc::clone(&seen);
        let action = Action::new(ActionId(1), "Send", ActionStyle::Default)
            .with_handler(move |n| seen_clone.store(n, Ordering::SeqCst));
        action.handle(4);
        assert_eq!(seen.load(Ordering::SeqCst), 4);
    }
}
