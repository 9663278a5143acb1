//! "Diagram changed" notifications for renderers and other listeners.

use uml_core::Diagram;

/// Receives every committed snapshot.
pub trait DiagramObserver {
    fn diagram_changed(&mut self, diagram: &Diagram);
}

impl<F: FnMut(&Diagram)> DiagramObserver for F {
    fn diagram_changed(&mut self, diagram: &Diagram) {
        self(diagram)
    }
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Observer list, notified in subscription order.
#[derive(Default)]
pub struct Observers {
    next_id: u64,
    entries: Vec<(SubscriptionId, Box<dyn DiagramObserver>)>,
}

impl Observers {
    pub fn subscribe(&mut self, observer: impl DiagramObserver + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, Box::new(observer)));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(sid, _)| *sid != id);
        self.entries.len() != before
    }

    pub fn notify(&mut self, diagram: &Diagram) {
        for (_, observer) in &mut self.entries {
            observer.diagram_changed(diagram);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("count", &self.entries.len())
            .finish()
    }
}
