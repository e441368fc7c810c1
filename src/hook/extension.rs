//! Registration lifecycle of the validation hook with a host

use super::validation::ValidationHook;
use crate::graph::{HandlerId, TransactionEvents, TransactionHandler};
use crate::persistence::PropertyStore;
use std::sync::{Arc, Mutex};
use tracing::info;

/// Subscribes a [`ValidationHook`] to a host's transaction events on
/// [`start`](Self::start) and removes it on [`stop`](Self::stop) or drop.
pub struct ConstraintExtension<E: TransactionEvents + ?Sized> {
    events: Arc<E>,
    handler: Arc<dyn TransactionHandler>,
    registration: Mutex<Option<HandlerId>>,
}

impl<E: TransactionEvents + ?Sized> ConstraintExtension<E> {
    pub fn new<S: PropertyStore + 'static>(events: Arc<E>, hook: ValidationHook<S>) -> Self {
        Self {
            events,
            handler: Arc::new(hook),
            registration: Mutex::new(None),
        }
    }

    /// Subscribe the hook. Returns false if it was already running.
    pub fn start(&self) -> bool {
        let mut registration = self.registration.lock().unwrap();
        if registration.is_some() {
            return false;
        }
        *registration = Some(self.events.subscribe(Arc::clone(&self.handler)));
        info!("Cardinality constraint validation started");
        true
    }

    /// Unsubscribe the hook. Returns false if it was not running.
    pub fn stop(&self) -> bool {
        let mut registration = self.registration.lock().unwrap();
        match registration.take() {
            Some(id) => {
                self.events.unsubscribe(id);
                info!("Cardinality constraint validation stopped");
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.registration.lock().unwrap().is_some()
    }
}

impl<E: TransactionEvents + ?Sized> Drop for ConstraintExtension<E> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphStore;
    use crate::persistence::{ConstraintPersister, MemoryPropertyStore};

    fn extension(store: &GraphStore) -> ConstraintExtension<crate::graph::HandlerRegistry> {
        let hook = ValidationHook::new(ConstraintPersister::new(MemoryPropertyStore::new()));
        ConstraintExtension::new(store.events(), hook)
    }

    #[test]
    fn test_start_stop_idempotent() {
        let store = GraphStore::new();
        let ext = extension(&store);

        assert!(!ext.is_running());
        assert!(ext.start());
        assert!(!ext.start());
        assert_eq!(store.events().len(), 1);

        assert!(ext.stop());
        assert!(!ext.stop());
        assert!(store.events().is_empty());

        assert!(ext.start());
        assert_eq!(store.events().len(), 1);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let store = GraphStore::new();
        {
            let ext = extension(&store);
            ext.start();
            assert_eq!(store.events().len(), 1);
        }
        assert!(store.events().is_empty());
    }
}
