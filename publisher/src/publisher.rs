use dashmap::DashMap;
use rayon::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

use common::traits::Notifiable;
use common::types::Callback;

pub trait Publishable<T> {
    fn register_listener(&self, listener: &mut dyn Notifiable<T>) -> Uuid;
    fn unregister_listener(&self, listener_id: Uuid) -> bool;
    fn unregister_all(&self);
    fn notify_listeners(&self, data: Arc<T>);
}

/// Record of registered listeners that will be notified of updates
pub struct Publisher<T> {
    listeners: Arc<DashMap<Uuid, Callback<T>>>,
}

impl<T> Clone for Publisher<T> {
    fn clone(&self) -> Self {
        Self {
            listeners: Arc::clone(&self.listeners),
        }
    }
}

impl<T> Default for Publisher<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Publisher<T> {
    pub fn new() -> Self {
        Self {
            listeners: Arc::new(DashMap::new()),
        }
    }

    /// Returns true if no listeners registered
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Returns number of registered listeners
    pub fn len(&self) -> usize {
        self.listeners.len()
    }
}

impl<T> Publishable<T> for Publisher<T>
where
    T: Send + Sync + 'static,
{
    fn register_listener(&self, listener: &mut dyn Notifiable<T>) -> Uuid {
        let callback = listener.get_callback();
        let listener_id = Uuid::new_v4();
        listener.set_id(listener_id);
        self.listeners.insert(listener_id, callback);
        listener_id
    }

    fn unregister_all(&self) {
        self.listeners.clear();
    }

    /// Returns false if no listener matched `listener_id`
    fn unregister_listener(&self, listener_id: Uuid) -> bool {
        self.listeners.remove(&listener_id).is_some()
    }

    fn notify_listeners(&self, data: Arc<T>) {
        // Snapshot first so a callback may unregister itself without deadlocking the map
        let listeners: Vec<(Uuid, Callback<T>)> = self
            .listeners
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();

        listeners.into_par_iter().for_each(|(id, callback)| {
            let data = data.clone();
            callback(id, data);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{listener, listener::Listener};
    use std::sync::Mutex;

    struct TestHandler {
        data: Arc<Mutex<i32>>,
    }

    impl TestHandler {
        fn new() -> Self {
            Self {
                data: Arc::new(Mutex::new(0)),
            }
        }

        fn handle(&self, _id: Uuid, value: Arc<i32>) {
            let mut data = self.data.lock().unwrap();
            *data = *value;
        }
    }

    #[test]
    fn test_publisher_initialization() {
        let publisher = Publisher::<i32>::new();
        assert!(publisher.is_empty());
    }

    #[test]
    fn test_register_and_notify_listener() {
        let publisher = Publisher::new();
        let handler = Arc::new(TestHandler::new());

        let mut listener = Listener::new({
            let handler = handler.clone();
            move |id: Uuid, value| {
                handler.handle(id, value);
            }
        });

        let _listener_id = publisher.register_listener(&mut listener);
        publisher.notify_listeners(Arc::new(42));

        assert_eq!(*handler.data.lock().unwrap(), 42);
    }

    #[test]
    fn test_register_and_notify_listener_macro() {
        let publisher = Publisher::new();
        let handler = Arc::new(TestHandler::new());

        let mut listener = listener!(handler.handle);

        let _listener_id = publisher.register_listener(&mut listener);
        publisher.notify_listeners(Arc::new(42));

        assert_eq!(*handler.data.lock().unwrap(), 42);
    }

    #[test]
    fn test_unregister_listener() {
        let publisher = Publisher::new();
        let handler = Arc::new(TestHandler::new());

        let mut listener = listener!(handler.handle);

        let listener_id = publisher.register_listener(&mut listener);
        assert_eq!(publisher.len(), 1);
        assert!(publisher.unregister_listener(listener_id));
        assert!(!publisher.unregister_listener(listener_id));
        publisher.notify_listeners(Arc::new(100));

        // Should remain unchanged since listener was removed
        assert_eq!(*handler.data.lock().unwrap(), 0);
    }

    #[test]
    fn test_notify_every_listener() {
        let publisher = Publisher::new();
        let first = Arc::new(TestHandler::new());
        let second = Arc::new(TestHandler::new());

        publisher.register_listener(&mut listener!(first.handle));
        publisher.register_listener(&mut listener!(second.handle));
        publisher.notify_listeners(Arc::new(7));

        assert_eq!(*first.data.lock().unwrap(), 7);
        assert_eq!(*second.data.lock().unwrap(), 7);

        publisher.unregister_all();
        assert!(publisher.is_empty());
    }
}
