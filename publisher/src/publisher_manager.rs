use dashmap::DashMap;
use std::cmp::Eq;
use std::hash::Hash;
use std::sync::Arc;
use uuid::Uuid;

use crate::Publishable;

use super::publisher::Publisher;
use common::traits::Notifiable;

/// Manages one publisher per signal type and routes listener registration to
/// them. Cloning the manager shares the same publishers.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use uuid::Uuid;
/// use publisher::{Listener, PublisherManager};
/// use common::types::{Sample, SensorKind};
///
/// let manager = PublisherManager::<Sample, SensorKind>::new(&SensorKind::ALL);
///
/// let mut listener = Listener::new(|_id: Uuid, sample: Arc<Sample>| {
///     println!("Sample: {:?}", sample);
/// });
///
/// // add listener to the accelerometer publisher
/// let id = manager.add_listener(&mut listener, &SensorKind::Accelerometer).unwrap();
///
/// manager.notify_listeners(
///     SensorKind::Accelerometer,
///     Arc::new(Sample::new(SensorKind::Accelerometer, 0, [0.0, 0.0, 1.0])),
/// );
///
/// manager.remove_listener(id).unwrap();
/// ```
pub struct PublisherManager<T, S> {
    publishers: Arc<DashMap<S, Publisher<T>>>,
    control: Arc<DashMap<Uuid, S>>,
}

impl<T, S> Clone for PublisherManager<T, S> {
    fn clone(&self) -> Self {
        Self {
            publishers: Arc::clone(&self.publishers),
            control: Arc::clone(&self.control),
        }
    }
}

impl<T, S> PublisherManager<T, S>
where
    T: Send + Sync + 'static,
    S: Send + Sync + Hash + Eq + Clone + Into<usize>,
{
    pub fn new(publisher_types: &[S]) -> Self {
        let collection = DashMap::<S, Publisher<T>>::new();
        for publisher_type in publisher_types {
            collection.insert(publisher_type.clone(), Publisher::new());
        }

        Self {
            publishers: Arc::new(collection),
            control: Arc::new(DashMap::new()),
        }
    }

    pub fn add_publisher(&self, publisher_type: S) {
        self.publishers
            .entry(publisher_type)
            .or_insert_with(Publisher::new);
    }

    pub fn remove_publisher(&self, publisher_type: &S) {
        if let Some((_, publisher)) = self.publishers.remove(publisher_type) {
            publisher.unregister_all();
            self.control.retain(|_, s| *s != *publisher_type);
        }
    }

    pub fn get_available_publisher_types(&self) -> Vec<S> {
        let mut publisher_types: Vec<S> = self
            .publishers
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        publisher_types.sort_by_key(|publisher_type| (publisher_type.clone()).into());
        publisher_types
    }

    pub fn add_listener(
        &self,
        listener: &mut dyn Notifiable<T>,
        publisher_type: &S,
    ) -> Result<Uuid, String> {
        if let Some(publisher) = self.publishers.get(publisher_type) {
            let id = publisher.register_listener(listener);
            self.control.insert(id, publisher_type.clone());
            return Ok(id);
        }
        Err("Publisher doesnt exist".to_string())
    }

    pub fn remove_listener(&self, id: Uuid) -> Result<(), String> {
        if let Some((_, publisher_type)) = self.control.remove(&id) {
            if let Some(publisher) = self.publishers.get(&publisher_type) {
                publisher.unregister_listener(id);
            } else {
                return Err("Publisher doesnt exist".to_string());
            }
            return Ok(());
        }
        Err("Listener Id not found".to_string())
    }

    /// Number of listeners registered to `publisher_type`
    pub fn listener_count(&self, publisher_type: &S) -> usize {
        self.publishers
            .get(publisher_type)
            .map(|publisher| publisher.len())
            .unwrap_or_default()
    }

    pub fn notify_listeners(&self, publisher_type: S, data: Arc<T>) {
        // Clone out of the map so listeners run without holding the shard lock
        let publisher = self
            .publishers
            .get(&publisher_type)
            .map(|entry| entry.value().clone());
        if let Some(publisher) = publisher {
            publisher.notify_listeners(data);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listener;
    use common::types::{Sample, SensorKind};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TestBuffer {
        received: AtomicUsize,
    }

    impl TestBuffer {
        fn handle(&self, _id: Uuid, _sample: Arc<Sample>) {
            self.received.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn sample(kind: SensorKind) -> Arc<Sample> {
        Arc::new(Sample::new(kind, 0, [0.0, 0.0, 0.0]))
    }

    #[test]
    fn test_new_manager() {
        let manager = PublisherManager::<Sample, SensorKind>::new(&[]);
        assert!(manager.get_available_publisher_types().is_empty());
    }

    #[test]
    fn test_add_publisher() {
        let manager = PublisherManager::<Sample, SensorKind>::new(&[]);
        manager.add_publisher(SensorKind::Gyroscope);
        manager.add_publisher(SensorKind::Accelerometer);

        assert_eq!(
            manager.get_available_publisher_types(),
            vec![SensorKind::Accelerometer, SensorKind::Gyroscope]
        );
    }

    #[test]
    fn test_add_duplicated_publisher() {
        let manager = PublisherManager::<Sample, SensorKind>::new(&[SensorKind::Accelerometer]);
        manager.add_publisher(SensorKind::Accelerometer);

        assert_eq!(manager.get_available_publisher_types().len(), 1);
    }

    #[test]
    fn test_remove_unknown_publisher() {
        let manager = PublisherManager::<Sample, SensorKind>::new(&[SensorKind::Accelerometer]);
        manager.remove_publisher(&SensorKind::Gyroscope);

        assert_eq!(
            manager.get_available_publisher_types(),
            vec![SensorKind::Accelerometer]
        );
    }

    #[test]
    fn test_notify_reaches_only_matching_publisher() {
        let manager = PublisherManager::<Sample, SensorKind>::new(&SensorKind::ALL);
        let accel = Arc::new(TestBuffer::default());
        let gyro = Arc::new(TestBuffer::default());

        manager
            .add_listener(&mut listener!(accel.handle), &SensorKind::Accelerometer)
            .unwrap();
        manager
            .add_listener(&mut listener!(gyro.handle), &SensorKind::Gyroscope)
            .unwrap();

        manager.notify_listeners(SensorKind::Accelerometer, sample(SensorKind::Accelerometer));
        manager.notify_listeners(SensorKind::Accelerometer, sample(SensorKind::Accelerometer));
        manager.notify_listeners(SensorKind::Gyroscope, sample(SensorKind::Gyroscope));
        manager.notify_listeners(SensorKind::Magnetometer, sample(SensorKind::Magnetometer));

        assert_eq!(accel.received.load(Ordering::SeqCst), 2);
        assert_eq!(gyro.received.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_remove_listener() {
        let manager = PublisherManager::<Sample, SensorKind>::new(&SensorKind::ALL);
        let accel = Arc::new(TestBuffer::default());

        let id = manager
            .add_listener(&mut listener!(accel.handle), &SensorKind::Accelerometer)
            .unwrap();
        assert_eq!(manager.listener_count(&SensorKind::Accelerometer), 1);

        manager.remove_listener(id).unwrap();
        manager.notify_listeners(SensorKind::Accelerometer, sample(SensorKind::Accelerometer));

        assert_eq!(manager.listener_count(&SensorKind::Accelerometer), 0);
        assert_eq!(accel.received.load(Ordering::SeqCst), 0);
    }

    #[test]
    #[should_panic(expected = "Publisher doesnt exist")]
    fn test_add_listener_to_nonexistent_publisher() {
        let manager = PublisherManager::<Sample, SensorKind>::new(&[]);
        let accel = Arc::new(TestBuffer::default());

        manager
            .add_listener(&mut listener!(accel.handle), &SensorKind::Accelerometer)
            .unwrap();
    }

    #[test]
    #[should_panic(expected = "Listener Id not found")]
    fn test_remove_unknown_listener() {
        let manager = PublisherManager::<Sample, SensorKind>::new(&SensorKind::ALL);

        manager.remove_listener(Uuid::new_v4()).unwrap();
    }

    #[test]
    #[should_panic(expected = "Listener Id not found")]
    fn test_remove_publisher_with_listeners() {
        let manager = PublisherManager::<Sample, SensorKind>::new(&SensorKind::ALL);
        let accel = Arc::new(TestBuffer::default());
        let id = manager
            .add_listener(&mut listener!(accel.handle), &SensorKind::Accelerometer)
            .unwrap();

        manager.remove_publisher(&SensorKind::Accelerometer);

        manager.remove_listener(id).unwrap();
    }
}
