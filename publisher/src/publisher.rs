use dashmap::DashMap;
use rayon::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

use common::traits::Notifiable;
use common::types::Callback;

pub trait Publishable<T> {
    fn register_listener(&self, listener: &mut dyn Notifiable<T>) -> Uuid;
    /// Returns false if no listener was registered with `listener_id`
    fn unregister_listener(&self, listener_id: Uuid) -> bool;
    fn unregister_all(&self);
    fn notify_listeners(&self, data: Arc<T>);
}

/// Listeners notified of every new event. Clones share the same registry.
#[derive(Clone, Default)]
pub struct Publisher<T> {
    listeners: Arc<DashMap<Uuid, Callback<T>>>,
}

impl<T> Publisher<T> {
    pub fn new() -> Self {
        Self {
            listeners: Arc::new(DashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    fn snapshot(&self) -> Vec<(Uuid, Callback<T>)> {
        self.listeners
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect()
    }
}

impl<T> Publishable<T> for Publisher<T>
where
    T: Send + Sync + 'static,
{
    fn register_listener(&self, listener: &mut dyn Notifiable<T>) -> Uuid {
        let id = Uuid::new_v4();
        listener.set_id(id);
        self.listeners.insert(id, listener.get_callback());
        log::debug!("Registered listener {id}");
        id
    }

    fn unregister_listener(&self, listener_id: Uuid) -> bool {
        let removed = self.listeners.remove(&listener_id).is_some();
        if removed {
            log::debug!("Unregistered listener {listener_id}");
        }
        removed
    }

    fn unregister_all(&self) {
        self.listeners.clear();
    }

    /// Callbacks never run while the registry is locked, so they may (un)register
    /// listeners themselves.
    fn notify_listeners(&self, data: Arc<T>) {
        match self.snapshot().as_slice() {
            [] => {}
            [(id, callback)] => callback(*id, data),
            listeners => listeners
                .par_iter()
                .for_each(|(id, callback)| callback(*id, data.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{listener, Listener};
    use common::{IMUSample, Sample3D};
    use std::sync::Mutex;

    #[derive(Default)]
    struct SampleLog {
        timestamps: Mutex<Vec<f64>>,
    }

    impl SampleLog {
        fn record(&self, _id: Uuid, sample: Arc<Sample3D>) {
            self.timestamps.lock().unwrap().push(sample.get_timestamp());
        }

        fn timestamps(&self) -> Vec<f64> {
            self.timestamps.lock().unwrap().clone()
        }
    }

    fn sample(timestamp: f64) -> Arc<Sample3D> {
        Arc::new(Sample3D::new(timestamp, [0.0, 0.0, 9.8]))
    }

    #[test]
    fn test_single_listener_sees_samples_in_order() {
        let publisher = Publisher::new();
        let log = Arc::new(SampleLog::default());
        let mut listener = listener!(log.record);

        let id = publisher.register_listener(&mut listener);
        assert_eq!(listener.id(), Some(id));

        for timestamp in [0.2, 0.4, 0.6] {
            publisher.notify_listeners(sample(timestamp));
        }
        assert_eq!(log.timestamps(), vec![0.2, 0.4, 0.6]);
    }

    #[test]
    fn test_every_listener_is_notified() {
        let publisher = Publisher::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        for _ in 0..3 {
            let received = received.clone();
            let mut listener = Listener::new(move |id: Uuid, sample: Arc<Sample3D>| {
                received.lock().unwrap().push((id, sample.get_timestamp()));
            });
            publisher.register_listener(&mut listener);
        }
        assert_eq!(publisher.len(), 3);

        publisher.notify_listeners(sample(1.0));

        let mut received = received.lock().unwrap().clone();
        assert_eq!(received.len(), 3);
        assert!(received.iter().all(|(_, timestamp)| *timestamp == 1.0));
        received.dedup_by_key(|(id, _)| *id);
        assert_eq!(received.len(), 3);
    }

    #[test]
    fn test_unregister_listener() {
        let publisher = Publisher::new();
        let log = Arc::new(SampleLog::default());
        let mut listener = listener!(log.record);

        let id = publisher.register_listener(&mut listener);
        assert!(publisher.unregister_listener(id));
        assert!(!publisher.unregister_listener(id));
        publisher.notify_listeners(sample(0.2));

        assert!(log.timestamps().is_empty());
        assert!(publisher.is_empty());
    }

    #[test]
    fn test_unregister_all() {
        let publisher = Publisher::<Sample3D>::new();
        let clone = publisher.clone();
        let mut listener = Listener::new(|_id: Uuid, _sample: Arc<Sample3D>| {});
        publisher.register_listener(&mut listener);
        publisher.register_listener(&mut listener);
        assert_eq!(clone.len(), 2);

        clone.unregister_all();
        assert!(publisher.is_empty());
    }
}
