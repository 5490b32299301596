use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use common::traits::Notifiable;
use common::types::Callback;

/// Callback registered with a [`Publisher`](crate::Publisher)
#[derive(Clone)]
pub struct Listener<T> {
    callback: Callback<T>,
    id: Option<Uuid>,
}

impl<T> Listener<T>
where
    T: Send + Sync + 'static,
{
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(Uuid, Arc<T>) + Send + Sync + 'static,
    {
        Listener {
            callback: Arc::new(callback),
            id: None,
        }
    }

    /// Listener that hands every event over to the task owning the receiving end of
    /// `sender`. Events are dropped once the receiver is closed.
    pub fn forwarding(sender: mpsc::UnboundedSender<Arc<T>>) -> Self {
        Self::new(move |id, data| {
            if sender.send(data).is_err() {
                log::trace!("Receiver of listener {id} closed");
            }
        })
    }

    /// Id assigned by the last publisher this listener was registered with
    pub fn id(&self) -> Option<Uuid> {
        self.id
    }
}

impl<T> Notifiable<T> for Listener<T>
where
    T: Send + Sync,
{
    fn get_callback(&self) -> Callback<T> {
        self.callback.clone()
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = Some(id);
    }
}
