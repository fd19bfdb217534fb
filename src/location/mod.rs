//! Device location: the provider abstraction and the live-position tracker.

pub mod tracker;

pub use tracker::{LocationTracker, PositionCallback, PositionErrorHandler};

use crate::models::{Position, PositionError, WatchOptions};
use futures::channel::mpsc::{self, UnboundedSender};
use futures::stream::BoxStream;
use futures::StreamExt;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

pub type WatchId = Uuid;

pub type PositionUpdate = Result<Position, PositionError>;

/// An open subscription. Updates arrive in emission order until the watch
/// is cleared through [`LocationProvider::clear_watch`].
pub struct LocationWatch {
    pub id: WatchId,
    pub updates: BoxStream<'static, PositionUpdate>,
}

/// Continuous device-location service.
pub trait LocationProvider: Send + Sync {
    fn is_available(&self) -> bool;

    fn watch_position(&self, options: &WatchOptions) -> LocationWatch;

    fn clear_watch(&self, id: WatchId);
}

#[derive(Default)]
struct FeedState {
    available: bool,
    watches: HashMap<WatchId, UnboundedSender<PositionUpdate>>,
    last_options: Option<WatchOptions>,
}

/// Provider fed by the host (GPS bridge, mobile shell, simulator) through a
/// [`LocationFeed`]. Every pushed update is fanned out to all open watches.
#[derive(Clone)]
pub struct ChannelLocationProvider {
    state: Arc<Mutex<FeedState>>,
}

/// Sending half of a [`ChannelLocationProvider`].
#[derive(Clone)]
pub struct LocationFeed {
    state: Arc<Mutex<FeedState>>,
}

fn lock(state: &Mutex<FeedState>) -> MutexGuard<'_, FeedState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ChannelLocationProvider {
    pub fn new() -> Self {
        ChannelLocationProvider {
            state: Arc::new(Mutex::new(FeedState {
                available: true,
                ..Default::default()
            })),
        }
    }

    /// A provider for hosts without location capability.
    pub fn unavailable() -> Self {
        ChannelLocationProvider {
            state: Arc::new(Mutex::new(FeedState::default())),
        }
    }

    pub fn feed(&self) -> LocationFeed {
        LocationFeed {
            state: Arc::clone(&self.state),
        }
    }

    pub fn active_watches(&self) -> usize {
        lock(&self.state).watches.len()
    }

    /// Options passed with the most recent `watch_position` call.
    pub fn last_options(&self) -> Option<WatchOptions> {
        lock(&self.state).last_options.clone()
    }
}

impl Default for ChannelLocationProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl LocationProvider for ChannelLocationProvider {
    fn is_available(&self) -> bool {
        lock(&self.state).available
    }

    fn watch_position(&self, options: &WatchOptions) -> LocationWatch {
        let (tx, rx) = mpsc::unbounded();
        let id = Uuid::new_v4();

        let mut state = lock(&self.state);
        state.watches.insert(id, tx);
        state.last_options = Some(options.clone());
        tracing::debug!(watch = %id, "Location watch opened");

        LocationWatch {
            id,
            updates: rx.boxed(),
        }
    }

    fn clear_watch(&self, id: WatchId) {
        if lock(&self.state).watches.remove(&id).is_some() {
            tracing::debug!(watch = %id, "Location watch cleared");
        }
    }
}

impl LocationFeed {
    /// Deliver a fix to every open watch. Returns how many received it.
    pub fn push_position(&self, position: Position) -> usize {
        self.push(Ok(position))
    }

    pub fn push_error(&self, error: PositionError) -> usize {
        self.push(Err(error))
    }

    pub fn set_available(&self, available: bool) {
        lock(&self.state).available = available;
    }

    fn push(&self, update: PositionUpdate) -> usize {
        let mut state = lock(&self.state);
        // Drop watches whose receiver is gone
        state
            .watches
            .retain(|_, tx| tx.unbounded_send(update.clone()).is_ok());
        state.watches.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Coordinates, PositionErrorKind};

    #[tokio::test]
    async fn test_feed_fans_out_in_order() {
        let provider = ChannelLocationProvider::new();
        let feed = provider.feed();
        let mut a = provider.watch_position(&WatchOptions::default());
        let mut b = provider.watch_position(&WatchOptions::default());

        let p1 = Position::new(Coordinates { lat: 1.0, lng: 1.0 }, 5.0);
        let p2 = Position::new(Coordinates { lat: 2.0, lng: 2.0 }, 5.0);
        assert_eq!(feed.push_position(p1.clone()), 2);
        assert_eq!(feed.push_position(p2.clone()), 2);

        assert_eq!(a.updates.next().await.unwrap().unwrap(), p1);
        assert_eq!(a.updates.next().await.unwrap().unwrap(), p2);
        assert_eq!(b.updates.next().await.unwrap().unwrap(), p1);
    }

    #[tokio::test]
    async fn test_clear_watch_ends_stream() {
        let provider = ChannelLocationProvider::new();
        let mut watch = provider.watch_position(&WatchOptions::default());
        assert_eq!(provider.active_watches(), 1);

        provider.clear_watch(watch.id);
        assert_eq!(provider.active_watches(), 0);
        assert!(watch.updates.next().await.is_none());
    }

    #[tokio::test]
    async fn test_errors_are_delivered() {
        let provider = ChannelLocationProvider::new();
        let mut watch = provider.watch_position(&WatchOptions::default());
        provider
            .feed()
            .push_error(PositionError::new(PositionErrorKind::Timeout, "no fix"));

        let err = watch.updates.next().await.unwrap().unwrap_err();
        assert_eq!(err.kind, PositionErrorKind::Timeout);
    }

    #[test]
    fn test_unavailable_provider() {
        let provider = ChannelLocationProvider::unavailable();
        assert!(!provider.is_available());
        provider.feed().set_available(true);
        assert!(provider.is_available());
    }
}
