use crate::constants::{TRACKING_MARKER_COLOR, TRACKING_ZOOM};
use crate::error::{AppError, Result};
use crate::location::{LocationProvider, PositionUpdate, WatchId};
use crate::map::{MapSurface, MarkerId, MarkerOptions};
use crate::models::{Position, PositionError, WatchOptions};
use futures::stream::BoxStream;
use futures::StreamExt;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use tokio_util::sync::CancellationToken;

/// Receives `(longitude, latitude, accuracy_m)` for every applied fix.
///
/// Runs while the tracker's marker slot is held, so `stop` waits for an
/// in-progress call and none starts after it returns. The callback must not
/// stop tracking itself.
pub type PositionCallback = Arc<dyn Fn(f64, f64, f64) + Send + Sync>;

/// Receives classified subscription errors. Use
/// [`PositionError::user_message`] for the text shown to the user.
pub type PositionErrorHandler = Arc<dyn Fn(&PositionError) + Send + Sync>;

/// Marker slot shared between the tracker and its watch task. Stop cancels
/// the token while holding this lock, so a fix that arrives late can never
/// recreate the marker.
type MarkerSlot = Arc<Mutex<Option<MarkerId>>>;

/// Read by the watch task on every error, so a handler installed after
/// `start` still applies.
type ErrorHandlerSlot = Arc<RwLock<Option<PositionErrorHandler>>>;

struct ActiveWatch {
    watch_id: WatchId,
    token: CancellationToken,
    surface: Arc<dyn MapSurface>,
    marker: MarkerSlot,
}

enum TrackingState {
    Idle,
    Tracking(ActiveWatch),
}

/// Owns at most one location subscription and the marker that follows it.
pub struct LocationTracker {
    provider: Arc<dyn LocationProvider>,
    on_error: ErrorHandlerSlot,
    state: TrackingState,
}

fn lock_slot(slot: &Mutex<Option<MarkerId>>) -> MutexGuard<'_, Option<MarkerId>> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl LocationTracker {
    pub fn new(provider: Arc<dyn LocationProvider>) -> Self {
        LocationTracker {
            provider,
            on_error: Arc::new(RwLock::new(None)),
            state: TrackingState::Idle,
        }
    }

    pub fn with_error_handler(self, handler: PositionErrorHandler) -> Self {
        self.set_error_handler(handler);
        self
    }

    /// Install the error handler. Takes effect on a running watch too.
    pub fn set_error_handler(&self, handler: PositionErrorHandler) {
        *self
            .on_error
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(handler);
    }

    pub fn is_tracking(&self) -> bool {
        matches!(self.state, TrackingState::Tracking(_))
    }

    /// Marker currently showing the device position.
    pub fn marker_id(&self) -> Option<MarkerId> {
        match &self.state {
            TrackingState::Tracking(active) => *lock_slot(&active.marker),
            TrackingState::Idle => None,
        }
    }

    /// Start following the device position on `surface`.
    ///
    /// A previous subscription is stopped first. Requires a tokio runtime.
    pub fn start(
        &mut self,
        surface: Arc<dyn MapSurface>,
        callback: PositionCallback,
        options: WatchOptions,
    ) -> Result<()> {
        if !self.provider.is_available() {
            tracing::warn!("Location tracking requested but device location is unavailable");
            return Err(AppError::LocationUnsupported);
        }

        let runtime = tokio::runtime::Handle::try_current().map_err(|_| {
            AppError::Internal("Location tracking requires an async runtime".to_string())
        })?;

        self.stop();

        let watch = self.provider.watch_position(&options);
        let token = CancellationToken::new();
        let marker: MarkerSlot = Arc::new(Mutex::new(None));

        tracing::info!(
            container = %surface.container_id(),
            watch = %watch.id,
            high_accuracy = options.enable_high_accuracy,
            "Location tracking started"
        );

        runtime.spawn(run_watch(
            watch.updates,
            token.clone(),
            Arc::clone(&surface),
            Arc::clone(&marker),
            callback,
            Arc::clone(&self.on_error),
        ));

        self.state = TrackingState::Tracking(ActiveWatch {
            watch_id: watch.id,
            token,
            surface,
            marker,
        });
        Ok(())
    }

    /// Stop tracking and remove the marker. No-op when idle.
    pub fn stop(&mut self) {
        let TrackingState::Tracking(active) =
            std::mem::replace(&mut self.state, TrackingState::Idle)
        else {
            return;
        };

        {
            let mut marker = lock_slot(&active.marker);
            active.token.cancel();
            if let Some(id) = marker.take() {
                active.surface.remove_marker(id);
            }
        }
        self.provider.clear_watch(active.watch_id);

        tracing::info!(
            container = %active.surface.container_id(),
            watch = %active.watch_id,
            "Location tracking stopped"
        );
    }
}

impl Drop for LocationTracker {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_watch(
    mut updates: BoxStream<'static, PositionUpdate>,
    token: CancellationToken,
    surface: Arc<dyn MapSurface>,
    marker: MarkerSlot,
    callback: PositionCallback,
    on_error: ErrorHandlerSlot,
) {
    loop {
        let next = tokio::select! {
            biased;
            _ = token.cancelled() => break,
            next = updates.next() => next,
        };

        match next {
            Some(Ok(position)) => {
                let mut slot = lock_slot(&marker);
                if !apply_position(&token, surface.as_ref(), &mut slot, &position) {
                    break;
                }
                let c = position.coordinates;
                callback(c.lng, c.lat, position.accuracy_m);
            }
            Some(Err(e)) => {
                tracing::warn!(kind = %e.kind, "Location update failed: {}", e.detail);
                let handler = on_error
                    .read()
                    .unwrap_or_else(|poisoned| poisoned.into_inner())
                    .clone();
                if let Some(handler) = handler {
                    handler(&e);
                }
            }
            None => {
                tracing::debug!("Location stream ended");
                break;
            }
        }
    }
}

/// Move (or create) the tracking marker and recenter. Returns `false` once
/// the subscription has been cancelled. Call with the marker slot locked.
fn apply_position(
    token: &CancellationToken,
    surface: &dyn MapSurface,
    slot: &mut Option<MarkerId>,
    position: &Position,
) -> bool {
    if token.is_cancelled() {
        return false;
    }

    let c = position.coordinates;
    let popup = format!("You are here (±{:.0} m)", position.accuracy_m);

    match *slot {
        Some(id) => {
            surface.set_marker_position(id, c);
            surface.set_marker_popup(id, &popup);
            surface.set_center(c);
        }
        None => {
            let id = surface.add_marker(
                MarkerOptions::at(c)
                    .with_color(TRACKING_MARKER_COLOR)
                    .with_popup(popup),
            );
            *slot = Some(id);
            surface.set_view(c, TRACKING_ZOOM);
        }
    }
    true
}
