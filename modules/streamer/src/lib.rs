// SPDX-FileCopyrightText: 2026 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

//! Observable location streamer
//!
//! The [`LocationStreamer`] is the facade presentation layers talk to. It
//! starts and stops the provider session, folds every result into an
//! observable buffer and publishes whether it is streaming.

use algorithm::{ResultStrategy, Strategy};
use bridge::{
    BridgeConfig, UnknownLocationPolicy,
    manager::{DelegateLocationManager, LocationManager},
    queue::QueueCapacity,
};
use common::{
    error::LocationError,
    stream::{LocationResult, StreamingState},
};
use provider_core::{LocationProvider, ProviderSettings};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tracing::{debug, info};

/// What a start does while a stream is already running.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RestartPolicy {
    /// Stop the running stream and start a new one.
    #[default]
    Restart,
    /// Fail with [`LocationError::StreamingAlreadyStarted`].
    Reject,
}

/// Configuration of a [`LocationStreamer`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamerConfig {
    pub strategy: Strategy,
    pub on_active_start: RestartPolicy,
    pub unknown_location: UnknownLocationPolicy,
    pub queue_capacity: QueueCapacity,
    pub settings: ProviderSettings,
}

impl StreamerConfig {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn bridge_config(&self) -> BridgeConfig {
        BridgeConfig {
            queue_capacity: self.queue_capacity,
            unknown_location: self.unknown_location,
        }
    }
}

/// Marks the end of a session when the streaming loop is left, also if the
/// future running it is dropped.
struct SessionGuard<'a, M: LocationManager> {
    streamer: &'a LocationStreamer<M>,
    session: u64,
}

impl<M: LocationManager> Drop for SessionGuard<'_, M> {
    fn drop(&mut self) {
        self.streamer.finish_session(self.session);
    }
}

/// Streams locations of a [`LocationManager`] into an observable buffer.
///
/// # Type Parameters
/// - `M`: The location manager that provides the streams. Defaults to
///   [`DelegateLocationManager`].
///
/// All writes to the buffer and the state happen under one lock, observers
/// read them through [`watch`] channels.
pub struct LocationStreamer<M: LocationManager = DelegateLocationManager> {
    manager: M,
    strategy: Box<dyn ResultStrategy>,
    on_active_start: RestartPolicy,
    /// Id of the current session. Bumped on every start and stop.
    session: Mutex<u64>,
    /// Publishes the session id of every stop, a start that waits for the
    /// permission gives up on it.
    stops: watch::Sender<u64>,
    /// Serializes the setup phase of concurrent starts.
    starting: tokio::sync::Mutex<()>,
    state: watch::Sender<StreamingState>,
    results: watch::Sender<Vec<LocationResult>>,
}

impl LocationStreamer<DelegateLocationManager> {
    /// Creates a streamer for `provider`, bridged with the given configuration.
    pub fn new(provider: Arc<dyn LocationProvider>, config: StreamerConfig) -> Self {
        let manager =
            DelegateLocationManager::new(provider, config.bridge_config(), &config.settings);
        LocationStreamer::with_manager(manager, config.strategy.build(), config.on_active_start)
    }
}

impl<M: LocationManager> LocationStreamer<M> {
    /// Creates a streamer on top of a custom location manager.
    pub fn with_manager(
        manager: M,
        strategy: Box<dyn ResultStrategy>,
        on_active_start: RestartPolicy,
    ) -> Self {
        LocationStreamer {
            manager,
            strategy,
            on_active_start,
            session: Mutex::new(0),
            stops: watch::Sender::new(0),
            starting: tokio::sync::Mutex::new(()),
            state: watch::Sender::new(StreamingState::Idle),
            results: watch::Sender::new(Vec::new()),
        }
    }

    fn lock_session(&self) -> MutexGuard<'_, u64> {
        self.session.lock().unwrap_or_else(|session| session.into_inner())
    }

    /// Streams locations until the stream ends or [`LocationStreamer::stop`] is
    /// called.
    ///
    /// A running stream is stopped first, or the call fails, depending on the
    /// [`RestartPolicy`]. With `clean` the buffer is emptied once access is
    /// granted. The future completes when the session is over.
    ///
    /// # Errors
    ///
    /// - [`LocationError::AccessNotAuthorized`] if location access isn't
    ///   authorized. State and buffer stay untouched.
    /// - [`LocationError::StreamingAlreadyStarted`] if a stream is running and
    ///   restarts are rejected.
    /// - [`LocationError::StreamCanceled`] if `stop` was called while the
    ///   permission was negotiated. The pending request is abandoned and the
    ///   provider isn't started.
    pub async fn start(&self, clean: bool) -> Result<(), LocationError> {
        let (session, stream) = {
            let _starting = self.starting.lock().await;
            if self.state() == StreamingState::Streaming {
                match self.on_active_start {
                    RestartPolicy::Reject => return Err(LocationError::StreamingAlreadyStarted),
                    RestartPolicy::Restart => {
                        info!("Restarting location streaming");
                        self.stop();
                    }
                }
            }
            let (ticket, mut stops) = {
                let session = self.lock_session();
                (*session, self.stops.subscribe())
            };
            let status = tokio::select! {
                status = self.manager.authorize() => status?,
                _ = stops.changed() => {
                    info!("Streaming stopped while waiting for the permission");
                    return Err(LocationError::StreamCanceled);
                }
            };
            debug!("Location access granted: {}", status);

            // Opened under the session lock, a concurrent stop either cancels
            // before or finishes the new stream after.
            let mut current = self.lock_session();
            if *current != ticket {
                info!("Streaming stopped while waiting for the permission");
                return Err(LocationError::StreamCanceled);
            }
            let stream = self.manager.open();
            *current += 1;
            if clean {
                self.results.send_replace(Vec::new());
            }
            self.state.send_replace(StreamingState::Streaming);
            info!("Location streaming started, session {}", *current);
            (*current, stream)
        };

        let _guard = SessionGuard {
            streamer: self,
            session,
        };
        while let Some(result) = stream.next().await {
            if !self.add(session, result) {
                break;
            }
        }
        Ok(())
    }

    /// Stops streaming and sets the state to idle. Safe to call when idle.
    pub fn stop(&self) {
        {
            let mut session = self.lock_session();
            *session += 1;
            self.stops.send_replace(*session);
            self.state.send_replace(StreamingState::Idle);
        }
        self.manager.stop();
        debug!("Location streaming stopped");
    }

    /// Folds `result` into the buffer if `session` is still the current one.
    fn add(&self, session: u64, result: LocationResult) -> bool {
        let current = self.lock_session();
        if *current != session {
            debug!("Dropping result of finished session {}", session);
            return false;
        }
        self.results.send_modify(|results| {
            let previous = std::mem::take(results);
            *results = self.strategy.process(previous, result);
        });
        true
    }

    fn finish_session(&self, session: u64) {
        let current = self.lock_session();
        if *current == session {
            self.state.send_replace(StreamingState::Idle);
            info!("Location streaming of session {} ended", session);
        }
    }

    /// Returns a snapshot of the retained results.
    pub fn results(&self) -> Vec<LocationResult> {
        self.results.borrow().clone()
    }

    pub fn state(&self) -> StreamingState {
        *self.state.borrow()
    }

    pub fn is_idle(&self) -> bool {
        self.state() == StreamingState::Idle
    }

    /// Subscribes to changes of the retained results.
    pub fn subscribe_results(&self) -> watch::Receiver<Vec<LocationResult>> {
        self.results.subscribe()
    }

    /// Subscribes to changes of the streaming state.
    pub fn subscribe_state(&self) -> watch::Receiver<StreamingState> {
        self.state.subscribe()
    }

    pub fn manager(&self) -> &M {
        &self.manager
    }
}
