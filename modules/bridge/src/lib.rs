// SPDX-FileCopyrightText: 2026 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

//! Bridge between a push based location provider and a pull based stream
//!
//! The [`LocationBridge`] registers itself as delegate of a provider and
//! forwards every callback into a single location channel. The consumer pulls
//! the results from a [`LocationStream`].

pub mod manager;
pub mod queue;

use common::{
    authorization::AuthorizationStatus,
    error::{LocationError, ProviderErrorKind},
    position::LocationSample,
    stream::LocationResult,
};
use permission::PermissionNegotiator;
use provider_core::{LocationDelegate, LocationProvider, ProviderError, ProviderSettings};
use queue::{LocationQueue, LocationStream, QueueCapacity, TerminationReason};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

/// What to do with [`ProviderErrorKind::LocationUnknown`] errors.
///
/// Some providers report a short "location unknown" glitch while they are
/// still acquiring a fix.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnknownLocationPolicy {
    /// Forward the error to the consumer like every other failure.
    #[default]
    Surface,
    /// Treat the error as transient and drop it.
    Ignore,
}

/// Configuration of a [`LocationBridge`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub queue_capacity: QueueCapacity,
    pub unknown_location: UnknownLocationPolicy,
}

/// Maps an error reported by a provider to the local error kind.
///
/// Providers that report a [`ProviderErrorKind`] or a
/// [`LocationError::Provider`] keep their classification. Everything else is
/// an unknown location.
pub fn classify_error(error: &ProviderError) -> ProviderErrorKind {
    if let Some(kind) = error.downcast_ref::<ProviderErrorKind>() {
        return *kind;
    }
    if let Some(LocationError::Provider(kind)) = error.downcast_ref::<LocationError>() {
        return *kind;
    }
    ProviderErrorKind::LocationUnknown
}

struct BridgeInner {
    provider: Arc<dyn LocationProvider>,
    negotiator: PermissionNegotiator,
    config: BridgeConfig,
    /// Serializes starting and finishing, including the provider calls.
    lifecycle: Mutex<()>,
    queue: Mutex<LocationQueue>,
}

impl BridgeInner {
    fn lock_queue(&self) -> MutexGuard<'_, LocationQueue> {
        self.queue.lock().unwrap_or_else(|queue| queue.into_inner())
    }

    fn lock_lifecycle(&self) -> MutexGuard<'_, ()> {
        self.lifecycle.lock().unwrap_or_else(|guard| guard.into_inner())
    }

    fn start(self: &Arc<Self>) -> LocationStream {
        let _lifecycle = self.lock_lifecycle();
        let (stream, stale) = {
            let mut queue = self.lock_queue();
            if let Some(stream) = queue.live_stream() {
                debug!("Location stream of session {} already open", stream.session());
                return stream;
            }
            let bridge = Arc::downgrade(self);
            queue.open(move |session| {
                if let Some(bridge) = bridge.upgrade() {
                    bridge.finish_session(session);
                }
            })
        };
        if let Some(stale) = stale {
            debug!("Discarding abandoned session {}", stale.session());
            stale.finish(TerminationReason::Cancelled);
            self.provider.stop_updates();
        }
        info!("Starting location updates, session {}", stream.session());
        self.provider.start_updates();
        stream
    }

    fn finish(&self, reason: TerminationReason) {
        let _lifecycle = self.lock_lifecycle();
        let producer = self.lock_queue().take();
        if let Some(producer) = producer {
            info!("Stopping location updates, session {}", producer.session());
            producer.finish(reason);
            self.provider.stop_updates();
        }
    }

    /// Called when the last stream handle of `session` is dropped.
    fn finish_session(&self, session: u64) {
        let _lifecycle = self.lock_lifecycle();
        let producer = self.lock_queue().take_session(session);
        if let Some(producer) = producer {
            info!("Consumer of session {} went away, stopping location updates", session);
            producer.finish(TerminationReason::Cancelled);
            self.provider.stop_updates();
        }
    }

    fn enqueue(&self, result: LocationResult) {
        if !self.lock_queue().enqueue(result) {
            debug!("No active location stream, dropping provider event");
        }
    }
}

impl LocationDelegate for BridgeInner {
    fn did_update_locations(&self, locations: Vec<LocationSample>) {
        self.enqueue(Ok(locations));
    }

    fn did_fail_with_error(&self, error: ProviderError) {
        let kind = classify_error(&error);
        if kind == ProviderErrorKind::LocationUnknown
            && self.config.unknown_location == UnknownLocationPolicy::Ignore
        {
            debug!("Ignoring transient provider error: {}", error);
            return;
        }
        self.enqueue(Err(LocationError::Provider(kind)));
    }

    fn did_change_authorization(&self, status: AuthorizationStatus) {
        info!("Location authorization changed to {}", status);
        self.negotiator.authorization_changed(status);
    }
}

/// Adapts the callbacks of a [`LocationProvider`] into a [`LocationStream`].
///
/// The bridge registers itself as the delegate of the provider. At most one
/// channel exists per bridge; dropping the bridge finishes it and stops the
/// provider.
pub struct LocationBridge {
    inner: Arc<BridgeInner>,
}

impl LocationBridge {
    pub fn new(provider: Arc<dyn LocationProvider>, config: BridgeConfig) -> Self {
        let inner = Arc::new(BridgeInner {
            negotiator: PermissionNegotiator::new(provider.clone()),
            provider,
            config,
            lifecycle: Mutex::new(()),
            queue: Mutex::new(LocationQueue::new(config.queue_capacity)),
        });
        let delegate: Arc<dyn LocationDelegate> = inner.clone();
        inner.provider.set_delegate(Some(Arc::downgrade(&delegate)));
        LocationBridge { inner }
    }

    /// Creates a bridge and passes `settings` to the provider.
    pub fn with_settings(
        provider: Arc<dyn LocationProvider>,
        config: BridgeConfig,
        settings: &ProviderSettings,
    ) -> Self {
        provider.apply_settings(settings);
        LocationBridge::new(provider, config)
    }

    /// Returns the stream of the open channel, or opens a new one and starts
    /// the provider.
    pub fn start(&self) -> LocationStream {
        self.inner.start()
    }

    /// Closes the channel and stops the provider. Does nothing if no channel
    /// is open.
    pub fn finish(&self) {
        self.inner.finish(TerminationReason::Finished);
    }

    /// Waits until the user answered the authorization prompt.
    ///
    /// # Errors
    ///
    /// [`LocationError::AccessNotAuthorized`] if the answer doesn't allow
    /// location updates, [`LocationError::PermissionRequestPending`] if
    /// another request is still waiting.
    pub async fn permission(&self) -> Result<AuthorizationStatus, LocationError> {
        self.inner.negotiator.grant().await
    }

    pub fn negotiator(&self) -> &PermissionNegotiator {
        &self.inner.negotiator
    }

    /// Returns `true` while a channel is open.
    pub fn is_active(&self) -> bool {
        self.inner.lock_queue().is_open()
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.inner.config
    }
}

impl Drop for LocationBridge {
    fn drop(&mut self) {
        // The provider only holds a weak reference, it can't reach us afterwards.
        self.inner.finish(TerminationReason::Cancelled);
        debug!("LocationBridge dropped");
    }
}
