// SPDX-FileCopyrightText: 2026 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use crate::{BridgeConfig, LocationBridge, queue::LocationStream};
use async_trait::async_trait;
use common::{authorization::AuthorizationStatus, error::LocationError};
use provider_core::{LocationProvider, ProviderSettings};
use std::sync::Arc;
use tracing::debug;

/// Common interface of a location source that can be started and stopped by
/// an observable streamer.
#[async_trait]
pub trait LocationManager: Send + Sync {
    /// Waits until location access is granted.
    ///
    /// Dropping the returned future abandons the request.
    ///
    /// # Errors
    ///
    /// Fails if location access isn't authorized.
    async fn authorize(&self) -> Result<AuthorizationStatus, LocationError>;

    /// Starts streaming. Requires a granted authorization.
    fn open(&self) -> LocationStream;

    /// Checks the permission and starts streaming.
    ///
    /// # Errors
    ///
    /// Fails if location access isn't authorized.
    async fn start(&self) -> Result<LocationStream, LocationError> {
        let status = self.authorize().await?;
        debug!("Location access granted: {}", status);
        Ok(self.open())
    }

    /// Stops streaming. Safe to call when nothing is streaming.
    fn stop(&self);
}

/// A [`LocationManager`] backed by a [`LocationBridge`].
///
/// Requests the permission in advance if it hasn't been determined yet.
pub struct DelegateLocationManager {
    bridge: LocationBridge,
}

impl DelegateLocationManager {
    pub fn new(
        provider: Arc<dyn LocationProvider>,
        config: BridgeConfig,
        settings: &ProviderSettings,
    ) -> Self {
        DelegateLocationManager {
            bridge: LocationBridge::with_settings(provider, config, settings),
        }
    }

    pub fn bridge(&self) -> &LocationBridge {
        &self.bridge
    }
}

#[async_trait]
impl LocationManager for DelegateLocationManager {
    async fn authorize(&self) -> Result<AuthorizationStatus, LocationError> {
        self.bridge.permission().await
    }

    fn open(&self) -> LocationStream {
        self.bridge.start()
    }

    fn stop(&self) {
        self.bridge.finish();
    }
}
