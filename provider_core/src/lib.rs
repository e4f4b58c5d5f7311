// SPDX-FileCopyrightText: 2026 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

//! Provider seam of the location streamer
//!
//! Defines the interface of a push based platform location provider and the
//! delegate it notifies. Everything above this crate only talks to a provider
//! through these two traits.

use common::{authorization::AuthorizationStatus, position::LocationSample};
use serde::{Deserialize, Serialize};
use std::sync::Weak;
use strum_macros::{Display, EnumString};

/// An error as reported by a concrete provider implementation.
///
/// The bridge classifies it into a [`common::error::ProviderErrorKind`] by
/// downcasting; anything else is treated as an unknown location.
pub type ProviderError = Box<dyn std::error::Error + Send + Sync>;

/// A weak reference to the delegate registered in a provider.
///
/// Providers never keep their delegate alive, the owner of the delegate does.
pub type DelegatePtr = Weak<dyn LocationDelegate>;

/// Callback interface a provider notifies about new positions, failures and
/// authorization changes.
///
/// The callbacks may arrive on any thread of the provider, implementations
/// must not block.
pub trait LocationDelegate: Send + Sync {
    /// A new batch of positions is available.
    fn did_update_locations(&self, locations: Vec<LocationSample>);

    /// The provider failed to retrieve a position.
    fn did_fail_with_error(&self, error: ProviderError);

    /// The authorization of the application changed.
    fn did_change_authorization(&self, status: AuthorizationStatus);
}

/// Common interface that every location provider must support.
pub trait LocationProvider: Send + Sync {
    /// Returns the current authorization of the application.
    fn authorization_status(&self) -> AuthorizationStatus;

    /// Asks the user for permission to use location services.
    ///
    /// The answer is reported asynchronously through
    /// [`LocationDelegate::did_change_authorization`].
    fn request_authorization(&self);

    /// Starts producing position updates for the registered delegate.
    fn start_updates(&self);

    /// Stops producing position updates.
    fn stop_updates(&self);

    /// Registers the delegate that is notified on changes, `None` removes it.
    fn set_delegate(&self, delegate: Option<DelegatePtr>);

    /// Passes the settings to the provider. They are not interpreted by the
    /// streaming layer.
    fn apply_settings(&self, settings: &ProviderSettings);
}

/// The type of user activity the position updates are used for.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ActivityType {
    #[default]
    Other,
    AutomotiveNavigation,
    Fitness,
    OtherNavigation,
    Airborne,
}

/// Settings of a provider session.
///
/// The streaming layer passes them through unmodified.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Desired accuracy in meters. `None` asks for the best accuracy available.
    pub desired_accuracy: Option<f64>,

    /// The activity the updates are used for.
    pub activity_type: ActivityType,

    /// Minimum distance in meters the device must move before an update is
    /// generated. `None` reports every movement.
    pub distance_filter: Option<f64>,

    /// Whether updates continue while the application is in the background.
    pub background_updates: bool,
}

impl ProviderSettings {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

pub mod test_helper;
