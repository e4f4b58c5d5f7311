// SPDX-FileCopyrightText: 2026 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// The authorization of the application to use location services.
///
/// The status is owned by the provider; the streaming layer only mirrors
/// it to decide whether a stream may be started.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum AuthorizationStatus {
    /// The user has not been asked yet.
    #[default]
    NotDetermined,

    /// The user refused access or location services are disabled globally.
    Denied,

    /// The application is not allowed to use location services, e.g. by parental control.
    Restricted,

    /// Access granted while the application is in use.
    AuthorizedWhenInUse,

    /// Access granted at any time, including background updates.
    AuthorizedAlways,
}

impl AuthorizationStatus {
    /// Returns `true` once the user answered the prompt, whatever the answer was.
    pub fn is_determined(&self) -> bool {
        *self != AuthorizationStatus::NotDetermined
    }

    /// Returns `true` if the status allows to start location updates.
    pub fn is_authorized(&self) -> bool {
        matches!(
            self,
            AuthorizationStatus::AuthorizedWhenInUse | AuthorizationStatus::AuthorizedAlways
        )
    }
}
