// SPDX-FileCopyrightText: 2026 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use serde::{Deserialize, Serialize};

/// Local classification of a failure reported by a location provider.
///
/// Providers report their own error types; whatever can't be classified
/// ends up as [`ProviderErrorKind::LocationUnknown`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderErrorKind {
    /// The provider was unable to obtain a location right now.
    #[error("The location is currently unknown.")]
    LocationUnknown,

    /// Access to location services was revoked while updates were running.
    #[error("Access to the location service was denied.")]
    Denied,

    /// The heading could not be determined.
    #[error("The heading could not be determined.")]
    HeadingFailure,

    /// The provider's positioning backend is not reachable.
    #[error("The location backend is not reachable.")]
    Network,

    /// Any other failure the provider classified itself.
    #[error("The location provider reported a failure.")]
    Other,
}

/// Errors of the location streaming layer.
///
/// Permission and guard errors are returned directly from `start`. Provider
/// and termination errors are delivered in-band as the failure variant of a
/// [`crate::stream::LocationResult`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "error", content = "kind", rename_all = "kebab-case")]
pub enum LocationError {
    /// Access was denied or restricted by the user or the system.
    #[error("Access was denied by the user.")]
    AccessNotAuthorized,

    /// Attempt to launch streaming while it's already running.
    #[error("Attempted to start streaming while it's already running.")]
    StreamingAlreadyStarted,

    /// Another authorization request of the same negotiator is still waiting for an answer.
    #[error("An authorization request is already pending.")]
    PermissionRequestPending,

    /// The stream was cancelled before it was finished by its owner.
    #[error("The stream was cancelled or terminated.")]
    StreamCanceled,

    /// The stream closed without a known reason.
    #[error("The stream was cancelled or terminated due to an unknown error.")]
    StreamUnknownTermination,

    /// A failure reported by the location provider during an active session.
    #[error("{0}")]
    Provider(ProviderErrorKind),
}

impl From<ProviderErrorKind> for LocationError {
    fn from(kind: ProviderErrorKind) -> Self {
        LocationError::Provider(kind)
    }
}
