// SPDX-FileCopyrightText: 2026 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use common::{authorization::AuthorizationStatus, error::LocationError};
use provider_core::LocationProvider;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

struct NegotiatorState {
    /// The last status reported by the provider.
    status: AuthorizationStatus,
    /// Resolves the caller waiting for the user's answer.
    pending: Option<oneshot::Sender<AuthorizationStatus>>,
}

impl NegotiatorState {
    /// A request whose caller went away no longer counts as outstanding.
    fn has_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|pending| !pending.is_closed())
    }
}

enum RequestState {
    Determined(AuthorizationStatus),
    Waiting(oneshot::Receiver<AuthorizationStatus>),
}

/// An authorization request started by [`PermissionNegotiator::begin_request`].
///
/// The request doesn't borrow the negotiator, it resolves even if the
/// negotiator is dropped in the meantime.
pub struct AuthorizationRequest {
    state: RequestState,
}

impl AuthorizationRequest {
    /// Waits for the answer of the user.
    ///
    /// Returns [`AuthorizationStatus::NotDetermined`] if the negotiator was
    /// dropped before an answer arrived.
    pub async fn status(self) -> AuthorizationStatus {
        match self.state {
            RequestState::Determined(status) => status,
            RequestState::Waiting(receiver) => {
                receiver.await.unwrap_or(AuthorizationStatus::NotDetermined)
            }
        }
    }
}

/// Turns the provider's callback based authorization prompt into a single
/// awaitable request.
///
/// The answer is delivered by whoever receives the provider's authorization
/// callbacks through [`PermissionNegotiator::authorization_changed`]. Only one
/// request may be outstanding at a time.
///
/// Dropping the negotiator while a request is outstanding resumes the waiting
/// caller with [`AuthorizationStatus::NotDetermined`].
pub struct PermissionNegotiator {
    provider: Arc<dyn LocationProvider>,
    state: Mutex<NegotiatorState>,
}

impl PermissionNegotiator {
    pub fn new(provider: Arc<dyn LocationProvider>) -> Self {
        let status = provider.authorization_status();
        PermissionNegotiator {
            provider,
            state: Mutex::new(NegotiatorState {
                status,
                pending: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, NegotiatorState> {
        self.state.lock().unwrap_or_else(|state| state.into_inner())
    }

    /// Starts an authorization request.
    ///
    /// If the provider already knows the answer the returned request is
    /// resolved. Otherwise the provider's prompt is triggered and the request
    /// resolves once a determined status is reported.
    ///
    /// # Errors
    ///
    /// [`LocationError::PermissionRequestPending`] if another request of this
    /// negotiator is still waiting.
    pub fn begin_request(&self) -> Result<AuthorizationRequest, LocationError> {
        let receiver = {
            let mut state = self.lock();
            state.status = self.provider.authorization_status();
            if state.status.is_determined() {
                debug!("Authorization already determined: {}", state.status);
                return Ok(AuthorizationRequest {
                    state: RequestState::Determined(state.status),
                });
            }
            if state.has_pending() {
                warn!("Authorization requested while another request is pending");
                return Err(LocationError::PermissionRequestPending);
            }
            let (sender, receiver) = oneshot::channel();
            state.pending = Some(sender);
            receiver
        };

        // The provider may answer from within this call.
        info!("Requesting location authorization");
        self.provider.request_authorization();
        Ok(AuthorizationRequest {
            state: RequestState::Waiting(receiver),
        })
    }

    /// Returns the authorization status once it is determined.
    ///
    /// See [`PermissionNegotiator::begin_request`].
    pub async fn request_authorization(&self) -> Result<AuthorizationStatus, LocationError> {
        Ok(self.begin_request()?.status().await)
    }

    /// Requests the authorization and requires it to allow location updates.
    ///
    /// # Errors
    ///
    /// [`LocationError::AccessNotAuthorized`] for every status other than
    /// [`AuthorizationStatus::AuthorizedWhenInUse`] and
    /// [`AuthorizationStatus::AuthorizedAlways`].
    pub async fn grant(&self) -> Result<AuthorizationStatus, LocationError> {
        let status = self.request_authorization().await?;
        if !status.is_authorized() {
            info!("Location access not authorized: {}", status);
            return Err(LocationError::AccessNotAuthorized);
        }
        Ok(status)
    }

    /// Records a new authorization status reported by the provider.
    ///
    /// A determined status resumes the outstanding request, if any.
    pub fn authorization_changed(&self, status: AuthorizationStatus) {
        let mut state = self.lock();
        state.status = status;
        if !status.is_determined() {
            return;
        }
        if let Some(pending) = state.pending.take() {
            debug!("Resuming authorization request with {}", status);
            let _ = pending.send(status);
        }
    }

    /// Returns the last status known to the negotiator.
    pub fn status(&self) -> AuthorizationStatus {
        self.lock().status
    }

    /// Returns `true` while a request waits for the user's answer.
    pub fn is_pending(&self) -> bool {
        self.lock().has_pending()
    }
}

impl Drop for PermissionNegotiator {
    fn drop(&mut self) {
        if let Some(pending) = self.lock().pending.take() {
            debug!("PermissionNegotiator dropped with pending request");
            let _ = pending.send(AuthorizationStatus::NotDetermined);
        }
    }
}
