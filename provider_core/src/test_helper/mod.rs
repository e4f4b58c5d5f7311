// SPDX-FileCopyrightText: 2026 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use crate::{DelegatePtr, LocationDelegate, LocationProvider, ProviderError, ProviderSettings};
use chrono::{DateTime, Utc};
use common::{
    authorization::AuthorizationStatus,
    position::{LocationSample, Position},
};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::{sync::watch, time::timeout};
use tracing::debug;

/// Creates a [`LocationSample`] with a fixed accuracy and timestamp.
///
/// Two samples created with the same coordinate compare equal, which keeps
/// assertions in tests short.
pub fn sample(latitude: f64, longitude: f64) -> LocationSample {
    LocationSample::new(
        Position::new(latitude, longitude),
        5.0,
        DateTime::<Utc>::default(),
    )
}

#[derive(Default)]
struct FakeProviderState {
    status: AuthorizationStatus,
    answer: Option<AuthorizationStatus>,
    delegate: Option<DelegatePtr>,
    settings: Option<ProviderSettings>,
    request_count: usize,
    start_count: usize,
    stop_count: usize,
    updating: bool,
    overlapping_starts: usize,
}

/// A scriptable [`LocationProvider`] for tests.
///
/// It records every call of the streaming layer and lets the test fire the
/// delegate callbacks, from the test task or from any other thread.
///
/// Callbacks are delivered whether updates are running or not, so late
/// callbacks after a stop can be simulated.
#[derive(Default)]
pub struct FakeLocationProvider {
    state: Mutex<FakeProviderState>,
}

impl FakeLocationProvider {
    /// Creates a provider that reports `status` as current authorization.
    pub fn new(status: AuthorizationStatus) -> Arc<Self> {
        Arc::new(FakeLocationProvider {
            state: Mutex::new(FakeProviderState {
                status,
                ..Default::default()
            }),
        })
    }

    /// Creates a provider that answers an authorization request immediately
    /// with `answer`, from within [`LocationProvider::request_authorization`].
    pub fn answering(status: AuthorizationStatus, answer: AuthorizationStatus) -> Arc<Self> {
        let provider = FakeLocationProvider::new(status);
        provider.lock().answer = Some(answer);
        provider
    }

    fn lock(&self) -> MutexGuard<'_, FakeProviderState> {
        self.state.lock().unwrap_or_else(|state| state.into_inner())
    }

    fn delegate(&self) -> Option<Arc<dyn LocationDelegate>> {
        self.lock().delegate.as_ref().and_then(|d| d.upgrade())
    }

    /// Delivers a batch of positions to the delegate.
    pub fn emit_locations(&self, locations: Vec<LocationSample>) {
        if let Some(delegate) = self.delegate() {
            delegate.did_update_locations(locations);
        }
    }

    /// Delivers a failure to the delegate.
    pub fn emit_error(&self, error: ProviderError) {
        if let Some(delegate) = self.delegate() {
            delegate.did_fail_with_error(error);
        }
    }

    /// Changes the authorization and notifies the delegate about it.
    pub fn change_authorization(&self, status: AuthorizationStatus) {
        self.lock().status = status;
        if let Some(delegate) = self.delegate() {
            delegate.did_change_authorization(status);
        }
    }

    pub fn request_count(&self) -> usize {
        self.lock().request_count
    }

    pub fn start_count(&self) -> usize {
        self.lock().start_count
    }

    pub fn stop_count(&self) -> usize {
        self.lock().stop_count
    }

    /// Returns `true` while updates are started and not stopped yet.
    pub fn is_updating(&self) -> bool {
        self.lock().updating
    }

    /// Returns how often updates were started while they were still running.
    pub fn overlapping_starts(&self) -> usize {
        self.lock().overlapping_starts
    }

    /// Returns `true` if a living delegate is registered.
    pub fn has_delegate(&self) -> bool {
        self.delegate().is_some()
    }

    /// Returns the settings last applied by the streaming layer.
    pub fn settings(&self) -> Option<ProviderSettings> {
        self.lock().settings.clone()
    }
}

impl LocationProvider for FakeLocationProvider {
    fn authorization_status(&self) -> AuthorizationStatus {
        self.lock().status
    }

    fn request_authorization(&self) {
        let answer = {
            let mut state = self.lock();
            state.request_count += 1;
            state.answer.take()
        };
        debug!("FakeLocationProvider authorization requested");
        if let Some(answer) = answer {
            self.change_authorization(answer);
        }
    }

    fn start_updates(&self) {
        let mut state = self.lock();
        if state.updating {
            state.overlapping_starts += 1;
        }
        state.updating = true;
        state.start_count += 1;
    }

    fn stop_updates(&self) {
        let mut state = self.lock();
        state.updating = false;
        state.stop_count += 1;
    }

    fn set_delegate(&self, delegate: Option<DelegatePtr>) {
        self.lock().delegate = delegate;
    }

    fn apply_settings(&self, settings: &ProviderSettings) {
        self.lock().settings = Some(settings.clone());
    }
}

/// Polls `condition` until it holds or `duration` elapsed.
///
/// The total waiting time is divided into ten polling steps, so the check
/// stays responsive without spinning.
///
/// # Panics
///
/// Panics with `what` in the message if the condition doesn't hold in time.
pub async fn wait_until<F>(duration: std::time::Duration, what: &str, mut condition: F)
where
    F: FnMut() -> bool,
{
    let step_duration = duration / 10;
    for _ in 0..10 {
        if condition() {
            return;
        }
        tokio::time::sleep(step_duration).await;
    }
    if !condition() {
        panic!("Condition not reached in {:?}: {}", duration, what);
    }
}

/// Waits until the value observed by `rx` satisfies `predicate` and returns it.
///
/// # Panics
///
/// Panics if no matching value is observed within `duration` or the sender
/// was dropped.
pub async fn wait_for_value<T, F>(
    rx: &mut watch::Receiver<T>,
    duration: std::time::Duration,
    predicate: F,
) -> T
where
    T: Clone + std::fmt::Debug,
    F: FnMut(&T) -> bool,
{
    let result = timeout(duration, async {
        rx.wait_for(predicate).await.map(|value| value.clone())
    })
    .await;
    match result {
        Ok(Ok(value)) => value,
        Ok(Err(e)) => panic!("Observed value sender dropped. Error: {}", e),
        Err(_) => panic!(
            "Expected value not observed in {:?}, last value {:?}",
            duration,
            *rx.borrow()
        ),
    }
}
