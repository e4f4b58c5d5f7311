// SPDX-FileCopyrightText: 2026 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

//! A location provider that replays a route
//!
//! The [`SimulatedLocationProvider`] reports the points of a route in a
//! constant interval and loops over it. The authorization prompt is answered
//! with a scripted status, provider failures can be injected periodically.

use chrono::Utc;
use common::{
    authorization::AuthorizationStatus,
    error::ProviderErrorKind,
    position::{LocationSample, Position},
};
use provider_core::{DelegatePtr, LocationDelegate, LocationProvider, ProviderSettings};
use serde::{Deserialize, Serialize};
use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};
use tokio::{runtime::Handle, task::JoinHandle};
use tracing::{debug, info};

/// Accuracy reported when the settings don't ask for one.
const DEFAULT_ACCURACY_M: f64 = 10.0;

const EARTH_RADIUS_M: f64 = 6_371_000.0;

#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error("The route of the simulation is empty.")]
    EmptyRoute,

    #[error("The simulation requires a tokio runtime: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
}

/// Configuration of a [`SimulatedLocationProvider`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Points reported one after another.
    pub route: Vec<Position>,

    /// Time between two reported points in milliseconds.
    pub interval_ms: u64,

    /// Speed in meters per second attached to every sample.
    pub velocity: Option<f64>,

    /// Authorization the provider starts with.
    pub authorization: AuthorizationStatus,

    /// The user's answer to the authorization prompt. `None` never answers.
    pub answer: Option<AuthorizationStatus>,

    /// Time in milliseconds until the prompt is answered.
    pub answer_delay_ms: u64,

    /// Replaces every n-th point by an unknown location failure.
    pub fail_every: Option<usize>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            route: Vec::new(),
            interval_ms: 1000,
            velocity: None,
            authorization: AuthorizationStatus::NotDetermined,
            answer: Some(AuthorizationStatus::AuthorizedWhenInUse),
            answer_delay_ms: 0,
            fail_every: None,
        }
    }
}

impl SimulationConfig {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[derive(Default)]
struct SimulationState {
    status: AuthorizationStatus,
    delegate: Option<DelegatePtr>,
    settings: ProviderSettings,
    updates: Option<JoinHandle<()>>,
}

/// State shared between the provider and its background tasks.
struct Shared {
    config: SimulationConfig,
    state: Mutex<SimulationState>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, SimulationState> {
        self.state.lock().unwrap_or_else(|state| state.into_inner())
    }

    /// Upgrades the delegate, the callback must run without holding the lock.
    fn delegate(&self) -> Option<Arc<dyn LocationDelegate>> {
        self.lock().delegate.as_ref().and_then(|d| d.upgrade())
    }
}

/// Walks the route and decides what each tick reports.
struct RouteRuntime {
    shared: Arc<Shared>,
    next_position: usize,
    tick: usize,
    last_reported: Option<Position>,
}

impl RouteRuntime {
    fn handle_tick(&mut self) {
        self.tick += 1;
        let Some(delegate) = self.shared.delegate() else {
            return;
        };

        if let Some(fail_every) = self.shared.config.fail_every
            && fail_every > 0
            && self.tick % fail_every == 0
        {
            debug!("Injecting location failure at tick {}", self.tick);
            delegate.did_fail_with_error(Box::new(ProviderErrorKind::LocationUnknown));
            return;
        }

        let route = &self.shared.config.route;
        let position = route[self.next_position % route.len()];
        self.next_position = (self.next_position + 1) % route.len();

        let settings = self.shared.lock().settings.clone();
        if let (Some(filter), Some(last)) = (settings.distance_filter, self.last_reported)
            && distance_m(&last, &position) < filter
        {
            return;
        }
        self.last_reported = Some(position);

        let mut sample = LocationSample::new(
            position,
            settings.desired_accuracy.unwrap_or(DEFAULT_ACCURACY_M),
            Utc::now(),
        );
        if let Some(velocity) = self.shared.config.velocity {
            sample = sample.with_speed(velocity);
        }
        delegate.did_update_locations(vec![sample]);
    }
}

/// Great circle distance between two points in meters.
fn distance_m(from: &Position, to: &Position) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let d_lat = lat2 - lat1;
    let d_lon = (to.longitude - from.longitude).to_radians();
    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().asin()
}

async fn route_task(shared: Arc<Shared>) {
    let mut timer = tokio::time::interval(Duration::from_millis(shared.config.interval_ms.max(1)));
    // The first tick of an interval completes immediately.
    timer.tick().await;
    let mut runtime = RouteRuntime {
        shared,
        next_position: 0,
        tick: 0,
        last_reported: None,
    };
    loop {
        timer.tick().await;
        runtime.handle_tick();
    }
}

async fn answer_task(shared: Arc<Shared>, answer: AuthorizationStatus) {
    tokio::time::sleep(Duration::from_millis(shared.config.answer_delay_ms)).await;
    shared.lock().status = answer;
    info!("Simulated user answered the authorization prompt: {}", answer);
    if let Some(delegate) = shared.delegate() {
        delegate.did_change_authorization(answer);
    }
}

/// A [`LocationProvider`] that replays a route on the tokio runtime it was
/// created on.
pub struct SimulatedLocationProvider {
    shared: Arc<Shared>,
    runtime: Handle,
}

impl SimulatedLocationProvider {
    /// Creates the provider on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// [`SimulationError::EmptyRoute`] if the route has no points,
    /// [`SimulationError::NoRuntime`] if called outside of a tokio runtime.
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        if config.route.is_empty() {
            return Err(SimulationError::EmptyRoute);
        }
        let runtime = Handle::try_current()?;
        let status = config.authorization;
        Ok(SimulatedLocationProvider {
            shared: Arc::new(Shared {
                config,
                state: Mutex::new(SimulationState {
                    status,
                    ..Default::default()
                }),
            }),
            runtime,
        })
    }

    /// Returns `true` while the route is replayed.
    pub fn is_updating(&self) -> bool {
        self.shared.lock().updates.is_some()
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.shared.config
    }
}

impl LocationProvider for SimulatedLocationProvider {
    fn authorization_status(&self) -> AuthorizationStatus {
        self.shared.lock().status
    }

    fn request_authorization(&self) {
        if self.authorization_status().is_determined() {
            debug!("Authorization already determined, ignoring request");
            return;
        }
        match self.shared.config.answer {
            Some(answer) => {
                self.runtime.spawn(answer_task(self.shared.clone(), answer));
            }
            None => info!("Authorization prompt shown, it will never be answered"),
        }
    }

    fn start_updates(&self) {
        let mut state = self.shared.lock();
        if state.updates.is_some() {
            debug!("Simulated updates already running");
            return;
        }
        info!("Replaying route of {} points", self.shared.config.route.len());
        state.updates = Some(self.runtime.spawn(route_task(self.shared.clone())));
    }

    fn stop_updates(&self) {
        if let Some(updates) = self.shared.lock().updates.take() {
            info!("Stopping route replay");
            updates.abort();
        }
    }

    fn set_delegate(&self, delegate: Option<DelegatePtr>) {
        self.shared.lock().delegate = delegate;
    }

    fn apply_settings(&self, settings: &ProviderSettings) {
        self.shared.lock().settings = settings.clone();
    }
}

impl Drop for SimulatedLocationProvider {
    fn drop(&mut self) {
        self.stop_updates();
    }
}

#[cfg(test)]
mod tests;
