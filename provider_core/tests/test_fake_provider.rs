// SPDX-FileCopyrightText: 2026 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use common::authorization::AuthorizationStatus;
use common::position::LocationSample;
use provider_core::{
    ActivityType, LocationDelegate, LocationProvider, ProviderError, ProviderSettings,
    test_helper::{FakeLocationProvider, sample},
};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct RecordingDelegate {
    locations: Mutex<Vec<Vec<LocationSample>>>,
    errors: Mutex<Vec<String>>,
    statuses: Mutex<Vec<AuthorizationStatus>>,
}

impl LocationDelegate for RecordingDelegate {
    fn did_update_locations(&self, locations: Vec<LocationSample>) {
        self.locations.lock().unwrap().push(locations);
    }

    fn did_fail_with_error(&self, error: ProviderError) {
        self.errors.lock().unwrap().push(error.to_string());
    }

    fn did_change_authorization(&self, status: AuthorizationStatus) {
        self.statuses.lock().unwrap().push(status);
    }
}

fn register(provider: &FakeLocationProvider) -> Arc<RecordingDelegate> {
    let delegate = Arc::new(RecordingDelegate::default());
    let weak: Arc<dyn LocationDelegate> = delegate.clone();
    provider.set_delegate(Some(Arc::downgrade(&weak)));
    delegate
}

#[test]
pub fn callbacks_reach_registered_delegate() {
    let provider = FakeLocationProvider::new(AuthorizationStatus::AuthorizedAlways);
    let delegate = register(&provider);

    provider.emit_locations(vec![sample(1.0, 2.0)]);
    provider.emit_error("gps glitch".into());
    provider.change_authorization(AuthorizationStatus::Denied);

    assert_eq!(*delegate.locations.lock().unwrap(), vec![vec![sample(1.0, 2.0)]]);
    assert_eq!(*delegate.errors.lock().unwrap(), vec!["gps glitch".to_string()]);
    assert_eq!(
        *delegate.statuses.lock().unwrap(),
        vec![AuthorizationStatus::Denied]
    );
    assert_eq!(provider.authorization_status(), AuthorizationStatus::Denied);
}

#[test]
pub fn provider_does_not_keep_delegate_alive() {
    let provider = FakeLocationProvider::new(AuthorizationStatus::AuthorizedAlways);
    let delegate = register(&provider);
    assert!(provider.has_delegate());
    drop(delegate);
    assert!(!provider.has_delegate());
    provider.emit_locations(vec![sample(1.0, 2.0)]);
}

#[test]
pub fn answering_provider_reports_answer_on_request() {
    let provider = FakeLocationProvider::answering(
        AuthorizationStatus::NotDetermined,
        AuthorizationStatus::AuthorizedWhenInUse,
    );
    let delegate = register(&provider);

    provider.request_authorization();

    assert_eq!(provider.request_count(), 1);
    assert_eq!(
        provider.authorization_status(),
        AuthorizationStatus::AuthorizedWhenInUse
    );
    assert_eq!(
        *delegate.statuses.lock().unwrap(),
        vec![AuthorizationStatus::AuthorizedWhenInUse]
    );
}

#[test]
pub fn count_overlapping_subscriptions() {
    let provider = FakeLocationProvider::new(AuthorizationStatus::AuthorizedAlways);
    provider.start_updates();
    provider.start_updates();
    provider.stop_updates();
    provider.start_updates();

    assert_eq!(provider.start_count(), 3);
    assert_eq!(provider.stop_count(), 1);
    assert_eq!(provider.overlapping_starts(), 1);
    assert!(provider.is_updating());
}

#[test]
pub fn deserialize_settings_with_defaults() {
    let settings = ProviderSettings::from_json(
        r#"
        {
            "activity_type": "fitness",
            "distance_filter": 10.0
        }
        "#,
    )
    .unwrap_or_else(|e| panic!("Failed to deserialize the raw json. Reason: {e}"));
    assert_eq!(
        settings,
        ProviderSettings {
            desired_accuracy: None,
            activity_type: ActivityType::Fitness,
            distance_filter: Some(10.0),
            background_updates: false,
        }
    );
}
