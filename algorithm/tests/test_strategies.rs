// SPDX-FileCopyrightText: 2026 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use algorithm::{KeepAll, KeepLast, ResultStrategy, Strategy};
use chrono::{DateTime, Utc};
use common::{
    error::{LocationError, ProviderErrorKind},
    position::{LocationSample, Position},
    stream::LocationResult,
};
use std::str::FromStr;

fn success(latitude: f64) -> LocationResult {
    Ok(vec![LocationSample::new(
        Position::new(latitude, 11.0),
        5.0,
        DateTime::<Utc>::default(),
    )])
}

fn failure() -> LocationResult {
    Err(LocationError::Provider(ProviderErrorKind::LocationUnknown))
}

fn feed(strategy: &dyn ResultStrategy, items: &[LocationResult]) -> Vec<Vec<LocationResult>> {
    let mut results = Vec::new();
    let mut snapshots = Vec::new();
    for item in items {
        results = strategy.process(results, item.clone());
        snapshots.push(results.clone());
    }
    snapshots
}

#[test]
pub fn keep_last_holds_only_the_newest_result() {
    let items = vec![success(1.0), success(2.0), failure(), success(3.0)];
    let snapshots = feed(&KeepLast, &items);
    for (snapshot, item) in snapshots.iter().zip(items.iter()) {
        assert_eq!(snapshot, &vec![item.clone()]);
    }
}

#[test]
pub fn keep_all_appends_in_arrival_order() {
    let items = vec![success(1.0), success(2.0), failure(), success(3.0)];
    let snapshots = feed(&KeepAll, &items);
    for (count, snapshot) in snapshots.iter().enumerate() {
        assert_eq!(snapshot.len(), count + 1);
        assert_eq!(snapshot[..], items[..=count]);
    }
}

#[test]
pub fn keep_last_discards_existing_history() {
    let results = KeepLast.process(vec![success(1.0), success(2.0)], failure());
    assert_eq!(results, vec![failure()]);
}

#[test]
pub fn three_batches_and_an_error() {
    let items = vec![success(1.0), success(2.0), success(3.0), failure()];

    let all = feed(&KeepAll, &items).pop().unwrap();
    assert_eq!(all.len(), 4);
    assert!(all[..3].iter().all(|r| r.is_ok()));
    assert!(all[3].is_err());

    let last = feed(&KeepLast, &items).pop().unwrap();
    assert_eq!(last, vec![failure()]);
}

#[test]
pub fn build_strategy_from_name() {
    let strategy = Strategy::from_str("keep-all").unwrap().build();
    let results = strategy.process(vec![success(1.0)], success(2.0));
    assert_eq!(results.len(), 2);
    assert_eq!(Strategy::default(), Strategy::KeepLast);
    assert!(Strategy::from_str("keep-some").is_err());
}
