// SPDX-FileCopyrightText: 2026 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use common::authorization::AuthorizationStatus;
use std::str::FromStr;

#[test]
pub fn only_when_in_use_and_always_are_authorized() {
    assert!(AuthorizationStatus::AuthorizedWhenInUse.is_authorized());
    assert!(AuthorizationStatus::AuthorizedAlways.is_authorized());
    assert!(!AuthorizationStatus::NotDetermined.is_authorized());
    assert!(!AuthorizationStatus::Denied.is_authorized());
    assert!(!AuthorizationStatus::Restricted.is_authorized());
}

#[test]
pub fn every_answer_except_not_determined_is_determined() {
    assert!(!AuthorizationStatus::NotDetermined.is_determined());
    assert!(AuthorizationStatus::Denied.is_determined());
    assert!(AuthorizationStatus::Restricted.is_determined());
    assert!(AuthorizationStatus::AuthorizedWhenInUse.is_determined());
}

#[test]
pub fn parse_status_from_kebab_case() {
    assert_eq!(
        AuthorizationStatus::from_str("authorized-when-in-use").unwrap(),
        AuthorizationStatus::AuthorizedWhenInUse
    );
    assert_eq!(AuthorizationStatus::Restricted.to_string(), "restricted");
    assert!(AuthorizationStatus::from_str("granted").is_err());
}
