// SPDX-FileCopyrightText: 2026 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use chrono::{DateTime, Utc};
use common::position::{LocationSample, Position};
use std::str::FromStr;

fn get_location_sample_as_json<'a>() -> &'a str {
    r#"
    {
        "latitude": 52.025833,
        "longitude": 11.279166,
        "altitude": 87.5,
        "horizontal_accuracy": 4.0,
        "speed": null,
        "timestamp": "2005-06-08T10:34:48.283Z"
    }
    "#
}

fn get_location_sample() -> LocationSample {
    LocationSample::new(
        Position::new(52.025833, 11.279166),
        4.0,
        DateTime::<Utc>::from_str("2005-06-08T10:34:48.283Z").unwrap(),
    )
    .with_altitude(87.5)
}

#[test]
pub fn deserialize_location_sample_from_json() {
    let sample = LocationSample::from_json(get_location_sample_as_json())
        .unwrap_or_else(|e| panic!("Failed to deserialize the raw json. Reason: {e}"));
    assert_eq!(sample, get_location_sample());
}

#[test]
pub fn location_sample_keeps_reported_values() {
    let sample = get_location_sample().with_speed(12.5);
    assert_eq!(sample.position(), Position::new(52.025833, 11.279166));
    assert_eq!(sample.altitude(), Some(87.5));
    assert_eq!(sample.speed(), Some(12.5));
    assert_eq!(sample.horizontal_accuracy(), 4.0);
}
