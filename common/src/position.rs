// SPDX-FileCopyrightText: 2026 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Represents a geographical coordinate with latitude and longitude.
///
/// Latitude values range from -90.0 to 90.0, and longitude values range
/// from -180.0 to 180.0. Used for route points of simulated providers.
///
/// # Example
///
/// ```rust
/// use common::position::Position;
///
/// let pos = Position {
///     latitude: 52.5200,
///     longitude: 13.4050,
/// };
///
/// println!("{:?}", pos);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

impl Position {
    /// Creates a new [`Position`] with the given latitude and longitude.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Position {
            latitude,
            longitude,
        }
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// A single positional reading reported by a location provider.
///
/// Samples are immutable values. The streaming layer never interprets
/// them, it only forwards them from the provider to the consumer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocationSample {
    latitude: f64,
    longitude: f64,
    altitude: Option<f64>,
    horizontal_accuracy: f64,
    speed: Option<f64>,
    timestamp: DateTime<Utc>,
}

impl LocationSample {
    /// Creates a new [`LocationSample`] without altitude and speed information.
    ///
    /// # Arguments
    ///
    /// * `position` – Coordinate of the reading in decimal degrees.
    /// * `horizontal_accuracy` – Radius of uncertainty in meters.
    /// * `timestamp` – Time of the reading in UTC.
    ///
    /// # Example
    ///
    /// ```rust
    /// use common::position::{LocationSample, Position};
    ///
    /// let sample = LocationSample::new(Position::new(52.0, 13.0), 5.0, chrono::Utc::now());
    /// assert_eq!(sample.latitude(), 52.0);
    /// ```
    pub fn new(position: Position, horizontal_accuracy: f64, timestamp: DateTime<Utc>) -> Self {
        LocationSample {
            latitude: position.latitude,
            longitude: position.longitude,
            altitude: None,
            horizontal_accuracy,
            speed: None,
            timestamp,
        }
    }

    /// Returns a copy of this sample carrying the given altitude in meters.
    pub fn with_altitude(mut self, altitude: f64) -> Self {
        self.altitude = Some(altitude);
        self
    }

    /// Returns a copy of this sample carrying the given speed in meters per second.
    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn altitude(&self) -> Option<f64> {
        self.altitude
    }

    /// Returns the radius of uncertainty in meters.
    pub fn horizontal_accuracy(&self) -> f64 {
        self.horizontal_accuracy
    }

    /// Returns the speed in meters per second, if the provider reported one.
    pub fn speed(&self) -> Option<f64> {
        self.speed
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Returns the coordinate of this sample.
    pub fn position(&self) -> Position {
        Position::new(self.latitude, self.longitude)
    }
}
