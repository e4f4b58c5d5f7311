// SPDX-FileCopyrightText: 2026 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

//! Retention strategies for location results
//!
//! A strategy folds a newly received result into the results accumulated so
//! far. Strategies are pure functions, they don't know anything about
//! streaming.

use common::stream::LocationResult;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Common interface of every retention strategy.
pub trait ResultStrategy: Send + Sync {
    /// Returns the new results after incorporating `new_result` into `results`.
    ///
    /// # Parameters
    /// - `results`: The results accumulated so far.
    /// - `new_result`: The result that was just received.
    fn process(
        &self,
        results: Vec<LocationResult>,
        new_result: LocationResult,
    ) -> Vec<LocationResult>;
}

/// Keeps only the last result, the history is discarded.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct KeepLast;

impl ResultStrategy for KeepLast {
    fn process(
        &self,
        _results: Vec<LocationResult>,
        new_result: LocationResult,
    ) -> Vec<LocationResult> {
        vec![new_result]
    }
}

/// Keeps every result in arrival order.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct KeepAll;

impl ResultStrategy for KeepAll {
    fn process(
        &self,
        mut results: Vec<LocationResult>,
        new_result: LocationResult,
    ) -> Vec<LocationResult> {
        results.push(new_result);
        results
    }
}

/// Selects one of the built-in strategies, e.g. from a configuration file or
/// the command line.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Strategy {
    #[default]
    KeepLast,
    KeepAll,
}

impl Strategy {
    /// Creates the strategy implementation for this selection.
    pub fn build(&self) -> Box<dyn ResultStrategy> {
        match self {
            Strategy::KeepLast => Box::new(KeepLast),
            Strategy::KeepAll => Box::new(KeepAll),
        }
    }
}
