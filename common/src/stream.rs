// SPDX-FileCopyrightText: 2026 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use crate::{error::LocationError, position::LocationSample};
use serde::{Deserialize, Serialize};

/// One item of a location stream.
///
/// Every provider callback produces exactly one result: either the batch of
/// samples it delivered or the error it reported.
pub type LocationResult = Result<Vec<LocationSample>, LocationError>;

/// Whether a streamer currently runs a provider session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StreamingState {
    /// Not streaming.
    #[default]
    Idle,

    /// Streaming has been started.
    Streaming,
}
