// SPDX-FileCopyrightText: 2026 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

//! Common Modul for the location streamer
//!
//! Provides the common data types that are shared by the provider seam,
//! the bridge and the observable streamer.

pub mod authorization;
pub mod error;
pub mod position;
pub mod stream;
