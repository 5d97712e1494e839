// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for heater control.
//!
//! # Types
//!
//! - [`Model`] - Supported hardware models
//! - [`Property`] - Abstract property names shared by every model
//! - [`Address`] - MIoT service/property id pair
//! - [`LedBrightness`] - Display brightness options
//! - [`RawValue`] - Scalar as sent to or received from the device
//! - [`PropertyValue`] - Decoded, model-independent value

mod led;
mod model;
mod property;
mod value;

pub use led::LedBrightness;
pub use model::Model;
pub use property::{Address, Property};
pub use value::{PropertyValue, RawValue};
