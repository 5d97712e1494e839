// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! LED brightness options.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// Display brightness of a heater.
///
/// `Dim` exists on three-level models only. `Unknown` is what a raw value
/// the codec does not recognize decodes to; it can never be written.
///
/// # Examples
///
/// ```
/// use miheater_lib::types::LedBrightness;
///
/// let option: LedBrightness = "dim".parse().unwrap();
/// assert_eq!(option, LedBrightness::Dim);
/// assert_eq!(LedBrightness::Off.to_string(), "off");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedBrightness {
    /// Full brightness.
    On,
    /// Display off.
    Off,
    /// Reduced brightness.
    Dim,
    /// Unrecognized device value.
    Unknown,
}

impl LedBrightness {
    /// Returns the option name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
            Self::Dim => "dim",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for LedBrightness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LedBrightness {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "on" => Ok(Self::On),
            "off" => Ok(Self::Off),
            "dim" => Ok(Self::Dim),
            _ => Err(ValueError::InvalidLedBrightness(s.to_string())),
        }
    }
}
