// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Supported heater models.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A heater hardware model, identified by its manufacturer model string.
///
/// The set is closed: every variant has a property table and limits, so
/// lookups keyed by `Model` cannot miss. Unknown strings are rejected once,
/// when parsed.
///
/// # Examples
///
/// ```
/// use miheater_lib::types::Model;
///
/// let model: Model = "zhimi.heater.za2".parse().unwrap();
/// assert_eq!(model, Model::Za2);
/// assert_eq!(model.as_str(), "zhimi.heater.za2");
///
/// assert!("zhimi.heater.xx9".parse::<Model>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Model {
    /// Xiaomi Smart Space Heater S (`zhimi.heater.mc2`).
    Mc2,
    /// Xiaomi Smart Space Heater S, revised (`zhimi.heater.mc2a`).
    Mc2a,
    /// Xiaomi Smart Space Heater 1S (`zhimi.heater.za2`).
    Za2,
    /// Xiaomi Baseboard Heater (`zhimi.heater.zb1`).
    Zb1,
    /// Leshow heater BS1S (`leshow.heater.bs1s`).
    Bs1s,
}

impl Model {
    /// Every supported model.
    pub const ALL: [Self; 5] = [Self::Mc2, Self::Mc2a, Self::Za2, Self::Zb1, Self::Bs1s];

    /// Returns the manufacturer model string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Mc2 => "zhimi.heater.mc2",
            Self::Mc2a => "zhimi.heater.mc2a",
            Self::Za2 => "zhimi.heater.za2",
            Self::Zb1 => "zhimi.heater.zb1",
            Self::Bs1s => "leshow.heater.bs1s",
        }
    }

    /// Returns the vendor name shown to users.
    #[must_use]
    pub const fn manufacturer(&self) -> &'static str {
        match self {
            Self::Mc2 | Self::Mc2a | Self::Za2 | Self::Zb1 => "Xiaomi",
            Self::Bs1s => "Leshow",
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Model {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|model| model.as_str() == s.trim())
            .ok_or_else(|| Error::UnsupportedModel(s.to_string()))
    }
}
