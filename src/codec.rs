// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Conversions between raw device values and semantic values.
//!
//! Two encodings differ between models:
//!
//! - **LED brightness**: most models use `0 = on, 1 = off`. The za2 has a
//!   third `dim` level and stores every non-zero value inverted (`3 - raw`).
//!   The per-model choice is captured by [`LedCodec`].
//! - **Shutoff timer**: devices store whole hours, callers work in seconds.

use crate::types::{LedBrightness, Model};

const SECONDS_PER_HOUR: i64 = 3600;

/// LED brightness encoding strategy of a model.
///
/// # Examples
///
/// ```
/// use miheater_lib::codec::LedCodec;
/// use miheater_lib::types::{LedBrightness, Model};
///
/// let codec = LedCodec::for_model(Model::Za2);
/// assert_eq!(codec.decode(1), LedBrightness::Dim);
/// assert_eq!(codec.encode(LedBrightness::Off), Some(2));
///
/// let codec = LedCodec::for_model(Model::Mc2);
/// assert_eq!(codec.decode(1), LedBrightness::Off);
/// assert_eq!(codec.encode(LedBrightness::Dim), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedCodec {
    /// Two levels, `0 = on, 1 = off`.
    Canonical,
    /// Three levels; non-zero raw values are stored as `3 - v`.
    Inverted,
}

impl LedCodec {
    const TWO_LEVELS: [LedBrightness; 2] = [LedBrightness::On, LedBrightness::Off];
    const THREE_LEVELS: [LedBrightness; 3] =
        [LedBrightness::On, LedBrightness::Off, LedBrightness::Dim];

    /// Returns the strategy used by a model.
    #[must_use]
    pub const fn for_model(model: Model) -> Self {
        match model {
            Model::Za2 => Self::Inverted,
            Model::Mc2 | Model::Mc2a | Model::Zb1 | Model::Bs1s => Self::Canonical,
        }
    }

    /// Returns the options a caller may write.
    #[must_use]
    pub fn supported_options(&self) -> &'static [LedBrightness] {
        match self {
            Self::Canonical => &Self::TWO_LEVELS,
            Self::Inverted => &Self::THREE_LEVELS,
        }
    }

    /// Returns whether `option` can be written.
    #[must_use]
    pub fn supports(&self, option: LedBrightness) -> bool {
        self.supported_options().contains(&option)
    }

    /// Decodes a raw device value. Unrecognized values map to
    /// [`LedBrightness::Unknown`].
    #[must_use]
    pub const fn decode(&self, raw: i64) -> LedBrightness {
        let canonical = match self {
            Self::Inverted if raw != 0 => 3 - raw,
            Self::Inverted | Self::Canonical => raw,
        };
        match canonical {
            0 => LedBrightness::On,
            1 => LedBrightness::Off,
            2 => LedBrightness::Dim,
            _ => LedBrightness::Unknown,
        }
    }

    /// Encodes an option into its raw device value.
    ///
    /// Returns `None` for options the model cannot represent; callers are
    /// expected to have rejected those already.
    #[must_use]
    pub fn encode(&self, option: LedBrightness) -> Option<i64> {
        if !self.supports(option) {
            return None;
        }
        let canonical = match option {
            LedBrightness::On => 0,
            LedBrightness::Off => 1,
            LedBrightness::Dim => 2,
            LedBrightness::Unknown => return None,
        };
        Some(match self {
            Self::Inverted if canonical != 0 => 3 - canonical,
            Self::Inverted | Self::Canonical => canonical,
        })
    }
}

/// Decodes a raw LED brightness value for a model.
#[must_use]
pub const fn decode_led_brightness(model: Model, raw: i64) -> LedBrightness {
    LedCodec::for_model(model).decode(raw)
}

/// Encodes an LED brightness option for a model.
#[must_use]
pub fn encode_led_brightness(model: Model, option: LedBrightness) -> Option<i64> {
    LedCodec::for_model(model).encode(option)
}

/// Converts the device's hour-granularity timer to seconds.
#[must_use]
pub const fn countdown_hours_to_seconds(hours: i64) -> i64 {
    hours * SECONDS_PER_HOUR
}

/// Converts seconds to whole timer hours, truncating toward zero.
#[must_use]
pub const fn seconds_to_countdown_hours(seconds: i64) -> i64 {
    seconds / SECONDS_PER_HOUR
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn za2_decode_table() {
        assert_eq!(decode_led_brightness(Model::Za2, 0), LedBrightness::On);
        assert_eq!(decode_led_brightness(Model::Za2, 1), LedBrightness::Dim);
        assert_eq!(decode_led_brightness(Model::Za2, 2), LedBrightness::Off);
        assert_eq!(decode_led_brightness(Model::Za2, 3), LedBrightness::Unknown);
    }

    #[test]
    fn canonical_decode_table() {
        for model in [Model::Mc2, Model::Mc2a, Model::Bs1s] {
            assert_eq!(decode_led_brightness(model, 0), LedBrightness::On);
            assert_eq!(decode_led_brightness(model, 1), LedBrightness::Off);
            assert_eq!(decode_led_brightness(model, 2), LedBrightness::Dim);
            assert_eq!(decode_led_brightness(model, 7), LedBrightness::Unknown);
            assert_eq!(decode_led_brightness(model, -1), LedBrightness::Unknown);
        }
    }

    #[test]
    fn round_trip_supported_options() {
        for model in Model::ALL {
            let codec = LedCodec::for_model(model);
            for &option in codec.supported_options() {
                let raw = encode_led_brightness(model, option).unwrap();
                assert_eq!(decode_led_brightness(model, raw), option, "{model}");
            }
        }
    }

    #[test]
    fn dim_only_on_three_level_model() {
        assert!(LedCodec::for_model(Model::Za2).supports(LedBrightness::Dim));
        for model in [Model::Mc2, Model::Mc2a, Model::Zb1, Model::Bs1s] {
            assert!(!LedCodec::for_model(model).supports(LedBrightness::Dim));
            assert_eq!(encode_led_brightness(model, LedBrightness::Dim), None);
        }
    }

    #[test]
    fn unknown_never_encodes() {
        for model in Model::ALL {
            assert_eq!(encode_led_brightness(model, LedBrightness::Unknown), None);
        }
    }

    #[test]
    fn countdown_conversion() {
        assert_eq!(countdown_hours_to_seconds(8), 28_800);
        assert_eq!(seconds_to_countdown_hours(30_000), 8);
        assert_eq!(seconds_to_countdown_hours(3599), 0);
    }

    #[test]
    fn hour_truncation_is_bounded() {
        for s in (0..=50_000).step_by(37) {
            let h = seconds_to_countdown_hours(s);
            assert!(countdown_hours_to_seconds(h) <= s);
            assert!(s < countdown_hours_to_seconds(h + 1));
        }
    }
}
