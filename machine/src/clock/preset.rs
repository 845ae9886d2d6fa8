use std::str::FromStr;

use num_derive::FromPrimitive;

use super::ClockMode;
use crate::error::{self, Result};

/// Named frequencies for the configuration surface.
#[derive(Copy, Clone, Debug, PartialEq, Eq, FromPrimitive)]
pub enum Preset {
    /// 0.5 Hz, for probing a breadboard by hand.
    Breadboard,
    /// 1 Hz, every step visible.
    Slow,
    /// 10 Hz.
    Normal,
    /// 100 Hz.
    Fast,
    /// 1 kHz.
    Turbo,
    /// 16 MHz, the Arduino crystal.
    Arduino,
}

impl Default for Preset {
    fn default() -> Self {
        Preset::Normal
    }
}

impl Preset {
    pub fn frequency_hz(self) -> f64 {
        use Preset::*;
        match self {
            Breadboard => 0.5,
            Slow => 1.,
            Normal => 10.,
            Fast => 100.,
            Turbo => 1_000.,
            Arduino => 16e6,
        }
    }

    pub fn name(self) -> &'static str {
        use Preset::*;
        match self {
            Breadboard => "breadboard",
            Slow => "slow",
            Normal => "normal",
            Fast => "fast",
            Turbo => "turbo",
            Arduino => "arduino",
        }
    }
}

impl FromStr for Preset {
    type Err = error::Type;

    fn from_str(name: &str) -> Result<Preset> {
        use Preset::*;
        match name.to_ascii_lowercase().as_str() {
            "breadboard" => Ok(Breadboard),
            "slow" => Ok(Slow),
            "normal" => Ok(Normal),
            "fast" => Ok(Fast),
            "turbo" => Ok(Turbo),
            "arduino" => Ok(Arduino),
            _ => Err(error::Type::UnknownPreset(name.into())),
        }
    }
}

/// Where the clock signal nominally comes from. Only `Manual` behaves differently; the rest are
/// software-timed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ClockSource {
    Emulator,
    Arduino,
    Timer555,
    Manual,
}

impl ClockSource {
    pub fn mode(self) -> ClockMode {
        match self {
            ClockSource::Emulator | ClockSource::Arduino | ClockSource::Timer555 => {
                ClockMode::Continuous
            }
            ClockSource::Manual => ClockMode::Manual,
        }
    }
}

impl FromStr for ClockSource {
    type Err = error::Type;

    fn from_str(name: &str) -> Result<ClockSource> {
        match name.to_ascii_lowercase().as_str() {
            "emulator" => Ok(ClockSource::Emulator),
            "arduino" => Ok(ClockSource::Arduino),
            "555" | "timer555" | "555_timer" => Ok(ClockSource::Timer555),
            "manual" => Ok(ClockSource::Manual),
            _ => Err(error::Type::UnknownClockSource(name.into())),
        }
    }
}
