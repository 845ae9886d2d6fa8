#![warn(clippy::all)]
#![allow(clippy::cast_lossless)]

#[macro_use]
mod util;

pub mod clock;
pub mod cpu;
pub mod error;
pub mod log;
pub mod rom;
pub mod system;

pub use clock::{Clock, ClockMode, Edge};
pub use cpu::{Cpu, Phase, Snapshot};
pub use rom::MicrocodeRom;
pub use system::System;

#[macro_use]
extern crate log as logging;
#[macro_use]
extern crate more_asserts;
#[cfg(feature = "serialize")]
#[macro_use]
extern crate serde;
