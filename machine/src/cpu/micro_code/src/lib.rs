#![warn(clippy::all)]

pub mod address;
pub mod micro_code;

pub use address::RomAddress;
pub use micro_code::{ControlSignals, Signal};

#[cfg(feature = "serialize")]
#[macro_use]
extern crate serde;
