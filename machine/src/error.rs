use std::fmt;

use micro_code::address::ROM_BYTES;
use micro_code::Signal;

#[derive(Debug)]
pub enum Type {
    /// A continuous clock needs a finite, positive frequency.
    InvalidFrequency(f64),
    /// Control ROM images are exactly 256 bytes.
    InvalidRomSize(usize),
    /// The opcode/step pair has no slot in the control ROM.
    RomAddressOutOfRange(u16),
    /// More than one signal tried to drive the bus in the same micro-step.
    BusConflict { address: u16, drivers: Vec<Signal> },
    UnknownPreset(String),
    UnknownClockSource(String),
    InvalidComponent(String),
    CallbackPanic(String),
    Io(std::io::Error),
}

pub type Result<T> = core::result::Result<T, Type>;

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use Type::*;
        match self {
            InvalidFrequency(hz) => write!(f, "Invalid clock frequency: {} Hz", hz),
            InvalidRomSize(size) => {
                write!(f, "Microcode ROM must be {} bytes, got {}", ROM_BYTES, size)
            }
            RomAddressOutOfRange(address) => {
                write!(f, "ROM address {:#05X} is outside the control ROM", address)
            }
            BusConflict { address, drivers } => {
                let names: Vec<&str> = drivers.iter().map(|signal| signal.name()).collect();
                write!(f, "Bus conflict at ROM address {:#05X}: {}", address, names.join(", "))
            }
            UnknownPreset(name) => write!(f, "Unknown clock preset '{}'", name),
            UnknownClockSource(name) => write!(f, "Unknown clock source '{}'", name),
            InvalidComponent(message) => write!(f, "Invalid timer component: {}", message),
            CallbackPanic(message) => write!(f, "Edge callback panicked: {}", message),
            Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for Type {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Type::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Type {
    fn from(err: std::io::Error) -> Type {
        Type::Io(err)
    }
}
