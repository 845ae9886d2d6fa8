use std::convert::TryFrom;
use std::fmt;
use std::path::Path;

use micro_code::address::{RomAddress, ROM_BYTES, STEPS_PER_OPCODE};
use micro_code::ControlSignals;

use crate::error::{self, Result};

pub mod reference;

/// The control-signal ROM: 128 little-endian control words, one block of eight per opcode.
///
/// Reads outside the image are defined as NOP rather than errors, so opcodes without authored
/// microcode simply idle through their execute steps.
#[derive(Clone, PartialEq, Eq)]
pub struct MicrocodeRom {
    bytes: [u8; ROM_BYTES],
}

impl Default for MicrocodeRom {
    fn default() -> Self {
        MicrocodeRom::blank()
    }
}

impl MicrocodeRom {
    /// An all-NOP ROM.
    pub fn blank() -> MicrocodeRom {
        MicrocodeRom { bytes: [0; ROM_BYTES] }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<MicrocodeRom> {
        if bytes.len() != ROM_BYTES {
            return Err(error::Type::InvalidRomSize(bytes.len()));
        }
        let mut rom = MicrocodeRom::blank();
        rom.bytes.copy_from_slice(bytes);
        Ok(rom)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<MicrocodeRom> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let rom = MicrocodeRom::from_bytes(&bytes)?;
        info!(target: "rom", "Loaded {} byte microcode ROM from {}", bytes.len(), path.display());
        Ok(rom)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Raw control word at `address`, or 0 past the end of the image.
    pub fn word_at(&self, address: RomAddress) -> u16 {
        if !address.in_rom() {
            return 0;
        }
        let offset = address.byte_offset();
        u16::from_le_bytes([self.bytes[offset], self.bytes[offset + 1]])
    }

    pub fn signals(&self, opcode: u8, step: u8) -> ControlSignals {
        ControlSignals::decode(self.word_at(RomAddress::new(opcode, step)))
    }

    pub fn set_word(&mut self, opcode: u8, step: u8, signals: ControlSignals) -> Result<()> {
        if step >= STEPS_PER_OPCODE {
            return Err(error::Type::RomAddressOutOfRange(
                (u16::from(opcode) << 3) | u16::from(step),
            ));
        }
        let address = RomAddress::new(opcode, step);
        if !address.in_rom() {
            return Err(error::Type::RomAddressOutOfRange(address.raw()));
        }
        let offset = address.byte_offset();
        self.bytes[offset..offset + 2].copy_from_slice(&signals.word().to_le_bytes());
        Ok(())
    }

    /// Writes consecutive micro-steps for `opcode`, starting at step 0.
    pub fn set_steps(&mut self, opcode: u8, steps: &[ControlSignals]) -> Result<()> {
        for (step, &signals) in steps.iter().enumerate() {
            let step = u8::try_from(step)
                .map_err(|_| error::Type::RomAddressOutOfRange(u16::from(opcode) << 3))?;
            self.set_word(opcode, step, signals)?;
        }
        Ok(())
    }
}

impl fmt::Debug for MicrocodeRom {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f)?;
        for opcode in 0..(micro_code::address::ROM_WORDS / STEPS_PER_OPCODE as usize) as u8 {
            for step in 0..STEPS_PER_OPCODE {
                let signals = self.signals(opcode, step);
                if !signals.is_nop() {
                    writeln!(
                        f,
                        "[{:#05X}] {:#06X} {}",
                        RomAddress::new(opcode, step).raw(),
                        signals.word(),
                        signals
                    )?;
                }
            }
        }
        Ok(())
    }
}
