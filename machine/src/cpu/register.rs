use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use crate::util::is_4bit;

/// The architectural registers, stored in the order PC, MAR, IR, A, B, FLAGS.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize), serde(transparent))]
pub struct File([u8; Register::NumRegisters as usize]);

#[derive(FromPrimitive, Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[allow(non_camel_case_types)]
pub enum Register {
    PC,
    MAR,
    IR,
    A,
    B,
    FLAGS,
    NumRegisters,
}

impl Register {
    /// Mask applied to every value latched into the register.
    pub fn mask(self) -> u8 {
        use Register::*;
        match self {
            PC | MAR => 0x0F,
            FLAGS => 0x03,
            IR | A | B => 0xFF,
            NumRegisters => panic!("Attempting to mask invalid register."),
        }
    }
}

impl File {
    pub fn get(&self, reg: Register) -> u8 {
        self.0[reg as usize]
    }

    /// Latches `value`, truncated to the register width.
    pub fn set(&mut self, reg: Register, value: u8) {
        self.0[reg as usize] = value & reg.mask();
    }

    /// Advances the 4-bit program counter, wrapping at 16.
    pub fn increment_pc(&mut self) {
        let pc = self.get(Register::PC);
        strict_assert!(is_4bit(pc));
        self.set(Register::PC, pc.wrapping_add(1));
    }
}

impl core::fmt::Debug for File {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        writeln!(f)?;
        for i in 0..(Register::NumRegisters as usize) {
            writeln!(
                f,
                "{:>10}: {: <2X?}",
                format!("{:?}", Register::from_usize(i).unwrap_or(Register::NumRegisters)),
                self.0[i]
            )?;
        }
        Ok(())
    }
}
