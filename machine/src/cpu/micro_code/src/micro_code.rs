use std::fmt::{self, Display, Formatter};

use arrayvec::ArrayVec;
use bitflags::bitflags;
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

bitflags! {
    /// One decoded control word. Every bit enables a single architecturally-named signal for the
    /// duration of one micro-step. Bit 15 is unassigned and is dropped on decode.
    #[derive(Default)]
    #[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
    pub struct ControlSignals: u16 {
        const PC_OUT = 1 << 0;
        const PC_INC = 1 << 1;
        const MAR_IN = 1 << 2;
        const RAM_OUT = 1 << 3;
        const RAM_IN = 1 << 4;
        const IR_IN = 1 << 5;
        const IR_OUT = 1 << 6;
        const A_IN = 1 << 7;
        const A_OUT = 1 << 8;
        const B_IN = 1 << 9;
        const B_OUT = 1 << 10;
        const ALU_OUT = 1 << 11;
        const ALU_SUB = 1 << 12;
        const HALT = 1 << 13;
        const FLAGS_IN = 1 << 14;
    }
}

/// The signal names, in control word bit order.
#[derive(FromPrimitive, Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum Signal {
    PcOut = 0,
    PcInc,
    MarIn,
    RamOut,
    RamIn,
    IrIn,
    IrOut,
    AIn,
    AOut,
    BIn,
    BOut,
    AluOut,
    AluSub,
    Halt,
    FlagsIn,
}

/// Number of signals that can drive the bus.
pub const NUM_BUS_DRIVERS: usize = 6;
pub type BusDrivers = ArrayVec<[Signal; NUM_BUS_DRIVERS]>;

impl Signal {
    pub fn from_bit(bit: u32) -> Option<Signal> {
        Signal::from_u32(bit)
    }

    pub fn mask(self) -> ControlSignals {
        ControlSignals::from_bits_truncate(1 << (self as u16))
    }

    pub fn name(self) -> &'static str {
        use Signal::*;
        match self {
            PcOut => "PC_OUT",
            PcInc => "PC_INC",
            MarIn => "MAR_IN",
            RamOut => "RAM_OUT",
            RamIn => "RAM_IN",
            IrIn => "IR_IN",
            IrOut => "IR_OUT",
            AIn => "A_IN",
            AOut => "A_OUT",
            BIn => "B_IN",
            BOut => "B_OUT",
            AluOut => "ALU_OUT",
            AluSub => "ALU_SUB",
            Halt => "HALT",
            FlagsIn => "FLAGS_IN",
        }
    }

    /// True for signals that put a value onto the bus.
    pub fn drives_bus(self) -> bool {
        use Signal::*;
        matches!(self, PcOut | RamOut | IrOut | AOut | BOut | AluOut)
    }
}

impl Display for Signal {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl ControlSignals {
    /// Decodes a raw control word. Unknown bits are ignored so that wider words stay readable.
    pub fn decode(word: u16) -> ControlSignals {
        ControlSignals::from_bits_truncate(word)
    }

    pub fn word(self) -> u16 {
        self.bits()
    }

    pub fn is_nop(self) -> bool {
        self.is_empty()
    }

    /// Asserted signals, lowest bit first.
    pub fn iter_signals(self) -> impl Iterator<Item = Signal> {
        (0..16)
            .filter(move |bit| self.bits() & (1 << *bit) != 0)
            .filter_map(Signal::from_bit)
    }

    /// Asserted signals that write the bus. Correct microcode asserts at most one.
    pub fn bus_drivers(self) -> BusDrivers {
        self.iter_signals().filter(|signal| signal.drives_bus()).collect()
    }
}

impl From<Signal> for ControlSignals {
    fn from(signal: Signal) -> ControlSignals {
        signal.mask()
    }
}

impl Display for ControlSignals {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        if self.is_nop() {
            return f.write_str("NOP");
        }
        for (i, signal) in self.iter_signals().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            write!(f, "{}", signal)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_matches_bit_layout() {
        for bit in 0..15 {
            let signal = Signal::from_bit(bit).unwrap();
            assert_eq!(ControlSignals::decode(1 << bit), signal.mask());
            assert_eq!(signal as u32, bit);
        }
    }

    #[test]
    fn test_decode_ignores_undefined_bits() {
        assert_eq!(ControlSignals::decode(0x8000), ControlSignals::empty());
        assert_eq!(ControlSignals::decode(0x8000 | 0x2000), ControlSignals::HALT);
        assert!(Signal::from_bit(15).is_none());
    }

    #[test]
    fn test_bus_drivers() {
        let word = ControlSignals::RAM_OUT | ControlSignals::A_IN | ControlSignals::PC_INC;
        assert_eq!(word.bus_drivers().as_slice(), &[Signal::RamOut]);

        let word = ControlSignals::A_OUT | ControlSignals::RAM_OUT | ControlSignals::RAM_IN;
        assert_eq!(word.bus_drivers().as_slice(), &[Signal::RamOut, Signal::AOut]);

        let all = ControlSignals::all().bus_drivers();
        assert_eq!(all.len(), NUM_BUS_DRIVERS);
    }

    #[test]
    fn test_display() {
        assert_eq!(ControlSignals::empty().to_string(), "NOP");
        assert_eq!(
            (ControlSignals::MAR_IN | ControlSignals::PC_OUT).to_string(),
            "PC_OUT | MAR_IN"
        );
        assert_eq!(
            (ControlSignals::ALU_OUT | ControlSignals::A_IN | ControlSignals::FLAGS_IN).to_string(),
            "A_IN | ALU_OUT | FLAGS_IN"
        );
    }
}
