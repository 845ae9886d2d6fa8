//! Built-in microcode for the small demo instruction set. Every instruction runs three execute
//! micro-steps after the shared two-step fetch; operand bytes follow the opcode in RAM.

use micro_code::ControlSignals as S;

use super::MicrocodeRom;

pub mod opcode {
    pub const NOP: u8 = 0x00;
    pub const HLT: u8 = 0x01;
    /// LDI_A imm: A <- imm.
    pub const LDI_A: u8 = 0x02;
    /// LDI_B imm: B <- imm.
    pub const LDI_B: u8 = 0x03;
    /// LDA addr: A <- RAM[addr].
    pub const LDA: u8 = 0x04;
    /// LDB addr: B <- RAM[addr].
    pub const LDB: u8 = 0x05;
    /// STA addr: RAM[addr] <- A.
    pub const STA: u8 = 0x06;
    /// STB addr: RAM[addr] <- B.
    pub const STB: u8 = 0x07;
    /// A <- A + B, latches flags.
    pub const ADD: u8 = 0x08;
    /// A <- A - B, latches flags.
    pub const SUB: u8 = 0x09;
    /// B <- A.
    pub const MOV_AB: u8 = 0x0A;
    /// A <- B.
    pub const MOV_BA: u8 = 0x0B;
    /// A - B onto the bus, latching flags but not A.
    pub const CMP: u8 = 0x0C;
    /// Drives A onto the bus for an external output latch.
    pub const OUT: u8 = 0x0F;
}

fn table() -> Vec<(u8, [S; 3])> {
    use opcode::*;
    let nop = S::empty();
    let operand_to_mar = S::PC_OUT | S::MAR_IN;
    let pointer_to_mar = S::RAM_OUT | S::MAR_IN | S::PC_INC;
    vec![
        (HLT, [S::HALT, nop, nop]),
        (LDI_A, [operand_to_mar, S::RAM_OUT | S::A_IN | S::PC_INC, nop]),
        (LDI_B, [operand_to_mar, S::RAM_OUT | S::B_IN | S::PC_INC, nop]),
        (LDA, [operand_to_mar, pointer_to_mar, S::RAM_OUT | S::A_IN]),
        (LDB, [operand_to_mar, pointer_to_mar, S::RAM_OUT | S::B_IN]),
        (STA, [operand_to_mar, pointer_to_mar, S::A_OUT | S::RAM_IN]),
        (STB, [operand_to_mar, pointer_to_mar, S::B_OUT | S::RAM_IN]),
        (ADD, [S::ALU_OUT | S::A_IN | S::FLAGS_IN, nop, nop]),
        (SUB, [S::ALU_OUT | S::ALU_SUB | S::A_IN | S::FLAGS_IN, nop, nop]),
        (MOV_AB, [S::A_OUT | S::B_IN, nop, nop]),
        (MOV_BA, [S::B_OUT | S::A_IN, nop, nop]),
        (CMP, [S::ALU_OUT | S::ALU_SUB | S::FLAGS_IN, nop, nop]),
        (OUT, [S::A_OUT, nop, nop]),
    ]
}

/// The demo ROM image.
pub fn rom() -> MicrocodeRom {
    let mut rom = MicrocodeRom::blank();
    for (op, steps) in table() {
        // Every entry is a 4-bit opcode with three steps, so it always fits.
        if let Err(err) = rom.set_steps(op, &steps) {
            unreachable!("Reference microcode does not fit the ROM: {}", err);
        }
    }
    rom
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_word_has_at_most_one_bus_driver() {
        let rom = rom();
        for op in 0..16 {
            for step in 0..8 {
                assert!(rom.signals(op, step).bus_drivers().len() <= 1, "{:#04X} T{}", op, step);
            }
        }
    }

    #[test]
    fn test_halt_word() {
        assert_eq!(rom().signals(opcode::HLT, 0), S::HALT);
        assert!(rom().signals(opcode::NOP, 0).is_nop());
        assert!(rom().signals(0x0E, 0).is_nop());
    }
}
