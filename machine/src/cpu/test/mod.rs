use micro_code::ControlSignals;

use super::alu::Flags;
use super::register::Register;
use super::*;
use crate::rom::reference;


pub use reference::opcode::*;

pub struct TestContext {
    pub cpu: Cpu,
}

/// A CPU running the demo microcode, with empty RAM.
pub fn with_default() -> TestContext {
    with_rom(reference::rom())
}

pub fn with_rom(rom: MicrocodeRom) -> TestContext {
    TestContext { cpu: Cpu::new(rom) }
}

/// A ROM whose only authored instruction is `opcode`, with the given execute steps.
pub fn rom_with(opcode: u8, steps: &[ControlSignals]) -> MicrocodeRom {
    let mut rom = MicrocodeRom::blank();
    rom.set_steps(opcode, steps).unwrap();
    rom
}

impl TestContext {
    pub fn set_mem_8bit(mut self, address: usize, value: u8) -> Self {
        self.cpu.load_program(&[value], address);
        self
    }

    pub fn set_mem_range(mut self, address: usize, values: &[u8]) -> Self {
        assert_eq!(self.cpu.load_program(values, address).dropped, 0);
        self
    }

    pub fn set_reg(mut self, reg: Register, value: u8) -> Self {
        self.cpu.registers.set(reg, value);
        self
    }

    pub fn set_bus(mut self, value: u8) -> Self {
        self.cpu.state.bus = value;
        self
    }

    pub fn execute_cycles(mut self, cycles: usize) -> Self {
        for _ in 0..cycles {
            self.cpu.step().unwrap();
        }
        self
    }

    /// Loads `program` at address 0 and runs exactly `instructions` complete instructions.
    pub fn execute_instructions(self, program: &[u8], instructions: u64) -> Self {
        let mut context = self.set_mem_range(0, program);
        while context.cpu.instruction_count() < instructions {
            assert!(!context.cpu.is_halted(), "Halted before {} instructions", instructions);
            context.cpu.step().unwrap();
        }
        context
    }

    pub fn execute_until_halt(mut self, program: &[u8], max_cycles: u64) -> Self {
        assert_eq!(self.cpu.load_program(program, 0).dropped, 0);
        assert!(self.cpu.run(max_cycles).unwrap(), "CPU did not halt in {} cycles", max_cycles);
        self
    }

    pub fn assert_reg_eq(self, reg: Register, value: u8) -> Self {
        assert_eq!(self.cpu.registers.get(reg), value, "Register {:?}", reg);
        self
    }

    pub fn assert_mem_eq(self, address: u8, value: u8) -> Self {
        assert_eq!(self.cpu.read_ram(address), value, "RAM[{:X}]", address);
        self
    }

    pub fn assert_flags(self, flags: Flags) -> Self {
        assert_eq!(self.cpu.flags(), flags);
        self
    }

    pub fn assert_bus_eq(self, value: u8) -> Self {
        assert_eq!(self.cpu.bus(), value);
        self
    }

    pub fn assert_phase(self, phase: Phase) -> Self {
        assert_eq!(self.cpu.phase(), phase);
        self
    }

    pub fn assert_cycles(self, cycles: u64) -> Self {
        assert_eq!(self.cpu.cycle_count(), cycles);
        self
    }

    pub fn assert_instructions(self, instructions: u64) -> Self {
        assert_eq!(self.cpu.instruction_count(), instructions);
        self
    }
}
