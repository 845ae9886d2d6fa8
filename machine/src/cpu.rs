use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::rom::MicrocodeRom;

use alu::Flags;
use register::Register;

pub mod alu;
mod control_unit;
pub mod register;

#[cfg(test)]
mod test;

pub const RAM_SIZE: usize = 16;
/// Execute micro-steps per instruction, following the two fetch steps.
pub const EXECUTE_STEPS: u8 = 3;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum Phase {
    /// PC -> bus -> MAR.
    Fetch0,
    /// RAM[MAR] -> bus -> IR, PC++.
    Fetch1,
    /// Micro-step 0..=2 of the instruction in IR, driven by the control ROM.
    Execute(u8),
    Halted,
}

impl Default for Phase {
    fn default() -> Self {
        Phase::Fetch0
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct State {
    pub phase: Phase,
    /// Last value driven onto the bus. Sinks asserted without a driver read this stale value.
    pub bus: u8,
}

/// Result of copying a program into RAM.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: usize,
    /// Bytes that fell past the end of RAM and were ignored.
    pub dropped: usize,
}

/// Read-only copy of the complete machine state.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Snapshot {
    pub pc: u8,
    pub mar: u8,
    pub ir: u8,
    pub a: u8,
    pub b: u8,
    pub bus: u8,
    pub flags: Flags,
    pub phase: Phase,
    pub halted: bool,
    pub cycles: u64,
    pub instructions: u64,
    pub ram: [u8; RAM_SIZE],
}

/// The micro-sequenced processor: registers, bus and RAM, driven one micro-cycle per `step`.
pub struct Cpu {
    pub(crate) state: State,
    pub(crate) registers: register::File,
    ram: [u8; RAM_SIZE],
    rom: Arc<MicrocodeRom>,

    cycle_count: u64,
    instruction_count: u64,
}

impl Cpu {
    pub fn new(rom: impl Into<Arc<MicrocodeRom>>) -> Cpu {
        Cpu {
            state: State::default(),
            registers: register::File::default(),
            ram: [0; RAM_SIZE],
            rom: rom.into(),
            cycle_count: 0,
            instruction_count: 0,
        }
    }

    /// Runs one micro-cycle. This is the function the clock's rising edge drives.
    ///
    /// A halted CPU ignores further cycles. A control word with more than one bus driver is
    /// rejected before anything is latched, leaving the CPU exactly as it was.
    pub fn step(&mut self) -> Result<()> {
        if self.is_halted() {
            return Ok(());
        }
        let (next_state, is_done) = control_unit::cycle(self)?;
        self.state = next_state;
        self.cycle_count += 1;
        if is_done {
            self.instruction_count += 1;
        }
        Ok(())
    }

    /// Steps until the CPU halts or the cycle counter reaches `max_cycles`. Returns whether the
    /// CPU halted.
    pub fn run(&mut self, max_cycles: u64) -> Result<bool> {
        while !self.is_halted() && self.cycle_count < max_cycles {
            self.step()?;
        }
        if self.is_halted() {
            info!(
                target: "cpu",
                "Halted after {} instructions, {} cycles",
                self.instruction_count,
                self.cycle_count
            );
        } else {
            info!(target: "cpu", "Max cycles reached: {}", max_cycles);
        }
        Ok(self.is_halted())
    }

    /// Clears registers, bus, flags, counters and the sequencer. RAM is left as-is so a loaded
    /// program can be rerun.
    pub fn reset(&mut self) {
        self.state = State::default();
        self.registers = register::File::default();
        self.cycle_count = 0;
        self.instruction_count = 0;
        debug!(target: "cpu", "Reset");
    }

    pub fn clear_ram(&mut self) {
        self.ram = [0; RAM_SIZE];
    }

    /// Copies `program` into RAM starting at `offset`. Bytes that do not fit are dropped.
    pub fn load_program(&mut self, program: &[u8], offset: usize) -> LoadReport {
        let mut report = LoadReport::default();
        for (i, &byte) in program.iter().enumerate() {
            match offset.checked_add(i).filter(|&address| address < RAM_SIZE) {
                Some(address) => {
                    self.ram[address] = byte;
                    report.loaded += 1;
                }
                None => report.dropped += 1,
            }
        }
        if report.dropped > 0 {
            warn!(
                target: "cpu",
                "Dropped {} of {} program bytes past the end of RAM (offset {})",
                report.dropped,
                program.len(),
                offset
            );
        }
        debug!(target: "cpu", "Loaded {} bytes at address {}", report.loaded, offset);
        report
    }

    pub fn rom(&self) -> &MicrocodeRom {
        &self.rom
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn is_halted(&self) -> bool {
        self.state.phase == Phase::Halted
    }

    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    pub fn instruction_count(&self) -> u64 {
        self.instruction_count
    }

    pub fn bus(&self) -> u8 {
        self.state.bus
    }

    pub fn flags(&self) -> Flags {
        Flags::from_bits_truncate(self.registers.get(Register::FLAGS))
    }

    pub fn register(&self, reg: Register) -> u8 {
        self.registers.get(reg)
    }

    /// Register A doubles as the output register.
    pub fn output(&self) -> u8 {
        self.registers.get(Register::A)
    }

    pub fn ram(&self) -> &[u8; RAM_SIZE] {
        &self.ram
    }

    pub fn read_ram(&self, address: u8) -> u8 {
        self.ram[usize::from(address & 0x0F)]
    }

    pub fn snapshot(&self) -> Snapshot {
        let regs = &self.registers;
        Snapshot {
            pc: regs.get(Register::PC),
            mar: regs.get(Register::MAR),
            ir: regs.get(Register::IR),
            a: regs.get(Register::A),
            b: regs.get(Register::B),
            bus: self.state.bus,
            flags: self.flags(),
            phase: self.state.phase,
            halted: self.is_halted(),
            cycles: self.cycle_count,
            instructions: self.instruction_count,
            ram: self.ram,
        }
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "PC={:X} MAR={:X} IR={:#04X} A={:#04X} B={:#04X} BUS={:#04X} C={} Z={} ({:?})",
            self.pc,
            self.mar,
            self.ir,
            self.a,
            self.b,
            self.bus,
            self.flags.contains(Flags::CARRY) as u8,
            self.flags.contains(Flags::ZERO) as u8,
            self.phase
        )?;
        for (row, chunk) in self.ram.chunks(8).enumerate() {
            let bytes: Vec<String> = chunk.iter().map(|byte| format!("{:02X}", byte)).collect();
            writeln!(f, "  {:X}: {}", row * 8, bytes.join(" "))?;
        }
        Ok(())
    }
}
