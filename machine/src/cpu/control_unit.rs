use micro_code::{ControlSignals, RomAddress};

use crate::cpu;
use crate::error::{self, Result};

use cpu::alu;
use cpu::register::{self, Register};
use cpu::{Cpu, Phase, EXECUTE_STEPS};

fn fetch_0() -> ControlSignals {
    ControlSignals::PC_OUT | ControlSignals::MAR_IN
}

fn fetch_1() -> ControlSignals {
    ControlSignals::RAM_OUT | ControlSignals::IR_IN | ControlSignals::PC_INC
}

/// Runs one micro-cycle and returns the next state, plus whether an instruction just completed.
pub fn cycle(cpu: &mut Cpu) -> Result<(cpu::State, bool)> {
    let (micro_code, next_phase) = match cpu.state.phase {
        Phase::Fetch0 => (fetch_0(), Phase::Fetch1),
        Phase::Fetch1 => (fetch_1(), Phase::Execute(0)),
        Phase::Execute(step) => {
            debug_assert_lt!(step, EXECUTE_STEPS);
            let opcode = cpu.registers.get(Register::IR);
            let address = RomAddress::new(opcode, step);
            let micro_code = ControlSignals::decode(cpu.rom().word_at(address));
            trace!(target: "cpu", "IR={:#04X} T{}: {}", opcode, step, micro_code);
            // HALT short-circuits the whole word.
            if micro_code.contains(ControlSignals::HALT) {
                info!(target: "cpu", "Halted at PC={:X}", cpu.registers.get(Register::PC));
                let next_state = cpu::State { phase: Phase::Halted, ..cpu.state };
                return Ok((next_state, false));
            }
            let drivers = micro_code.bus_drivers();
            if drivers.len() > 1 {
                return Err(error::Type::BusConflict {
                    address: address.raw(),
                    drivers: drivers.to_vec(),
                });
            }
            let next_phase =
                if step + 1 == EXECUTE_STEPS { Phase::Fetch0 } else { Phase::Execute(step + 1) };
            (micro_code, next_phase)
        }
        Phase::Halted => return Ok((cpu.state, false)),
    };
    if let Phase::Fetch0 | Phase::Fetch1 = cpu.state.phase {
        trace!(target: "cpu", "{:?}: {}", cpu.state.phase, micro_code);
    }
    let bus = execute(micro_code, cpu);
    let is_done = next_phase == Phase::Fetch0;
    Ok((cpu::State { phase: next_phase, bus }, is_done))
}

/// ALU module. Reads A and B as they were at the start of the micro-step.
fn alu_logic(
    code: ControlSignals,
    current_regs: &register::File,
    new_regs: &mut register::File,
) -> u8 {
    let op = alu::Op::from_sub_line(code.contains(ControlSignals::ALU_SUB));
    let (result, flags) = op.execute(current_regs.get(Register::A), current_regs.get(Register::B));
    if code.contains(ControlSignals::FLAGS_IN) {
        new_regs.set(Register::FLAGS, flags.bits());
    }
    result
}

/// Applies one control word: bus drivers first, then bus sinks, then the PC incrementer. Returns
/// the value left on the bus.
fn execute(code: ControlSignals, cpu: &mut Cpu) -> u8 {
    let current_regs = cpu.registers;
    let mut new_regs = current_regs;

    let mut bus = cpu.state.bus;
    if code.contains(ControlSignals::PC_OUT) {
        bus = current_regs.get(Register::PC);
    }
    if code.contains(ControlSignals::RAM_OUT) {
        bus = cpu.ram[usize::from(current_regs.get(Register::MAR))];
    }
    if code.contains(ControlSignals::IR_OUT) {
        bus = current_regs.get(Register::IR);
    }
    if code.contains(ControlSignals::A_OUT) {
        bus = current_regs.get(Register::A);
    }
    if code.contains(ControlSignals::B_OUT) {
        bus = current_regs.get(Register::B);
    }
    if code.contains(ControlSignals::ALU_OUT) {
        bus = alu_logic(code, &current_regs, &mut new_regs);
    }
    if !code.bus_drivers().is_empty() {
        trace!(target: "bus", "{} -> bus: {:#04X}", code, bus);
    }

    if code.contains(ControlSignals::MAR_IN) {
        new_regs.set(Register::MAR, bus);
    }
    // A RAM write sees an address latched by MAR_IN in the same word.
    if code.contains(ControlSignals::RAM_IN) {
        let address = new_regs.get(Register::MAR);
        trace!(target: "bus", "bus -> RAM[{:X}]: {:#04X}", address, bus);
        cpu.ram[usize::from(address)] = bus;
    }
    if code.contains(ControlSignals::IR_IN) {
        new_regs.set(Register::IR, bus);
    }
    if code.contains(ControlSignals::A_IN) {
        new_regs.set(Register::A, bus);
    }
    if code.contains(ControlSignals::B_IN) {
        new_regs.set(Register::B, bus);
    }

    if code.contains(ControlSignals::PC_INC) {
        new_regs.increment_pc();
    }

    cpu.registers = new_regs;
    bus
}
