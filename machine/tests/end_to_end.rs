use machine::clock::{Clock, ClockMode, ClockSource, Preset};
use machine::cpu::{Cpu, Phase};
use machine::rom::reference::{self, opcode::*};
use machine::rom::MicrocodeRom;
use machine::system::System;
use micro_code::ControlSignals;

#[rustfmt::skip]
const PROGRAM: [u8; 9] = [
    LDI_A, 0x07,
    LDI_B, 0x02,
    ADD,
    STA, 0x0E,
    OUT,
    HLT,
];

fn rom_from_image() -> MicrocodeRom {
    // Go through the raw 256-byte image, the way a generated ROM file arrives.
    MicrocodeRom::from_bytes(reference::rom().as_bytes()).unwrap()
}

#[test]
fn test_program_on_continuous_clock() {
    let mut cpu = Cpu::new(rom_from_image());
    cpu.load_program(&PROGRAM, 0);
    let clock = Clock::new(ClockSource::Emulator.mode(), 20_000.).unwrap();
    let mut system = System::new(cpu, clock);

    let summary = system.run_until_halt(100);

    assert!(summary.halted);
    assert!(summary.clock_cycles <= 100);
    let snapshot = system.cpu().snapshot();
    assert_eq!(snapshot.a, 9);
    assert_eq!(snapshot.ram[0x0E], 9);
    assert_eq!(snapshot.phase, Phase::Halted);
    assert_eq!(snapshot.instructions, 5);
    assert!(!system.clock().is_running());
    assert_eq!(system.clock().fault_count(), 0);
}

#[test]
fn test_program_on_manual_clock() {
    let mut cpu = Cpu::new(rom_from_image());
    cpu.load_program(&PROGRAM, 0);
    let clock = Clock::from_preset(ClockMode::Manual, Preset::Slow).unwrap();
    let mut system = System::new(cpu, clock);

    let summary = system.run_until_halt(100);
    assert!(summary.halted);
    assert_eq!(summary.clock_cycles, 28);
    assert_eq!(system.cpu().output(), 9);

    // Further edges are ignored by the halted CPU.
    let before = system.cpu().snapshot();
    for _ in 0..10 {
        system.clock_mut().step();
    }
    assert_eq!(system.cpu().snapshot(), before);
}

#[test]
fn test_bus_conflict_is_reported_through_the_clock() {
    let mut rom = MicrocodeRom::blank();
    rom.set_steps(0x01, &[ControlSignals::A_OUT | ControlSignals::B_OUT | ControlSignals::RAM_IN])
        .unwrap();
    let mut cpu = Cpu::new(rom);
    cpu.load_program(&[0x01], 0);
    let mut system = System::new(cpu, Clock::new(ClockMode::Manual, 1.).unwrap());

    let summary = system.run_until_halt(10);

    assert!(!summary.halted);
    // Two fetch cycles, then the faulting word is rejected on every following edge.
    assert_eq!(summary.cpu_cycles, 2);
    assert_eq!(system.clock().fault_count(), 8);
    assert_eq!(system.cpu().phase(), Phase::Execute(0));
    assert_eq!(system.cpu().ram()[0], 0x01);
}
