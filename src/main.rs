use std::path::PathBuf;

use machine::clock::{Clock, ClockSource, Preset};
use machine::cpu::Cpu;
use machine::log::{setup_logging, LogSettings};
use machine::rom::{reference, MicrocodeRom};
use machine::system::System;

const HELP: &str = "\
microbus - microcode-sequenced 8-bit computer

USAGE:
  microbus [OPTIONS]

OPTIONS:
  --rom PATH          256-byte microcode ROM image (default: built-in demo microcode)
  --program PATH      raw program bytes loaded into RAM (default: 7 + 2 demo)
  --offset N          RAM address to load the program at [default: 0]
  --source NAME       emulator | arduino | 555 | manual [default: emulator]
  --preset NAME       breadboard | slow | normal | fast | turbo | arduino [default: turbo]
  --frequency HZ      clock frequency, overrides --preset
  --max-cycles N      give up after N clock cycles [default: 100]
  --log-cpu           trace every micro-cycle
  --log-bus           trace bus traffic
  --log-clock         trace clock configuration
  --log-file PATH     mirror log output into PATH
  -h, --help          print this message
";

#[rustfmt::skip]
const DEMO_PROGRAM: [u8; 9] = [
    reference::opcode::LDI_A, 0x07,
    reference::opcode::LDI_B, 0x02,
    reference::opcode::ADD,
    reference::opcode::STA, 0x0E,
    reference::opcode::OUT,
    reference::opcode::HLT,
];

struct Args {
    rom: Option<PathBuf>,
    program: Option<PathBuf>,
    offset: usize,
    source: ClockSource,
    preset: Preset,
    frequency: Option<f64>,
    max_cycles: u64,
    log: LogSettings,
}

fn parse_args() -> Result<Option<Args>, Box<dyn std::error::Error>> {
    let mut args = pico_args::Arguments::from_env();
    if args.contains(["-h", "--help"]) {
        print!("{}", HELP);
        return Ok(None);
    }
    let log = LogSettings {
        cpu: args.contains("--log-cpu"),
        bus: args.contains("--log-bus"),
        clock: args.contains("--log-clock"),
        log_file: args.opt_value_from_str("--log-file")?,
    };
    let parsed = Args {
        rom: args.opt_value_from_str("--rom")?,
        program: args.opt_value_from_str("--program")?,
        offset: args.opt_value_from_str("--offset")?.unwrap_or(0),
        source: args.opt_value_from_str("--source")?.unwrap_or(ClockSource::Emulator),
        preset: args.opt_value_from_str("--preset")?.unwrap_or(Preset::Turbo),
        frequency: args.opt_value_from_str("--frequency")?,
        max_cycles: args.opt_value_from_str("--max-cycles")?.unwrap_or(100),
        log,
    };
    args.finish()?;
    Ok(Some(parsed))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let Args {
        rom,
        program,
        offset,
        source,
        preset,
        frequency,
        max_cycles,
        log,
    } = match parse_args()? {
        Some(args) => args,
        None => return Ok(()),
    };
    setup_logging(log)?;

    let rom = match &rom {
        Some(path) => MicrocodeRom::from_file(path)?,
        None => reference::rom(),
    };
    let program = match &program {
        Some(path) => std::fs::read(path)?,
        None => DEMO_PROGRAM.to_vec(),
    };

    let mut cpu = Cpu::new(rom);
    let report = cpu.load_program(&program, offset);
    if report.dropped > 0 {
        eprintln!("warning: {} program bytes did not fit in RAM", report.dropped);
    }

    let frequency = frequency.unwrap_or_else(|| preset.frequency_hz());
    let clock = Clock::new(source.mode(), frequency)?;
    println!("{} from {:?} source", clock.status(), source);
    println!("{}", cpu.snapshot());

    let mut system = System::new(cpu, clock);
    let summary = system.run_until_halt(max_cycles);

    println!("{}", system.cpu().snapshot());
    if summary.halted {
        println!(
            "Halted after {} instructions, {} cycles ({:.1} Hz). Output: {}",
            summary.instructions,
            summary.cpu_cycles,
            summary.speed_hz(),
            system.cpu().output()
        );
    } else {
        println!("Max cycles reached: {}", max_cycles);
    }
    if system.clock().fault_count() > 0 {
        eprintln!("{} edge callbacks failed; see the log", system.clock().fault_count());
    }
    Ok(())
}
