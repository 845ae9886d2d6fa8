use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::clock::{Clock, ClockMode, TimeSource, WallClock};
use crate::cpu::Cpu;

/// Outcome of `System::run_until_halt`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RunSummary {
    pub halted: bool,
    pub clock_cycles: u64,
    pub cpu_cycles: u64,
    pub instructions: u64,
    pub elapsed: Duration,
}

impl RunSummary {
    /// Micro-cycles per second of wall time.
    pub fn speed_hz(&self) -> f64 {
        let seconds = self.elapsed.as_secs_f64();
        if seconds > 0. {
            self.cpu_cycles as f64 / seconds
        } else {
            0.
        }
    }
}

/// A CPU wired to a clock: every rising edge runs one micro-cycle.
pub struct System<T: TimeSource = WallClock> {
    clock: Clock<T>,
    cpu: Rc<RefCell<Cpu>>,
}

impl<T: TimeSource> System<T> {
    pub fn new(cpu: Cpu, mut clock: Clock<T>) -> System<T> {
        let cpu = Rc::new(RefCell::new(cpu));
        let handle = Rc::clone(&cpu);
        clock.on_rising_edge(move || handle.borrow_mut().step());
        System { clock, cpu }
    }

    pub fn cpu(&self) -> Ref<Cpu> {
        self.cpu.borrow()
    }

    pub fn cpu_mut(&self) -> RefMut<Cpu> {
        self.cpu.borrow_mut()
    }

    pub fn clock(&self) -> &Clock<T> {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut Clock<T> {
        &mut self.clock
    }

    /// Drives the clock until the CPU halts or `max_cycles` clock cycles have completed. A manual
    /// clock is stepped; a continuous one is started and polled in real time.
    pub fn run_until_halt(&mut self, max_cycles: u64) -> RunSummary {
        let started = Instant::now();
        let start_cycles = self.clock.cycle_count();
        let done = |clock: &Clock<T>, cpu: &Rc<RefCell<Cpu>>| {
            cpu.borrow().is_halted() || clock.cycle_count() - start_cycles >= max_cycles
        };
        match self.clock.mode() {
            ClockMode::Manual => {
                while !done(&self.clock, &self.cpu) {
                    self.clock.step();
                }
            }
            ClockMode::Continuous => {
                let idle = self
                    .clock
                    .period()
                    .map_or(Duration::from_millis(1), |period| period / 8)
                    .min(Duration::from_millis(1));
                self.clock.start();
                while !done(&self.clock, &self.cpu) {
                    if !self.clock.tick() {
                        std::thread::sleep(idle);
                    }
                }
                self.clock.stop();
            }
        }
        let cpu = self.cpu.borrow();
        let summary = RunSummary {
            halted: cpu.is_halted(),
            clock_cycles: self.clock.cycle_count() - start_cycles,
            cpu_cycles: cpu.cycle_count(),
            instructions: cpu.instruction_count(),
            elapsed: started.elapsed(),
        };
        info!(
            target: "cpu",
            "Ran {} clock cycles in {:?} ({:.1} Hz), halted: {}",
            summary.clock_cycles,
            summary.elapsed,
            summary.speed_hz(),
            summary.halted
        );
        summary
    }
}
