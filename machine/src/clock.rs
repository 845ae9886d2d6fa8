use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use crate::error::{self, Result};

pub mod preset;
pub mod timer555;

pub use preset::{ClockSource, Preset};
pub use timer555::Astable555;

/// The two behaviorally distinct clock modes. Emulator, Arduino-timer and 555 sources all time
/// their edges in software, so they share `Continuous`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum ClockMode {
    /// Toggles every half period of wall time, when polled with `tick`.
    Continuous,
    /// Only produces a cycle when forced with `step`.
    Manual,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Edge {
    /// Low to high.
    Rising,
    /// High to low. Completes a cycle.
    Falling,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum Level {
    Low,
    High,
}

impl Default for Level {
    fn default() -> Self {
        Level::Low
    }
}

pub type EdgeCallback = Box<dyn FnMut() -> Result<()>>;

/// Monotonic time, measured from an arbitrary origin.
pub trait TimeSource {
    fn now(&self) -> Duration;
}

pub struct WallClock {
    origin: Instant,
}

impl Default for WallClock {
    fn default() -> Self {
        WallClock { origin: Instant::now() }
    }
}

impl TimeSource for WallClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClockStatus {
    pub mode: ClockMode,
    pub frequency_hz: f64,
    pub period: Option<Duration>,
    pub running: bool,
    pub level: Level,
    pub cycles: u64,
}

impl fmt::Display for ClockStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Clock({:?}, {} Hz, {}, cycles={})",
            self.mode,
            self.frequency_hz,
            if self.running { "RUNNING" } else { "STOPPED" },
            self.cycles
        )
    }
}

/// Two-phase clock. Rising and falling edges fire their callbacks in registration order; only
/// falling edges complete a cycle.
pub struct Clock<T: TimeSource = WallClock> {
    mode: ClockMode,
    frequency_hz: f64,
    half_period: Option<Duration>,

    running: bool,
    level: Level,
    cycle_count: u64,
    last_edge: Duration,
    time: T,

    rising_edge_callbacks: Vec<EdgeCallback>,
    falling_edge_callbacks: Vec<EdgeCallback>,
    fault_count: u64,
}

impl Clock<WallClock> {
    pub fn new(mode: ClockMode, frequency_hz: f64) -> Result<Clock<WallClock>> {
        Clock::with_time_source(mode, frequency_hz, WallClock::default())
    }

    pub fn from_preset(mode: ClockMode, preset: Preset) -> Result<Clock<WallClock>> {
        Clock::new(mode, preset.frequency_hz())
    }
}

impl<T: TimeSource> Clock<T> {
    pub fn with_time_source(mode: ClockMode, frequency_hz: f64, time: T) -> Result<Clock<T>> {
        let mut clock = Clock {
            mode,
            frequency_hz: 0.,
            half_period: None,
            running: false,
            level: Level::Low,
            cycle_count: 0,
            last_edge: Duration::from_secs(0),
            time,
            rising_edge_callbacks: Vec::new(),
            falling_edge_callbacks: Vec::new(),
            fault_count: 0,
        };
        clock.configure(frequency_hz)?;
        debug!(target: "clock", "Initialized: {:?} mode at {} Hz", mode, frequency_hz);
        Ok(clock)
    }

    /// Sets the frequency. A continuous clock rejects anything that is not finite and positive.
    pub fn configure(&mut self, frequency_hz: f64) -> Result<()> {
        validate(self.mode, frequency_hz)?;
        self.frequency_hz = frequency_hz;
        self.half_period = half_period(frequency_hz);
        debug!(
            target: "clock",
            "Frequency set to {} Hz (period: {:?})",
            frequency_hz,
            self.period()
        );
        Ok(())
    }

    /// Switches mode. Moving to `Continuous` re-validates the current frequency.
    pub fn set_mode(&mut self, mode: ClockMode) -> Result<()> {
        validate(mode, self.frequency_hz)?;
        self.mode = mode;
        Ok(())
    }

    pub fn start(&mut self) {
        self.running = true;
        self.last_edge = self.time.now();
        debug!(target: "clock", "Started at {} Hz", self.frequency_hz);
    }

    pub fn stop(&mut self) {
        self.running = false;
        debug!(target: "clock", "Stopped after {} cycles", self.cycle_count);
    }

    pub fn reset(&mut self) {
        self.cycle_count = 0;
        self.level = Level::Low;
        self.last_edge = self.time.now();
        debug!(target: "clock", "Reset");
    }

    pub fn register(&mut self, edge: Edge, callback: impl FnMut() -> Result<()> + 'static) {
        match edge {
            Edge::Rising => self.rising_edge_callbacks.push(Box::new(callback)),
            Edge::Falling => self.falling_edge_callbacks.push(Box::new(callback)),
        }
    }

    pub fn on_rising_edge(&mut self, callback: impl FnMut() -> Result<()> + 'static) {
        self.register(Edge::Rising, callback);
    }

    pub fn on_falling_edge(&mut self, callback: impl FnMut() -> Result<()> + 'static) {
        self.register(Edge::Falling, callback);
    }

    /// Polls a running continuous clock. If half a period has passed since the last edge, flips
    /// the level, fires the edge just entered and returns true.
    pub fn tick(&mut self) -> bool {
        if !self.running || self.mode == ClockMode::Manual {
            return false;
        }
        let half_period = match self.half_period {
            Some(half_period) => half_period,
            None => return false,
        };
        let now = self.time.now();
        let elapsed = now.checked_sub(self.last_edge).unwrap_or_default();
        if elapsed < half_period {
            return false;
        }
        self.last_edge = now;
        self.toggle();
        true
    }

    /// Forces one full cycle, rising then falling, whatever the mode or running state.
    pub fn step(&mut self) {
        self.fire(Edge::Rising);
        self.level = Level::High;
        self.fire(Edge::Falling);
        self.level = Level::Low;
        self.cycle_count += 1;
    }

    fn toggle(&mut self) {
        match self.level {
            Level::Low => {
                self.fire(Edge::Rising);
                self.level = Level::High;
            }
            Level::High => {
                self.fire(Edge::Falling);
                self.level = Level::Low;
                self.cycle_count += 1;
            }
        }
    }

    fn fire(&mut self, edge: Edge) {
        let callbacks = match edge {
            Edge::Rising => &mut self.rising_edge_callbacks,
            Edge::Falling => &mut self.falling_edge_callbacks,
        };
        for (index, callback) in callbacks.iter_mut().enumerate() {
            let fault = match panic::catch_unwind(AssertUnwindSafe(|| callback())) {
                Ok(Ok(())) => continue,
                Ok(Err(err)) => err,
                Err(payload) => error::Type::CallbackPanic(panic_message(payload.as_ref())),
            };
            self.fault_count += 1;
            error!(target: "clock", "{:?} edge callback #{} failed: {}", edge, index, fault);
        }
    }

    pub fn mode(&self) -> ClockMode {
        self.mode
    }

    pub fn frequency_hz(&self) -> f64 {
        self.frequency_hz
    }

    /// One full cycle, if the frequency defines one.
    pub fn period(&self) -> Option<Duration> {
        self.half_period.map(|half| half * 2)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    /// Number of callback invocations that returned an error or panicked.
    pub fn fault_count(&self) -> u64 {
        self.fault_count
    }

    pub fn status(&self) -> ClockStatus {
        ClockStatus {
            mode: self.mode,
            frequency_hz: self.frequency_hz,
            period: self.period(),
            running: self.running,
            level: self.level,
            cycles: self.cycle_count,
        }
    }
}

impl<T: TimeSource> fmt::Debug for Clock<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.status())
    }
}

fn validate(mode: ClockMode, frequency_hz: f64) -> Result<()> {
    let valid = match mode {
        ClockMode::Continuous => half_period(frequency_hz).is_some(),
        ClockMode::Manual => frequency_hz.is_finite(),
    };
    if valid {
        Ok(())
    } else {
        Err(error::Type::InvalidFrequency(frequency_hz))
    }
}

/// Slower clocks saturate here, which keeps the full period representable.
const MAX_HALF_PERIOD: Duration = Duration::from_secs(u64::max_value() / 2);

/// Half of the period, or `None` when the frequency is not finite and positive.
fn half_period(frequency_hz: f64) -> Option<Duration> {
    if !frequency_hz.is_finite() || frequency_hz <= 0. {
        return None;
    }
    let seconds = 0.5 / frequency_hz;
    if seconds < MAX_HALF_PERIOD.as_secs() as f64 {
        Some(Duration::from_secs_f64(seconds))
    } else {
        Some(MAX_HALF_PERIOD)
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".into()
    }
}
