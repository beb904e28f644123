//! Hardware reconciliation
//!
//! Brings variable runtime state in line with the physical pins and the
//! clock around each tick:
//!
//! - before the tick, inputs are sampled, input edges latch flags and
//!   timers advance
//! - after the tick, digital outputs drive their pins
//!
//! Pins numbered 0 are not physical and are never touched.

use at_core::{DataType, OperationMode};
use at_store::AutomationStore;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, trace};

/// Full-scale reading of the 12-bit analog converter
pub const ANALOG_FULL_SCALE: i32 = 4095;

/// Pin access supplied by the host
pub trait IoBackend: Send + Sync {
    fn read_digital(&self, pin: u8) -> bool;
    fn read_analog(&self, pin: u8) -> i32;
    fn write_digital(&self, pin: u8, level: bool);
}

/// Monotonic millisecond clock
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;
}

/// Clock backed by [`Instant`], counting from its creation
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Clock advanced by hand
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: AtomicU64::new(start_ms),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// In-memory pins for hosts without GPIO hardware
///
/// Inputs read back whatever was last set with [`SimulatedIo::set_digital`]
/// or [`SimulatedIo::set_analog`]; unset pins read low / 0.
#[derive(Debug, Default)]
pub struct SimulatedIo {
    digital: DashMap<u8, bool>,
    analog: DashMap<u8, i32>,
}

impl SimulatedIo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the level a digital pin reads (or was last driven to)
    pub fn set_digital(&self, pin: u8, level: bool) {
        self.digital.insert(pin, level);
    }

    /// Set the raw reading of an analog pin
    pub fn set_analog(&self, pin: u8, raw: i32) {
        self.analog.insert(pin, raw);
    }

    /// Current level of a digital pin
    pub fn digital(&self, pin: u8) -> bool {
        self.digital.get(&pin).map(|v| *v).unwrap_or(false)
    }
}

impl IoBackend for SimulatedIo {
    fn read_digital(&self, pin: u8) -> bool {
        self.digital(pin)
    }

    fn read_analog(&self, pin: u8) -> i32 {
        self.analog.get(&pin).map(|v| *v).unwrap_or(0)
    }

    fn write_digital(&self, pin: u8, level: bool) {
        self.digital.insert(pin, level);
    }
}

/// Per-process reconciliation state
///
/// Timer start times are keyed by timer number, not registry slot, so they
/// follow a timer across a configuration reload.
#[derive(Debug, Default)]
pub struct IoReconciler {
    timer_started: HashMap<u8, u64>,
}

impl IoReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sample inputs and advance timers ahead of a tick
    pub fn sample_inputs(
        &mut self,
        store: &mut AutomationStore,
        backend: &dyn IoBackend,
        now_ms: u64,
    ) {
        for var in store.variables.iter_mut() {
            if !var.status {
                if var.data_type == DataType::Timer {
                    self.timer_started.remove(&var.num);
                }
                continue;
            }
            match var.data_type {
                DataType::DigitalInput if var.gpio != 0 => {
                    let level = backend.read_digital(var.gpio);
                    let edge = match var.mode {
                        OperationMode::Rising => !var.state && level,
                        OperationMode::Falling => var.state && !level,
                        OperationMode::StateChange => var.state != level,
                        _ => false,
                    };
                    if edge {
                        trace!(input = var.num, level, "Input edge latched");
                        var.flag = true;
                    }
                    var.state = level;
                }
                DataType::AnalogInput if var.gpio != 0 => {
                    let raw = backend.read_analog(var.gpio);
                    var.value = if var.mode == OperationMode::Scaled {
                        scale_analog(raw)
                    } else {
                        raw
                    };
                }
                DataType::Timer => {
                    let key = var.key();
                    if !var.state {
                        self.timer_started.remove(&key.num);
                        continue;
                    }
                    let started = *self.timer_started.entry(key.num).or_insert(now_ms);
                    let preset = u64::try_from(var.value).unwrap_or(0);
                    if now_ms.saturating_sub(started) < preset {
                        continue;
                    }

                    var.flag = true;
                    if var.mode == OperationMode::Repeating {
                        self.timer_started.insert(key.num, now_ms);
                    } else {
                        var.state = false;
                        self.timer_started.remove(&key.num);
                    }
                    debug!(timer = %key, "Timer expired");
                }
                _ => {}
            }
        }
    }

    /// Drive digital outputs after a tick
    ///
    /// A `Pulse` output is driven high once and then reset, so the next
    /// call drives it low again.
    pub fn drive_outputs(&mut self, store: &mut AutomationStore, backend: &dyn IoBackend) {
        for var in store
            .variables
            .iter_mut()
            .filter(|v| v.status && v.data_type == DataType::DigitalOutput && v.gpio != 0)
        {
            backend.write_digital(var.gpio, var.state);
            if var.mode == OperationMode::Pulse && var.state {
                trace!(output = var.num, "Pulse emitted");
                var.state = false;
            }
        }
    }
}

/// Map a raw 12-bit reading into 0..=100
pub fn scale_analog(raw: i32) -> i32 {
    let clamped = raw.clamp(0, ANALOG_FULL_SCALE);
    clamped * 100 / ANALOG_FULL_SCALE
}
