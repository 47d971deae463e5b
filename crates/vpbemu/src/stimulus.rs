//! External signals applied to the board's pins.
//!
//! The firmware waits for a rising edge on the trigger pin. Something has
//! to provide it: either the start-signal output wired straight back to the
//! trigger (one edge, once the firmware is ready), or a pulse generator on
//! the trigger pin.

use crate::mmio::GpioState;
use tracing::debug;
use versatilepb_hw::pins;

#[derive(Debug, Clone, Default)]
pub struct StimulusConfig {
    /// Wire the start-signal pin to the trigger pin
    pub loopback: bool,
    /// Pulse the trigger pin with this period in ticks: low for the first
    /// half, high for the second
    pub trigger_period: Option<u64>,
}

/// Pulse generator on the trigger pin
#[derive(Debug)]
pub struct Stimulus {
    period: Option<u64>,
    high: bool,
    pub edges: u64,
}

impl Stimulus {
    pub fn new(config: &StimulusConfig) -> Self {
        Self {
            period: config.trigger_period.map(|p| p.max(2)),
            high: false,
            edges: 0,
        }
    }

    /// Level the generator drives at emulated time `now`
    fn level_at(&self, now: u64) -> bool {
        match self.period {
            Some(period) => now % period >= period / 2,
            None => false,
        }
    }

    /// Ticks from `now` until the generator next changes level, if it ever
    /// does. Time must not advance past this in one step or the change is
    /// missed.
    pub fn ticks_to_next_transition(&self, now: u64) -> Option<u64> {
        let period = self.period?;
        let half = period / 2;
        let phase = now % period;
        Some(if phase < half { half - phase } else { period - phase })
    }

    /// Bring the trigger pin up to date with emulated time `now`.
    pub fn apply(&mut self, now: u64, gpio: &mut GpioState) {
        if self.period.is_none() {
            return;
        }

        let high = self.level_at(now);
        if high == self.high {
            return;
        }
        self.high = high;
        if high {
            self.edges += 1;
            debug!("Stimulus: trigger rising edge #{} at tick {}", self.edges, now);
        }
        gpio.drive_input(pins::TRIGGER, high);
    }
}
