#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic system that grants both duelists passive mana over time.

use std::time::Duration;

use spell_duel_core::{Command, DuelStatus, Event};

/// Configuration parameters required to construct the regeneration system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    interval: Duration,
    amount: u32,
}

impl Config {
    /// Creates a configuration granting `amount` mana every `interval`.
    ///
    /// A zero interval disables regeneration.
    #[must_use]
    pub const fn new(interval: Duration, amount: u32) -> Self {
        Self { interval, amount }
    }
}

/// Pure system that derives regeneration from the clock carried by time events.
///
/// Mana arrives whenever the duel clock crosses a multiple of the interval, so
/// the system keeps no pending state between ticks.
#[derive(Debug)]
pub struct ManaRegeneration {
    interval: Duration,
    amount: u32,
}

impl ManaRegeneration {
    /// Creates a new regeneration system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            interval: config.interval,
            amount: config.amount,
        }
    }

    /// Consumes time events and emits one command per interval boundary crossed.
    pub fn handle(&self, events: &[Event], status: DuelStatus, out: &mut Vec<Command>) {
        if status.is_over() || self.interval.is_zero() || self.amount == 0 {
            return;
        }

        for event in events {
            if let Event::TimeAdvanced { dt, now } = event {
                let previous = now.saturating_sub(*dt);
                for _ in 0..self.boundaries_between(previous, *now) {
                    out.push(Command::RegenerateMana {
                        amount: self.amount,
                    });
                }
            }
        }
    }

    fn boundaries_between(&self, previous: Duration, now: Duration) -> u128 {
        let interval = self.interval.as_nanos();
        if interval == 0 {
            return 0;
        }
        (now.as_nanos() / interval).saturating_sub(previous.as_nanos() / interval)
    }
}
