//! Per-duelist, per-spell cooldown bookkeeping.

use std::{collections::BTreeMap, time::Duration};

use spell_duel_core::{recharge_fraction, CooldownSnapshot, Event, PlayerId, Spell};

#[derive(Clone, Copy, Debug, Default)]
struct CooldownEntry {
    active: bool,
    last_triggered: Option<Duration>,
}

/// Tracks which spells each duelist is still recharging.
#[derive(Debug, Default)]
pub(crate) struct CooldownTracker {
    entries: BTreeMap<(PlayerId, Spell), CooldownEntry>,
}

impl CooldownTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Marks the spell as recharging from `now`.
    pub(crate) fn start(&mut self, player: PlayerId, spell: Spell, now: Duration) {
        let entry = self.entries.entry((player, spell)).or_default();
        entry.active = true;
        entry.last_triggered = Some(now);
    }

    /// Reports whether the spell is still recharging at `now`.
    ///
    /// The stored flag is cleared on the next tick; the elapsed-time check keeps
    /// queries between ticks consistent with the clock.
    pub(crate) fn is_active(&self, player: PlayerId, spell: Spell, now: Duration) -> bool {
        self.entries
            .get(&(player, spell))
            .map_or(false, |entry| entry.active && !has_elapsed(entry, spell, now))
    }

    /// Clears every cooldown that ran out by `now`, announcing each one.
    pub(crate) fn expire(&mut self, now: Duration, out_events: &mut Vec<Event>) {
        for (&(player, spell), entry) in self.entries.iter_mut() {
            if entry.active && has_elapsed(entry, spell, now) {
                entry.active = false;
                out_events.push(Event::CooldownReady { player, spell });
            }
        }
    }

    pub(crate) fn snapshot(&self, player: PlayerId, spell: Spell, now: Duration) -> CooldownSnapshot {
        let last_triggered = self
            .entries
            .get(&(player, spell))
            .and_then(|entry| entry.last_triggered);
        CooldownSnapshot {
            spell,
            active: self.is_active(player, spell, now),
            last_triggered,
            recharge: recharge_fraction(last_triggered, spell.cooldown(), now),
        }
    }
}

fn has_elapsed(entry: &CooldownEntry, spell: Spell, now: Duration) -> bool {
    entry
        .last_triggered
        .map_or(true, |last| now.saturating_sub(last) >= spell.cooldown())
}
