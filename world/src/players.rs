//! Authoritative hit point, mana and shield state for both duelists.

use std::time::Duration;

use spell_duel_core::{PlayerId, PlayerSnapshot};

#[derive(Clone, Debug)]
struct PlayerState {
    hp: i32,
    mana: u32,
    shield_expires_at: Option<Duration>,
}

/// Pair of duelists indexed by [`PlayerId`].
#[derive(Clone, Debug)]
pub(crate) struct Players {
    states: [PlayerState; 2],
}

impl Players {
    /// Creates both duelists with identical starting resources.
    pub(crate) fn new(hp: i32, mana: u32) -> Self {
        let state = PlayerState {
            hp,
            mana,
            shield_expires_at: None,
        };
        Self {
            states: [state.clone(), state],
        }
    }

    pub(crate) fn snapshot(&self, player: PlayerId) -> PlayerSnapshot {
        let state = &self.states[player.index()];
        PlayerSnapshot {
            id: player,
            hp: state.hp,
            mana: state.mana,
            shield_expires_at: state.shield_expires_at,
        }
    }

    /// Adds `delta` to the duelist's mana, saturating at zero. Returns the new total.
    pub(crate) fn apply_mana_delta(&mut self, player: PlayerId, delta: i64) -> u32 {
        let state = &mut self.states[player.index()];
        let updated = (i64::from(state.mana) + delta).clamp(0, i64::from(u32::MAX));
        state.mana = u32::try_from(updated).unwrap_or(u32::MAX);
        state.mana
    }

    /// Adds `delta` to the duelist's hit points. Defeat is detected, not prevented.
    pub(crate) fn apply_hp_delta(&mut self, player: PlayerId, delta: i32) -> i32 {
        let state = &mut self.states[player.index()];
        state.hp = state.hp.saturating_add(delta);
        state.hp
    }

    /// Raises the shield until `now + duration`, returning the expiry.
    pub(crate) fn activate_shield(
        &mut self,
        player: PlayerId,
        now: Duration,
        duration: Duration,
    ) -> Duration {
        let expires_at = now.saturating_add(duration);
        self.states[player.index()].shield_expires_at = Some(expires_at);
        expires_at
    }

    pub(crate) fn is_shield_active(&self, player: PlayerId, now: Duration) -> bool {
        self.snapshot(player).is_shield_active(now)
    }

    pub(crate) fn is_defeated(&self, player: PlayerId) -> bool {
        self.states[player.index()].hp <= 0
    }
}
