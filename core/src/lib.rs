#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Spell Duel engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative duel world, and pure systems. Adapters submit [`Command`]
//! values describing desired mutations, the world executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.
//!
//! All timestamps are [`Duration`] offsets measured from the start of the
//! duel on a monotonic clock.

use std::{fmt, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Spell Duel.";

/// Default fraction of a full flight within which opposing projectiles collide.
pub const DEFAULT_COLLISION_TOLERANCE: f32 = 0.1;

/// Identifies one of the two duelists.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum PlayerId {
    /// Duelist casting from the left edge of the board.
    One,
    /// Duelist casting from the right edge of the board.
    Two,
}

impl PlayerId {
    /// Both duelists in the deterministic order used for tie-breaks.
    pub const BOTH: [PlayerId; 2] = [PlayerId::One, PlayerId::Two];

    /// Returns the duelist on the other side of the board.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::One => Self::Two,
            Self::Two => Self::One,
        }
    }

    /// Numeric label (`1` or `2`) used by adapters.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }

    /// Resolves a numeric label back into a player identifier.
    #[must_use]
    pub const fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Self::One),
            2 => Some(Self::Two),
            _ => None,
        }
    }

    /// Dense index suitable for two-element arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::One => 0,
            Self::Two => 1,
        }
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player {}", self.number())
    }
}

/// Unique identifier assigned to a projectile.
///
/// Identifiers are allocated monotonically and never reused within a duel.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ProjectileId(u64);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Spells available to both duelists. The catalog is closed.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Spell {
    /// Restores a single hit point.
    Heal,
    /// Restores a single point of mana.
    Reload,
    /// Raises a short-lived shield that reflects landing projectiles.
    Reflect,
    /// Light projectile dealing one point of damage.
    Fireball,
    /// Slow, heavy projectile dealing two points of damage.
    BigFireBall,
    /// Projectile that strengthens the opposing projectile it collides with.
    Amplify,
}

impl Spell {
    /// Every spell in the catalog, in key-binding order.
    pub const ALL: [Spell; 6] = [
        Spell::Heal,
        Spell::Reload,
        Spell::Reflect,
        Spell::Fireball,
        Spell::BigFireBall,
        Spell::Amplify,
    ];

    /// Display name of the spell.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Heal => "Heal",
            Self::Reload => "Reload",
            Self::Reflect => "Reflect",
            Self::Fireball => "Fireball",
            Self::BigFireBall => "BigFireBall",
            Self::Amplify => "Amplify",
        }
    }

    /// Looks up a spell by its display name. Unknown names yield `None`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|spell| spell.name() == name)
    }

    /// Mana consumed when the spell is cast.
    #[must_use]
    pub const fn mana_cost(self) -> u32 {
        match self {
            Self::Heal | Self::Reload => 0,
            Self::Reflect | Self::Fireball | Self::Amplify => 1,
            Self::BigFireBall => 2,
        }
    }

    /// Minimum time between two casts of the spell by the same duelist.
    #[must_use]
    pub const fn cooldown(self) -> Duration {
        match self {
            Self::Heal | Self::Reload => Duration::from_secs(1),
            Self::Fireball => Duration::from_secs(2),
            Self::Reflect | Self::Amplify => Duration::from_secs(3),
            Self::BigFireBall => Duration::from_secs(4),
        }
    }

    /// Time a projectile needs to cross the board. Zero for non-projectiles.
    #[must_use]
    pub const fn travel_time(self) -> Duration {
        match self {
            Self::Heal | Self::Reload | Self::Reflect => Duration::ZERO,
            Self::Fireball | Self::Amplify => Duration::from_secs(2),
            Self::BigFireBall => Duration::from_secs(3),
        }
    }

    /// Damage carried by a freshly spawned projectile.
    #[must_use]
    pub const fn damage(self) -> u32 {
        match self {
            Self::Heal | Self::Reload | Self::Reflect => 0,
            Self::Fireball | Self::Amplify => 1,
            Self::BigFireBall => 2,
        }
    }

    /// Broad category of the spell.
    #[must_use]
    pub const fn effect(self) -> EffectKind {
        match self {
            Self::Heal | Self::Reload => EffectKind::Instant,
            Self::Reflect => EffectKind::Utility,
            Self::Fireball | Self::BigFireBall | Self::Amplify => EffectKind::Projectile,
        }
    }

    /// Special behaviour consulted by collision and landing resolution.
    #[must_use]
    pub const fn special(self) -> Special {
        match self {
            Self::Reflect => Special::Reflect,
            Self::Amplify => Special::Amplify,
            Self::Heal | Self::Reload | Self::Fireball | Self::BigFireBall => Special::None,
        }
    }

    /// Length of the reflect window opened by the spell, zero for everything else.
    #[must_use]
    pub const fn shield_duration(self) -> Duration {
        match self {
            Self::Reflect => Duration::from_secs(1),
            Self::Heal | Self::Reload | Self::Fireball | Self::BigFireBall | Self::Amplify => {
                Duration::ZERO
            }
        }
    }

    /// Primary effect applied by the dispatcher when the spell is cast.
    #[must_use]
    pub const fn action(self) -> SpellAction {
        match self {
            Self::Heal => SpellAction::RestoreHp(1),
            Self::Reload => SpellAction::RestoreMana(1),
            Self::Reflect => SpellAction::ActivateShield(self.shield_duration()),
            Self::Fireball | Self::BigFireBall | Self::Amplify => SpellAction::LaunchProjectile,
        }
    }

    /// Reports whether the duelist lacks the resources to cast the spell.
    #[must_use]
    pub fn is_disabled(self, player: &PlayerSnapshot) -> bool {
        player.mana < self.mana_cost()
    }
}

impl fmt::Display for Spell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown spell name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownSpell(pub String);

impl fmt::Display for UnknownSpell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown spell '{}'", self.0)
    }
}

impl std::error::Error for UnknownSpell {}

impl FromStr for Spell {
    type Err = UnknownSpell;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::from_name(value.trim()).ok_or_else(|| UnknownSpell(value.to_owned()))
    }
}

/// Broad category of a spell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    /// Resolves immediately on the caster.
    Instant,
    /// Spawns a projectile that travels toward the opponent.
    Projectile,
    /// Changes the caster's defensive state.
    Utility,
}

/// Special behaviour tag attached to a spell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Special {
    /// No special behaviour.
    None,
    /// Buffs the opposing projectile on collision instead of being damaged.
    Amplify,
    /// Reflects landing projectiles while the shield is up.
    Reflect,
}

/// Primary effect performed when a spell is cast.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpellAction {
    /// Adds hit points to the caster.
    RestoreHp(u32),
    /// Adds mana to the caster.
    RestoreMana(u32),
    /// Launches a projectile toward the opponent.
    LaunchProjectile,
    /// Raises the caster's shield for the provided duration.
    ActivateShield(Duration),
}

/// Reasons a cast request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CastError {
    /// The duel already ended, so no further casts are processed.
    DuelOver,
    /// The spell is still recharging for this duelist.
    OnCooldown,
    /// The duelist lacks the mana required by the spell.
    InsufficientResources,
}

impl fmt::Display for CastError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuelOver => f.write_str("duel is over"),
            Self::OnCooldown => f.write_str("spell is on cooldown"),
            Self::InsufficientResources => f.write_str("not enough mana"),
        }
    }
}

/// Lifecycle state of a duel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DuelStatus {
    /// Both duelists are still standing.
    InProgress,
    /// One duelist was defeated.
    Ended {
        /// Duelist left standing.
        winner: PlayerId,
    },
    /// Both duelists fell during the same tick.
    Drawn,
}

impl DuelStatus {
    /// Reports whether the duel reached a terminal state.
    #[must_use]
    pub const fn is_over(self) -> bool {
        !matches!(self, Self::InProgress)
    }

    /// Winner of the duel, if one was decided.
    #[must_use]
    pub const fn winner(self) -> Option<PlayerId> {
        match self {
            Self::Ended { winner } => Some(winner),
            Self::InProgress | Self::Drawn => None,
        }
    }
}

/// Tunable rules applied to a duel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DuelConfig {
    /// Hit points each duelist starts with.
    pub starting_hp: i32,
    /// Mana each duelist starts with.
    pub starting_mana: u32,
    /// Interval between passive mana gains. Zero disables regeneration.
    pub mana_regen_interval: Duration,
    /// Mana granted to both duelists at each regeneration interval.
    pub mana_regen_amount: u32,
    /// Progress distance within which opposing projectiles collide.
    pub collision_tolerance: f32,
}

impl Default for DuelConfig {
    fn default() -> Self {
        Self {
            starting_hp: 3,
            starting_mana: 0,
            mana_regen_interval: Duration::from_secs(5),
            mana_regen_amount: 1,
            collision_tolerance: DEFAULT_COLLISION_TOLERANCE,
        }
    }
}

/// Commands that express all permissible duel mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the duel clock to the provided timestamp.
    Tick {
        /// Timestamp the duel clock should reach.
        now: Duration,
    },
    /// Requests that a duelist casts a spell.
    CastSpell {
        /// Duelist casting the spell.
        player: PlayerId,
        /// Spell being cast.
        spell: Spell,
        /// Timestamp at which the cast was requested.
        at: Duration,
    },
    /// Grants passive mana to both duelists.
    RegenerateMana {
        /// Mana granted to each duelist.
        amount: u32,
    },
    /// Requests resolution of an encounter between two opposing projectiles.
    ResolveCollision {
        /// Projectile owned by player one.
        first: ProjectileId,
        /// Projectile owned by player two.
        second: ProjectileId,
    },
    /// Requests that a projectile which completed its flight lands.
    LandProjectile {
        /// Projectile that reached the far side of the board.
        projectile: ProjectileId,
    },
    /// Requests that the world evaluates the win condition.
    EvaluateOutcome,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// Indicates that the duel clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
        /// Timestamp reached by the clock.
        now: Duration,
    },
    /// Confirms that a duelist cast a spell.
    SpellCast {
        /// Duelist that cast the spell.
        player: PlayerId,
        /// Spell that was cast.
        spell: Spell,
    },
    /// Reports that a cast request was rejected.
    CastRejected {
        /// Duelist that requested the cast.
        player: PlayerId,
        /// Spell that was requested.
        spell: Spell,
        /// Specific reason the cast failed.
        reason: CastError,
    },
    /// Confirms that a projectile entered the board.
    ProjectileLaunched {
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
        /// Duelist owning the projectile.
        owner: PlayerId,
        /// Spell the projectile originates from.
        spell: Spell,
        /// Damage carried by the projectile.
        damage: u32,
    },
    /// Confirms that a duelist raised a shield.
    ShieldActivated {
        /// Duelist protected by the shield.
        player: PlayerId,
        /// Timestamp after which the shield no longer reflects.
        expires_at: Duration,
    },
    /// Announces that a spell finished recharging.
    CooldownReady {
        /// Duelist owning the cooldown.
        player: PlayerId,
        /// Spell that became available again.
        spell: Spell,
    },
    /// Reports that a duelist gained passive mana.
    ManaRegenerated {
        /// Duelist that gained mana.
        player: PlayerId,
        /// Mana after the gain.
        mana: u32,
    },
    /// Reports a mutual-cancel collision between two projectiles.
    ProjectilesCollided {
        /// Projectile owned by player one.
        first: ProjectileId,
        /// Projectile owned by player two.
        second: ProjectileId,
        /// Damage left on the first projectile.
        first_damage: u32,
        /// Damage left on the second projectile.
        second_damage: u32,
    },
    /// Reports that an amplify projectile was consumed to buff another.
    ProjectileAmplified {
        /// Amplify projectile that was consumed.
        amplifier: ProjectileId,
        /// Opposing projectile that received the buff.
        target: ProjectileId,
        /// Damage carried by the target after the buff.
        damage: u32,
    },
    /// Reports that a shield reflected a landing projectile.
    ProjectileReflected {
        /// Projectile retired by the reflection.
        original: ProjectileId,
        /// Projectile spawned toward the original caster.
        reflected: ProjectileId,
        /// Owner of the reflected projectile.
        owner: PlayerId,
        /// Damage carried by the reflected projectile.
        damage: u32,
    },
    /// Reports that a projectile hit a duelist.
    ProjectileLanded {
        /// Projectile that landed.
        projectile: ProjectileId,
        /// Duelist that was hit.
        target: PlayerId,
        /// Damage applied.
        damage: u32,
        /// Hit points left on the target.
        hp: i32,
    },
    /// Reports that an inert projectile left the board without effect.
    ProjectileFizzled {
        /// Projectile that was retired.
        projectile: ProjectileId,
    },
    /// Announces the terminal outcome of the duel. Emitted exactly once.
    DuelEnded {
        /// Final status of the duel.
        status: DuelStatus,
    },
}

/// Immutable representation of a duelist's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    /// Duelist described by the snapshot.
    pub id: PlayerId,
    /// Remaining hit points. Zero or below signals defeat.
    pub hp: i32,
    /// Available mana.
    pub mana: u32,
    /// Timestamp after which the shield stops reflecting, if ever raised.
    pub shield_expires_at: Option<Duration>,
}

impl PlayerSnapshot {
    /// Reports whether the shield reflects projectiles at the provided time.
    #[must_use]
    pub fn is_shield_active(&self, now: Duration) -> bool {
        self.shield_expires_at
            .map_or(false, |expires_at| now < expires_at)
    }
}

/// Appearance tag rendered for a projectile, derived from its damage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VisualKind {
    /// Inert projectile that is no longer drawn.
    Spent,
    /// Small projectile carrying a single point of damage.
    Ember,
    /// Large projectile carrying two points of damage.
    Blaze,
    /// Oversized projectile carrying three or more points of damage.
    Inferno,
}

impl VisualKind {
    /// Derives the appearance tag for the provided damage value.
    #[must_use]
    pub const fn for_damage(damage: u32) -> Self {
        match damage {
            0 => Self::Spent,
            1 => Self::Ember,
            2 => Self::Blaze,
            _ => Self::Inferno,
        }
    }
}

/// Immutable representation of a single projectile used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Unique identifier assigned to the projectile.
    pub id: ProjectileId,
    /// Spell the projectile originates from.
    pub spell: Spell,
    /// Duelist owning the projectile.
    pub owner: PlayerId,
    /// Damage currently carried by the projectile.
    pub damage: u32,
    /// Timestamp the projectile entered the board.
    pub cast_at: Duration,
    /// Time needed to cross the board.
    pub travel_time: Duration,
    /// Flight progress at the time the snapshot was captured.
    pub progress: f32,
}

impl ProjectileSnapshot {
    /// Reports whether the projectile is owned by player one.
    #[must_use]
    pub fn owner_is_player_one(&self) -> bool {
        self.owner == PlayerId::One
    }

    /// Reports whether the projectile lost all of its damage.
    #[must_use]
    pub const fn is_inert(&self) -> bool {
        self.damage == 0
    }

    /// Reports whether the projectile completed its flight.
    #[must_use]
    pub fn has_arrived(&self) -> bool {
        self.progress >= 1.0
    }

    /// Appearance tag for the projectile.
    #[must_use]
    pub const fn visual_kind(&self) -> VisualKind {
        VisualKind::for_damage(self.damage)
    }

    /// Position on the board measured from player one's edge, in `[0, 1]`.
    #[must_use]
    pub fn position_from_player_one(&self) -> f32 {
        let progress = self.progress.clamp(0.0, 1.0);
        match self.owner {
            PlayerId::One => progress,
            PlayerId::Two => 1.0 - progress,
        }
    }
}

/// Read-only snapshot describing all airborne projectiles.
#[derive(Clone, Debug, Default)]
pub struct ProjectileView {
    snapshots: Vec<ProjectileSnapshot>,
}

impl ProjectileView {
    /// Creates a new projectile view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ProjectileSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in ascending identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &ProjectileSnapshot> {
        self.snapshots.iter()
    }

    /// Iterator over the projectiles owned by the provided duelist.
    pub fn owned_by(&self, owner: PlayerId) -> impl Iterator<Item = &ProjectileSnapshot> {
        self.snapshots
            .iter()
            .filter(move |snapshot| snapshot.owner == owner)
    }

    /// Number of airborne projectiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no projectile is airborne.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ProjectileSnapshot> {
        self.snapshots
    }
}

/// Recharge state of a single spell for a duelist.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CooldownSnapshot {
    /// Spell described by the snapshot.
    pub spell: Spell,
    /// Indicates whether the spell is still recharging.
    pub active: bool,
    /// Timestamp of the most recent cast, if any.
    pub last_triggered: Option<Duration>,
    /// Recharge fraction in `[0, 1]`.
    pub recharge: f32,
}

/// Computes flight progress for a projectile at the provided time.
///
/// The result lies in `[0, ∞)` and is meaningful within `[0, 1]`. A zero
/// travel time counts as an immediate arrival.
#[must_use]
pub fn flight_progress(cast_at: Duration, travel_time: Duration, now: Duration) -> f32 {
    if travel_time.is_zero() {
        return 1.0;
    }
    let elapsed = now.saturating_sub(cast_at);
    elapsed.as_secs_f32() / travel_time.as_secs_f32()
}

/// Reports whether two board positions coincide within `tolerance`.
///
/// The bound is inclusive and absorbs one `f32::EPSILON` of rounding, so a
/// gap equal to the tolerance counts as touching.
#[must_use]
pub fn positions_touch(first: f32, second: f32, tolerance: f32) -> bool {
    (first - second).abs() <= tolerance + f32::EPSILON
}

/// Computes the recharge fraction of a cooldown, clamped to `[0, 1]`.
///
/// A spell that was never cast is fully recharged.
#[must_use]
pub fn recharge_fraction(
    last_triggered: Option<Duration>,
    cooldown: Duration,
    now: Duration,
) -> f32 {
    let Some(last_triggered) = last_triggered else {
        return 1.0;
    };
    if cooldown.is_zero() {
        return 1.0;
    }
    let elapsed = now.saturating_sub(last_triggered);
    (elapsed.as_secs_f32() / cooldown.as_secs_f32()).clamp(0.0, 1.0)
}
