use std::{collections::BTreeSet, time::Duration};

use spell_duel_core::{
    CastError, DuelConfig, DuelStatus, Event, PlayerId, ProjectileId, Spell, VisualKind,
};
use spell_duel_session::DuelSession;

fn session_with_mana(mana: u32) -> DuelSession {
    DuelSession::new(DuelConfig {
        starting_mana: mana,
        mana_regen_interval: Duration::ZERO,
        ..DuelConfig::default()
    })
}

fn millis(value: u64) -> Duration {
    Duration::from_millis(value)
}

/// Ticks every `step` milliseconds from `from` (exclusive) to `to` (inclusive),
/// collecting every event produced along the way.
fn run_until(session: &mut DuelSession, from: u64, to: u64, step: u64) -> Vec<Event> {
    let mut events = Vec::new();
    let mut now = from;
    while now < to {
        now = (now + step).min(to);
        events.extend_from_slice(session.tick(millis(now)));
    }
    events
}

#[test]
fn fireball_lands_after_its_travel_time() {
    let mut session = session_with_mana(2);

    session.cast(PlayerId::One, Spell::Fireball, Duration::ZERO);
    let _ = session.tick(Duration::ZERO);

    assert_eq!(session.player_state(PlayerId::One).mana, 1);
    let view = session.projectiles(Duration::ZERO).into_vec();
    assert_eq!(view.len(), 1);
    assert!(view[0].owner_is_player_one());
    assert_eq!(view[0].damage, 1);

    let events = run_until(&mut session, 0, 1_900, 100);
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::ProjectileLanded { .. })));
    assert_eq!(session.player_state(PlayerId::Two).hp, 3);

    let events = run_until(&mut session, 1_900, 2_000, 100);
    assert!(events.contains(&Event::ProjectileLanded {
        projectile: ProjectileId::new(0),
        target: PlayerId::Two,
        damage: 1,
        hp: 2,
    }));
    assert_eq!(session.player_state(PlayerId::Two).hp, 2);
    assert!(session.projectiles(millis(2_000)).is_empty());
}

#[test]
fn shield_reflects_landing_fireball_back_to_its_caster() {
    let mut session = session_with_mana(1);

    session.cast(PlayerId::Two, Spell::Fireball, Duration::ZERO);
    let _ = session.tick(Duration::ZERO);
    let _ = run_until(&mut session, 0, 1_500, 100);

    session.cast(PlayerId::One, Spell::Reflect, millis(1_500));
    let _ = session.tick(millis(1_500));
    assert!(session.shield_active(PlayerId::One, millis(2_000)));

    let events = run_until(&mut session, 1_500, 2_000, 100);
    assert!(events.contains(&Event::ProjectileReflected {
        original: ProjectileId::new(0),
        reflected: ProjectileId::new(1),
        owner: PlayerId::One,
        damage: 1,
    }));
    assert_eq!(session.player_state(PlayerId::One).hp, 3);

    let view = session.projectiles(millis(2_000)).into_vec();
    assert_eq!(view.len(), 1);
    assert_eq!(view[0].owner, PlayerId::One);
    assert_eq!(view[0].damage, 1);

    let _ = run_until(&mut session, 2_000, 4_000, 100);
    assert_eq!(session.player_state(PlayerId::Two).hp, 2);
    assert!(session.projectiles(millis(4_000)).is_empty());
}

#[test]
fn reflection_chains_while_both_shields_are_up() {
    let mut session = session_with_mana(2);

    session.cast(PlayerId::Two, Spell::Fireball, Duration::ZERO);
    let _ = session.tick(Duration::ZERO);
    let _ = run_until(&mut session, 0, 1_500, 100);
    session.cast(PlayerId::One, Spell::Reflect, millis(1_500));
    let _ = run_until(&mut session, 1_500, 3_500, 100);

    session.cast(PlayerId::Two, Spell::Reflect, millis(3_500));
    let events = run_until(&mut session, 3_500, 4_000, 100);

    assert!(events.contains(&Event::ProjectileReflected {
        original: ProjectileId::new(1),
        reflected: ProjectileId::new(2),
        owner: PlayerId::Two,
        damage: 1,
    }));
    assert_eq!(session.player_state(PlayerId::One).hp, 3);
    assert_eq!(session.player_state(PlayerId::Two).hp, 3);
}

#[test]
fn opposing_big_fireballs_weaken_each_other_once() {
    let mut session = session_with_mana(2);

    session.cast(PlayerId::One, Spell::BigFireBall, Duration::ZERO);
    session.cast(PlayerId::Two, Spell::BigFireBall, Duration::ZERO);
    let _ = session.tick(Duration::ZERO);

    let events = run_until(&mut session, 0, 1_700, 100);
    let collisions: Vec<&Event> = events
        .iter()
        .filter(|event| matches!(event, Event::ProjectilesCollided { .. }))
        .collect();
    assert_eq!(
        collisions,
        vec![&Event::ProjectilesCollided {
            first: ProjectileId::new(0),
            second: ProjectileId::new(1),
            first_damage: 1,
            second_damage: 1,
        }]
    );

    for snapshot in session.projectiles(millis(1_700)).iter() {
        assert_eq!(snapshot.damage, 1);
        assert_eq!(snapshot.visual_kind(), VisualKind::Ember);
    }
    assert_eq!(session.player_state(PlayerId::One).hp, 3);
    assert_eq!(session.player_state(PlayerId::Two).hp, 3);

    let _ = run_until(&mut session, 1_700, 3_000, 100);
    assert_eq!(session.player_state(PlayerId::One).hp, 2);
    assert_eq!(session.player_state(PlayerId::Two).hp, 2);
    assert!(session.projectiles(millis(3_000)).is_empty());
}

#[test]
fn amplify_is_consumed_and_buffs_the_opposing_fireball() {
    let mut session = session_with_mana(1);

    session.cast(PlayerId::One, Spell::Amplify, Duration::ZERO);
    session.cast(PlayerId::Two, Spell::Fireball, Duration::ZERO);
    let _ = session.tick(Duration::ZERO);

    let events = run_until(&mut session, 0, 1_000, 100);
    assert!(events.contains(&Event::ProjectileAmplified {
        amplifier: ProjectileId::new(0),
        target: ProjectileId::new(1),
        damage: 2,
    }));

    let view = session.projectiles(millis(1_000)).into_vec();
    assert_eq!(view.len(), 1);
    assert_eq!(view[0].id, ProjectileId::new(1));
    assert_eq!(view[0].damage, 2);
    assert_eq!(view[0].visual_kind(), VisualKind::Blaze);

    let _ = run_until(&mut session, 1_000, 2_000, 100);
    assert_eq!(session.player_state(PlayerId::One).hp, 1);
    assert_eq!(session.player_state(PlayerId::Two).hp, 3);
}

#[test]
fn cooldown_gates_repeat_casts() {
    let mut session = session_with_mana(3);

    session.cast(PlayerId::One, Spell::Fireball, Duration::ZERO);
    let _ = session.tick(Duration::ZERO);
    assert!(!session.is_usable(PlayerId::One, Spell::Fireball, millis(500)));
    let fraction = session.cooldown_fraction(PlayerId::One, Spell::Fireball, millis(500));
    assert!((fraction - 0.25).abs() < 1e-6);

    session.cast(PlayerId::One, Spell::Fireball, millis(500));
    let events = session.tick(millis(500)).to_vec();
    assert!(events.contains(&Event::CastRejected {
        player: PlayerId::One,
        spell: Spell::Fireball,
        reason: CastError::OnCooldown,
    }));
    assert_eq!(session.player_state(PlayerId::One).mana, 2);

    let events = run_until(&mut session, 500, 2_000, 500);
    assert!(events.contains(&Event::CooldownReady {
        player: PlayerId::One,
        spell: Spell::Fireball,
    }));
    assert!(session.is_usable(PlayerId::One, Spell::Fireball, millis(2_000)));
    assert_eq!(
        session.cooldown_fraction(PlayerId::One, Spell::Fireball, millis(2_000)),
        1.0
    );
}

#[test]
fn insufficient_mana_disables_spells() {
    let mut session = session_with_mana(1);

    assert!(!session.is_usable(PlayerId::One, Spell::BigFireBall, Duration::ZERO));
    assert!(session.is_usable(PlayerId::One, Spell::Fireball, Duration::ZERO));

    session.cast(PlayerId::One, Spell::BigFireBall, Duration::ZERO);
    let events = session.tick(Duration::ZERO).to_vec();

    assert!(events.contains(&Event::CastRejected {
        player: PlayerId::One,
        spell: Spell::BigFireBall,
        reason: CastError::InsufficientResources,
    }));
    assert_eq!(session.player_state(PlayerId::One).mana, 1);
    assert!(session.projectiles(Duration::ZERO).is_empty());
}

#[test]
fn projectile_identifiers_stay_unique() {
    let mut session = session_with_mana(20);
    let mut seen = BTreeSet::new();

    for second in 0..8 {
        let now = Duration::from_secs(second * 4);
        session.cast(PlayerId::One, Spell::Fireball, now);
        session.cast(PlayerId::Two, Spell::BigFireBall, now);
        for event in session.tick(now) {
            if let Event::ProjectileLaunched { projectile, .. }
            | Event::ProjectileReflected {
                reflected: projectile,
                ..
            } = event
            {
                assert!(seen.insert(*projectile), "identifier reused: {projectile:?}");
            }
        }
        let live: BTreeSet<ProjectileId> =
            session.projectiles(now).iter().map(|snapshot| snapshot.id).collect();
        assert_eq!(live.len(), session.projectiles(now).len());
        if session.status().is_over() {
            break;
        }
    }

    assert!(!seen.is_empty());
}

#[test]
fn win_is_reported_exactly_once() {
    let mut session = DuelSession::new(DuelConfig {
        starting_hp: 1,
        starting_mana: 1,
        mana_regen_interval: Duration::ZERO,
        ..DuelConfig::default()
    });

    session.cast(PlayerId::One, Spell::Fireball, Duration::ZERO);
    let _ = session.tick(Duration::ZERO);
    assert_eq!(session.status(), DuelStatus::InProgress);

    let mut events = run_until(&mut session, 0, 2_000, 250);
    session.cast(PlayerId::Two, Spell::Heal, millis(2_100));
    events.extend(run_until(&mut session, 2_000, 3_000, 250));

    let endings = events
        .iter()
        .filter(|event| matches!(event, Event::DuelEnded { .. }))
        .count();
    assert_eq!(endings, 1);
    assert_eq!(
        session.status(),
        DuelStatus::Ended {
            winner: PlayerId::One,
        }
    );
    assert!(events.contains(&Event::CastRejected {
        player: PlayerId::Two,
        spell: Spell::Heal,
        reason: CastError::DuelOver,
    }));
    assert_eq!(session.now(), millis(2_000));
    assert!(!session.is_usable(PlayerId::One, Spell::Heal, millis(3_000)));
}

#[test]
fn simultaneous_defeat_is_a_draw() {
    let mut session = DuelSession::new(DuelConfig {
        starting_hp: 1,
        starting_mana: 1,
        mana_regen_interval: Duration::ZERO,
        ..DuelConfig::default()
    });

    session.cast(PlayerId::One, Spell::Fireball, Duration::ZERO);
    session.cast(PlayerId::Two, Spell::Fireball, Duration::ZERO);
    let _ = session.tick(Duration::ZERO);
    let events = session.tick(Duration::from_secs(2)).to_vec();

    assert!(events.contains(&Event::DuelEnded {
        status: DuelStatus::Drawn,
    }));
    assert_eq!(session.status(), DuelStatus::Drawn);
}

#[test]
fn recharge_fractions_cover_the_catalog() {
    let mut session = session_with_mana(0);
    session.cast(PlayerId::Two, Spell::Heal, Duration::ZERO);
    let _ = session.tick(Duration::ZERO);

    let cooldowns = session.cooldowns(PlayerId::Two, millis(500));
    let spells: Vec<Spell> = cooldowns.iter().map(|snapshot| snapshot.spell).collect();
    assert_eq!(spells, Spell::ALL.to_vec());

    let heal = cooldowns
        .iter()
        .find(|snapshot| snapshot.spell == Spell::Heal)
        .expect("heal listed");
    assert!(heal.active);
    assert!((heal.recharge - 0.5).abs() < 1e-6);
}
