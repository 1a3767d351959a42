#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Spell Duel.

mod config;
mod script;

use std::{fmt, path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{debug, info, warn};
use spell_duel_core::{DuelStatus, Event, PlayerId, PlayerSnapshot};
use spell_duel_session::DuelSession;
use spell_duel_world::query;

use crate::{
    config::{KeyBindings, Settings},
    script::Script,
};

/// Command-line arguments accepted by the duel runner.
#[derive(Debug, Parser)]
#[command(name = "spell-duel", version, about = "Runs a headless Spell Duel")]
struct Args {
    /// TOML file overriding duel rules and key bindings.
    #[arg(long)]
    config: Option<PathBuf>,
    /// TOML file of `[[press]]` entries to replay.
    #[arg(long, conflicts_with = "seed")]
    script: Option<PathBuf>,
    /// Seed for randomly generated key presses.
    #[arg(long)]
    seed: Option<u64>,
    /// Maximum simulated duel length in seconds.
    #[arg(long, default_value_t = 60.0)]
    duration: f32,
    /// Fixed simulation step in milliseconds.
    #[arg(long, default_value_t = 16)]
    tick_ms: u64,
}

/// Entry point for the Spell Duel command-line interface.
fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let settings = Settings::load(args.config.as_deref())?;
    let duration = Duration::try_from_secs_f32(args.duration)
        .with_context(|| format!("invalid --duration {}", args.duration))?;
    if args.tick_ms == 0 {
        bail!("--tick-ms must be greater than zero");
    }
    let step = Duration::from_millis(args.tick_ms);

    let script = match &args.script {
        Some(path) => Script::load(path)?,
        None => Script::random(&settings.bindings, args.seed.unwrap_or_default(), duration),
    };
    debug!("loaded {} key presses", script.len());

    let mut session = DuelSession::new(settings.duel);
    println!("{}", query::welcome_banner(session.world()));
    let rules = query::config(session.world());
    info!(
        "starting duel: {} hp, {} mana, +{} mana every {:?}, collision tolerance {}",
        rules.starting_hp,
        rules.starting_mana,
        rules.mana_regen_amount,
        rules.mana_regen_interval,
        rules.collision_tolerance
    );
    let summary = run(&mut session, &settings.bindings, script, duration, step);
    println!("{summary}");
    Ok(())
}

/// Drives the session with fixed steps until the duel ends or `duration` elapses.
fn run(
    session: &mut DuelSession,
    bindings: &KeyBindings,
    script: Script,
    duration: Duration,
    step: Duration,
) -> Summary {
    let mut presses = script.into_presses().into_iter().peekable();
    let mut now = Duration::ZERO;

    loop {
        while let Some(press) = presses.next_if(|press| press.at <= now) {
            match bindings.resolve(&press.key) {
                Some((player, spell)) => session.cast(player, spell, press.at),
                None => warn!("ignoring unbound key '{}' at {:?}", press.key, press.at),
            }
        }

        for event in session.tick(now) {
            log_event(event);
        }

        if session.status().is_over() || now >= duration {
            break;
        }
        now = (now + step).min(duration);
    }

    Summary {
        status: session.status(),
        elapsed: session.now(),
        players: PlayerId::BOTH.map(|player| session.player_state(player)),
    }
}

fn log_event(event: &Event) {
    match event {
        Event::TimeAdvanced { .. } | Event::CooldownReady { .. } => {}
        Event::SpellCast { player, spell } => info!("{player} casts {spell}"),
        Event::CastRejected {
            player,
            spell,
            reason,
        } => debug!("{player} cannot cast {spell}: {reason}"),
        Event::ProjectileLaunched {
            projectile,
            owner,
            spell,
            damage,
        } => debug!(
            "{owner} launched {spell} #{} with damage {damage}",
            projectile.get()
        ),
        Event::ShieldActivated { player, expires_at } => {
            debug!("{player} raised a shield until {expires_at:?}");
        }
        Event::ManaRegenerated { player, mana } => debug!("{player} regenerated to {mana} mana"),
        Event::ProjectilesCollided {
            first,
            second,
            first_damage,
            second_damage,
        } => info!(
            "projectiles #{} and #{} collided, damage now {first_damage} and {second_damage}",
            first.get(),
            second.get()
        ),
        Event::ProjectileAmplified {
            amplifier,
            target,
            damage,
        } => info!(
            "projectile #{} amplified #{} to damage {damage}",
            amplifier.get(),
            target.get()
        ),
        Event::ProjectileReflected {
            original,
            reflected,
            owner,
            damage,
        } => info!(
            "{owner} reflected #{} back as #{} with damage {damage}",
            original.get(),
            reflected.get()
        ),
        Event::ProjectileLanded {
            projectile,
            target,
            damage,
            hp,
        } => info!(
            "projectile #{} hit {target} for {damage}, hp now {hp}",
            projectile.get()
        ),
        Event::ProjectileFizzled { projectile } => {
            debug!("projectile #{} fizzled", projectile.get());
        }
        Event::DuelEnded { status } => info!("duel over: {}", describe_status(*status)),
    }
}

fn describe_status(status: DuelStatus) -> String {
    match status {
        DuelStatus::InProgress => "still in progress".to_owned(),
        DuelStatus::Ended { winner } => format!("{winner} wins"),
        DuelStatus::Drawn => "draw".to_owned(),
    }
}

/// Final state reported once the run loop stops.
#[derive(Clone, Debug, PartialEq)]
struct Summary {
    status: DuelStatus,
    elapsed: Duration,
    players: [PlayerSnapshot; 2],
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Result after {:.2}s: {}",
            self.elapsed.as_secs_f32(),
            describe_status(self.status)
        )?;
        for (index, player) in self.players.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write!(f, "  {}: hp {} mana {}", player.id, player.hp, player.mana)?;
        }
        Ok(())
    }
}
