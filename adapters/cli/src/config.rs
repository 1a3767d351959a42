//! Duel rules and key bindings loaded from a TOML file.

use std::{collections::BTreeMap, fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use serde::Deserialize;
use spell_duel_core::{DuelConfig, PlayerId, Spell};
use thiserror::Error;

const PLAYER_ONE_KEYS: [&str; 6] = ["1", "q", "a", "z", "x", "s"];
const PLAYER_TWO_KEYS: [&str; 6] = ["-", "p", "l", ",", "m", "k"];

/// Errors raised while validating a configuration file.
#[derive(Debug, Error, PartialEq)]
pub(crate) enum ConfigError {
    /// A binding names a spell outside the catalog.
    #[error("{player} binds key '{key}' to unknown spell '{spell}'")]
    UnknownSpell {
        player: PlayerId,
        key: String,
        spell: String,
    },
    /// The same key is bound for both duelists.
    #[error("key '{key}' is bound for both players")]
    SharedKey { key: String },
    /// A duel setting is out of range.
    #[error("invalid value {value} for {field}")]
    InvalidSetting { field: &'static str, value: String },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    duel: DuelSection,
    bindings: BindingsSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct DuelSection {
    starting_hp: Option<i32>,
    starting_mana: Option<u32>,
    mana_regen_interval_secs: Option<f32>,
    mana_regen_amount: Option<u32>,
    collision_tolerance: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct BindingsSection {
    player_one: Option<BTreeMap<String, String>>,
    player_two: Option<BTreeMap<String, String>>,
}

/// Mapping from key symbols to the spell each duelist casts with it.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct KeyBindings {
    keys: BTreeMap<String, (PlayerId, Spell)>,
}

impl KeyBindings {
    /// Default layout: number row and left hand for player one, right hand for player two.
    pub(crate) fn prototype() -> Self {
        let mut keys = BTreeMap::new();
        for (player, layout) in [
            (PlayerId::One, PLAYER_ONE_KEYS),
            (PlayerId::Two, PLAYER_TWO_KEYS),
        ] {
            for (key, spell) in layout.into_iter().zip(Spell::ALL) {
                let _ = keys.insert(key.to_owned(), (player, spell));
            }
        }
        Self { keys }
    }

    /// Resolves a pressed key into the duelist and spell it triggers.
    pub(crate) fn resolve(&self, key: &str) -> Option<(PlayerId, Spell)> {
        self.keys.get(key).copied()
    }

    /// Keys bound for the provided duelist, in sorted order.
    pub(crate) fn keys_for(&self, player: PlayerId) -> Vec<&str> {
        self.keys
            .iter()
            .filter(|(_, (owner, _))| *owner == player)
            .map(|(key, _)| key.as_str())
            .collect()
    }

    fn with_overrides(
        player_one: Option<BTreeMap<String, String>>,
        player_two: Option<BTreeMap<String, String>>,
    ) -> Result<Self, ConfigError> {
        let defaults = Self::prototype();
        let mut keys = BTreeMap::new();

        for (player, table) in [(PlayerId::One, player_one), (PlayerId::Two, player_two)] {
            let entries: Vec<(String, Spell)> = match table {
                Some(table) => table
                    .into_iter()
                    .map(|(key, spell)| match Spell::from_name(spell.trim()) {
                        Some(resolved) => Ok((key, resolved)),
                        None => Err(ConfigError::UnknownSpell {
                            player,
                            key,
                            spell,
                        }),
                    })
                    .collect::<Result<_, _>>()?,
                None => defaults
                    .keys
                    .iter()
                    .filter(|(_, (owner, _))| *owner == player)
                    .map(|(key, (_, spell))| (key.clone(), *spell))
                    .collect(),
            };

            for (key, spell) in entries {
                if keys.contains_key(&key) {
                    return Err(ConfigError::SharedKey { key });
                }
                let _ = keys.insert(key, (player, spell));
            }
        }

        Ok(Self { keys })
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::prototype()
    }
}

/// Fully resolved adapter settings.
#[derive(Clone, Debug, Default)]
pub(crate) struct Settings {
    /// Rules handed to the duel session.
    pub(crate) duel: DuelConfig,
    /// Key layout used to translate presses into casts.
    pub(crate) bindings: KeyBindings,
}

impl Settings {
    /// Loads settings from `path`, falling back to defaults when absent.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to load config file {}", path.display()))
    }

    /// Parses settings from TOML contents.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        let file: ConfigFile =
            toml::from_str(contents).context("failed to parse config toml contents")?;
        let duel = file.duel.resolve()?;
        let bindings =
            KeyBindings::with_overrides(file.bindings.player_one, file.bindings.player_two)?;
        Ok(Self { duel, bindings })
    }
}

impl DuelSection {
    fn resolve(self) -> Result<DuelConfig, ConfigError> {
        let mut config = DuelConfig::default();

        if let Some(hp) = self.starting_hp {
            if hp <= 0 {
                return Err(ConfigError::InvalidSetting {
                    field: "starting_hp",
                    value: hp.to_string(),
                });
            }
            config.starting_hp = hp;
        }
        if let Some(mana) = self.starting_mana {
            config.starting_mana = mana;
        }
        if let Some(seconds) = self.mana_regen_interval_secs {
            config.mana_regen_interval = Duration::try_from_secs_f32(seconds).map_err(|_| {
                ConfigError::InvalidSetting {
                    field: "mana_regen_interval_secs",
                    value: seconds.to_string(),
                }
            })?;
        }
        if let Some(amount) = self.mana_regen_amount {
            config.mana_regen_amount = amount;
        }
        if let Some(tolerance) = self.collision_tolerance {
            if !(0.0..=1.0).contains(&tolerance) {
                return Err(ConfigError::InvalidSetting {
                    field: "collision_tolerance",
                    value: tolerance.to_string(),
                });
            }
            config.collision_tolerance = tolerance;
        }

        Ok(config)
    }
}
