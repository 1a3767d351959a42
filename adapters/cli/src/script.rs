//! Timed key presses that drive a headless duel.

use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;
use spell_duel_core::PlayerId;
use thiserror::Error;

use crate::config::KeyBindings;

const MIN_PRESS_GAP_MILLIS: u64 = 250;
const MAX_PRESS_GAP_MILLIS: u64 = 1_500;

/// Errors raised while decoding a press script.
#[derive(Debug, Error)]
pub(crate) enum ScriptError {
    /// The TOML document could not be decoded.
    #[error("failed to parse script toml contents")]
    Parse(#[from] toml::de::Error),
    /// A press carried a negative or non-finite timestamp.
    #[error("press #{index} has invalid timestamp {at}")]
    InvalidTimestamp { index: usize, at: f32 },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ScriptFile {
    press: Vec<PressEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PressEntry {
    at: f32,
    key: String,
}

/// Single key press at an offset from the start of the duel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct KeyPress {
    /// Offset at which the key is pressed.
    pub(crate) at: Duration,
    /// Symbol of the pressed key.
    pub(crate) key: String,
}

/// Ordered list of key presses.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Script {
    presses: Vec<KeyPress>,
}

impl Script {
    /// Reads a script from a TOML file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read script file {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to load script file {}", path.display()))
    }

    /// Parses `[[press]]` entries, ordering them by timestamp.
    pub(crate) fn parse(contents: &str) -> Result<Self, ScriptError> {
        let file: ScriptFile = toml::from_str(contents)?;
        let mut presses = file
            .press
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                let at = Duration::try_from_secs_f32(entry.at)
                    .map_err(|_| ScriptError::InvalidTimestamp { index, at: entry.at })?;
                Ok(KeyPress { at, key: entry.key })
            })
            .collect::<Result<Vec<_>, ScriptError>>()?;
        presses.sort_by_key(|press| press.at);
        Ok(Self { presses })
    }

    /// Generates presses for both duelists from a seeded generator.
    ///
    /// Each duelist presses one of their bound keys at random gaps until
    /// `duration` elapses. The same seed always yields the same script.
    pub(crate) fn random(bindings: &KeyBindings, seed: u64, duration: Duration) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut presses = Vec::new();

        for player in PlayerId::BOTH {
            let keys = bindings.keys_for(player);
            if keys.is_empty() {
                continue;
            }

            let mut at = Duration::ZERO;
            loop {
                at += Duration::from_millis(
                    rng.gen_range(MIN_PRESS_GAP_MILLIS..=MAX_PRESS_GAP_MILLIS),
                );
                if at > duration {
                    break;
                }
                let key = keys[rng.gen_range(0..keys.len())];
                presses.push(KeyPress {
                    at,
                    key: key.to_owned(),
                });
            }
        }

        presses.sort_by_key(|press| press.at);
        Self { presses }
    }

    /// Number of presses in the script.
    pub(crate) fn len(&self) -> usize {
        self.presses.len()
    }

    /// Consumes the script, yielding presses in timestamp order.
    pub(crate) fn into_presses(self) -> Vec<KeyPress> {
        self.presses
    }
}
