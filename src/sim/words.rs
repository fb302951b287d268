//! Word sources
//!
//! Words are shared `Arc<str>`s: a pick, a landing and a resolve only bump a
//! reference count, so the per-frame path never allocates.

use std::sync::Arc;

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::consts::FALLBACK_WORD;

/// Supplies the word for the next spawn
pub trait WordSource {
    /// Pick a word for `level_index`, or `None` if the source is empty
    fn pick_random_word(&self, level_index: u32, rng: &mut dyn RngCore) -> Option<Arc<str>>;
}

/// Flat list, uniform pick regardless of level
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WordList {
    words: Vec<Arc<str>>,
}

impl WordList {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Arc<str>>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
        }
    }

    /// Everyday words that fall normally
    pub fn standard() -> Self {
        Self::new([
            "ZONK", "FLURP", "SPLAT", "MUNCH", "GORK", "BEEP", "BOOP", "ZAP", "CRONCH", "SLURP",
            "GLOOP", "SQUISH", "ZIG", "ZAG", "POW", "WHAM", "ZOOM", "YIKES", "OOF", "YEET",
            "YOINK", "BONK", "DOINK", "SPLASH", "CRASH", "SMASH", "DASH", "ROCKET", "CROWN",
            "SUSHI", "FOX", "CRYSTAL", "FIRE",
        ])
    }

    /// Corrupted words carried by glitched projectiles
    pub fn glitch() -> Self {
        Self::new([
            "PUFF",
            "ZZT",
            "K-CHING",
            "X_X",
            "$@#%",
            "404",
            "ERR_CONNECTION",
            "SIGKILL",
            "SEGFAULT",
        ])
    }

    pub fn words(&self) -> &[Arc<str>] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl WordSource for WordList {
    fn pick_random_word(&self, _level_index: u32, rng: &mut dyn RngCore) -> Option<Arc<str>> {
        if self.words.is_empty() {
            return None;
        }
        let i = rng.random_range(0..self.words.len());
        Some(Arc::clone(&self.words[i]))
    }
}

/// Words for an inclusive range of levels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordStage {
    pub first_level: u32,
    pub last_level: u32,
    pub words: Vec<Arc<str>>,
}

impl WordStage {
    pub fn contains(&self, level_index: u32) -> bool {
        (self.first_level..=self.last_level).contains(&level_index)
    }
}

/// Level-staged curriculum
///
/// Levels outside every stage draw from all words combined. A curriculum
/// with no words at all yields [`FALLBACK_WORD`].
#[derive(Debug, Clone, PartialEq)]
pub struct StagedWordList {
    stages: Vec<WordStage>,
    /// Every stage's words, for levels no stage covers
    all_words: Vec<Arc<str>>,
    fallback: Arc<str>,
}

impl Default for StagedWordList {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl StagedWordList {
    pub fn new(stages: Vec<WordStage>) -> Self {
        let all_words = stages.iter().flat_map(|s| s.words.iter().cloned()).collect();
        Self {
            stages,
            all_words,
            fallback: Arc::from(FALLBACK_WORD),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, crate::error::ConfigError> {
        let stages: Vec<WordStage> = serde_json::from_str(json)?;
        Ok(Self::new(stages))
    }

    pub fn stage_for(&self, level_index: u32) -> Option<&WordStage> {
        self.stages.iter().find(|s| s.contains(level_index))
    }
}

impl WordSource for StagedWordList {
    fn pick_random_word(&self, level_index: u32, rng: &mut dyn RngCore) -> Option<Arc<str>> {
        let pool = match self.stage_for(level_index) {
            Some(stage) if !stage.words.is_empty() => &stage.words,
            _ => &self.all_words,
        };
        if pool.is_empty() {
            return Some(Arc::clone(&self.fallback));
        }
        let i = rng.random_range(0..pool.len());
        Some(Arc::clone(&pool[i]))
    }
}
