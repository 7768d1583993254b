// src/extractors/fallback.rs
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Categories a tutorial can be filed under. Reports never state one.
pub const TUTORIAL_CATEGORIES: [&str; 3] = ["方法论", "教程", "资讯"];

/// Supplies values for fields the report leaves out.
///
/// Extraction stays a pure mapping from text to document as long as the
/// source is deterministic for a given construction.
pub trait Fallbacks {
    /// Message count for a discussion with no `消息数量` line.
    fn message_count(&mut self) -> u32;

    /// Category assigned to each tutorial.
    fn category(&mut self) -> String;
}

/// Constant fallbacks. The default count `0` always maps to `热议`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedFallbacks {
    pub message_count: u32,
    pub category: String,
}

impl Default for FixedFallbacks {
    fn default() -> Self {
        Self {
            message_count: 0,
            category: TUTORIAL_CATEGORIES[2].to_string(),
        }
    }
}

impl Fallbacks for FixedFallbacks {
    fn message_count(&mut self) -> u32 {
        self.message_count
    }

    fn category(&mut self) -> String {
        self.category.clone()
    }
}

/// Randomized fallbacks in the ranges the card UI was designed around
/// (counts in `[20, 70)`, one of [`TUTORIAL_CATEGORIES`]), reproducible from a seed.
#[derive(Debug, Clone)]
pub struct SeededFallbacks {
    rng: StdRng,
}

impl SeededFallbacks {
    pub fn new(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }
}

impl Fallbacks for SeededFallbacks {
    fn message_count(&mut self) -> u32 {
        self.rng.gen_range(20..70)
    }

    fn category(&mut self) -> String {
        TUTORIAL_CATEGORIES
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(TUTORIAL_CATEGORIES[0])
            .to_string()
    }
}
