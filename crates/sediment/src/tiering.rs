//! Tier classification, heat decay rules, and reorganization triggers.

use serde::{Deserialize, Serialize};

use crate::config::{Config, ReorgStrategy};

/// Heat added to an entry or chunk on every read.
pub const HEAT_READ_STEP: f64 = 0.1;
/// Heat added per chunk touched by an external index walk.
pub const HEAT_INDEX_STEP: f64 = 0.05;
/// Heat assigned to newly inserted entries and chunks.
pub const INITIAL_HEAT: f64 = 0.1;

/// Compression tier. T0 is the hottest (no compression expected), T4 the
/// coldest. The discriminants are the stable on-disk byte tags.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[repr(u8)]
pub enum Tier {
    /// Hottest: no compression expected.
    T0 = 0,
    /// Warm: light compression.
    T1 = 1,
    /// Medium.
    T2 = 2,
    /// Cool.
    T3 = 3,
    /// Coldest: heaviest compression; where new entries start.
    #[default]
    T4 = 4,
}

impl Tier {
    /// All tiers, hottest first.
    pub const ALL: [Tier; 5] = [Tier::T0, Tier::T1, Tier::T2, Tier::T3, Tier::T4];

    /// Stable on-disk byte tag.
    pub const fn as_byte(self) -> u8 {
        self as u8
    }

    /// Inverse of [`as_byte`](Self::as_byte).
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::T0),
            1 => Some(Self::T1),
            2 => Some(Self::T2),
            3 => Some(Self::T3),
            4 => Some(Self::T4),
            _ => None,
        }
    }

    /// Index into per-tier tables.
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Frequency mode: map an entry's share of all accesses to a tier.
/// With no accesses recorded yet, everything is cold.
pub fn tier_for_frequency(access_count: u64, total_accesses: u64) -> Tier {
    if total_accesses == 0 {
        return Tier::T4;
    }
    let f = access_count as f64 / total_accesses as f64;
    if f > 0.30 {
        Tier::T0
    } else if f > 0.15 {
        Tier::T1
    } else if f > 0.05 {
        Tier::T2
    } else if f > 0.01 {
        Tier::T3
    } else {
        Tier::T4
    }
}

/// Heat mode: map a decayed heat value in `[0, 1]` to a tier.
pub fn tier_for_heat(heat: f64) -> Tier {
    if heat > 0.7 {
        Tier::T0
    } else if heat > 0.4 {
        Tier::T1
    } else if heat > 0.2 {
        Tier::T2
    } else if heat > 0.1 {
        Tier::T3
    } else {
        Tier::T4
    }
}

/// Bump a heat value for one read, clamped to 1.0.
pub fn bump_heat(heat: f64, step: f64) -> f64 {
    (heat + step).min(1.0)
}

/// A decay strategy resolved against the configuration's parameters.
#[derive(Debug, Clone, Copy)]
pub enum DecayRule {
    /// No decay.
    None,
    /// `h *= factor` per pass.
    Exponential {
        /// Multiplier in `(0, 1)`.
        factor: f64,
    },
    /// `h -= amount` per pass, floored at zero.
    Linear {
        /// Subtraction per pass.
        amount: f64,
    },
    /// `h *= factor^((now - last_access) / interval)` per pass.
    TimeBased {
        /// Multiplier in `(0, 1)` per elapsed interval.
        factor: f64,
        /// Length of one decay interval.
        interval_secs: u64,
    },
}

impl DecayRule {
    /// Apply one decay pass to a heat value.
    pub fn apply(self, heat: f64, now: u64, last_access: u64) -> f64 {
        match self {
            DecayRule::None => heat,
            DecayRule::Exponential { factor } => heat * factor,
            DecayRule::Linear { amount } => (heat - amount).max(0.0),
            DecayRule::TimeBased {
                factor,
                interval_secs,
            } => {
                let elapsed = now.saturating_sub(last_access) as f64;
                let periods = elapsed / interval_secs.max(1) as f64;
                heat * factor.powf(periods)
            }
        }
    }
}

/// Decide whether a reorganization should fire now.
pub fn should_reorganize(
    config: &Config,
    ops_since_reorg: u64,
    entry_count: usize,
    last_reorg_ts: u64,
    now: u64,
) -> bool {
    match config.reorg_strategy {
        ReorgStrategy::Manual => false,
        ReorgStrategy::EveryNOps => ops_since_reorg >= config.reorg_op_threshold,
        ReorgStrategy::Periodic => now.saturating_sub(last_reorg_ts) >= config.reorg_time_threshold,
        ReorgStrategy::Adaptive => {
            let ratio = ops_since_reorg as f64 / entry_count.max(1) as f64;
            ratio >= config.reorg_change_threshold
        }
    }
}
