//! Trigger counting, heat decay, tier migration, and cold eviction.
