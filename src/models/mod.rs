//! Core data models for goal minutes and minute-range histograms.

mod histogram;
mod minute;

pub use histogram::{compute_minute_histogram, HistogramResult, RangeLabel};
pub use minute::{
    is_missing, parse_minute, parse_minute_str, EffectiveMinute, RawMinuteField,
    MISSING_SENTINELS,
};
