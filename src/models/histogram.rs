//! Fixed-range histogram of goal minutes.

use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::minute::{parse_minute, EffectiveMinute, RawMinuteField};

/// Analytical minute range used for reporting.
///
/// Ranges are closed on the right: `15` falls in `0-15`, `16` in `16-30`.
/// The lowest range also includes minute `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RangeLabel {
    UpTo15,
    UpTo30,
    UpTo45,
    UpTo60,
    UpTo75,
    Late,
}

impl RangeLabel {
    /// All labels in reporting order.
    pub const ALL: [RangeLabel; 6] = [
        RangeLabel::UpTo15,
        RangeLabel::UpTo30,
        RangeLabel::UpTo45,
        RangeLabel::UpTo60,
        RangeLabel::UpTo75,
        RangeLabel::Late,
    ];

    /// Lowest minute accepted by any range.
    pub const MIN_MINUTE: EffectiveMinute = 0;

    /// Highest minute accepted by any range.
    pub const MAX_MINUTE: EffectiveMinute = 120;

    /// The range a minute falls into, or `None` outside `[0, 120]`.
    pub fn for_minute(minute: EffectiveMinute) -> Option<Self> {
        if !(Self::MIN_MINUTE..=Self::MAX_MINUTE).contains(&minute) {
            return None;
        }
        Self::ALL
            .into_iter()
            .find(|label| minute <= label.upper_bound())
    }

    /// Inclusive upper bound of this range.
    pub fn upper_bound(self) -> EffectiveMinute {
        match self {
            RangeLabel::UpTo15 => 15,
            RangeLabel::UpTo30 => 30,
            RangeLabel::UpTo45 => 45,
            RangeLabel::UpTo60 => 60,
            RangeLabel::UpTo75 => 75,
            RangeLabel::Late => Self::MAX_MINUTE,
        }
    }

    /// Display label used in reports.
    pub fn as_str(self) -> &'static str {
        match self {
            RangeLabel::UpTo15 => "0-15",
            RangeLabel::UpTo30 => "16-30",
            RangeLabel::UpTo45 => "31-45",
            RangeLabel::UpTo60 => "46-60",
            RangeLabel::UpTo75 => "61-75",
            RangeLabel::Late => "76+",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for RangeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Goal counts per [`RangeLabel`], always covering all six ranges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistogramResult {
    counts: [u64; 6],
}

impl HistogramResult {
    /// An all-zero histogram.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a minute. Returns the range it landed in, or `None` if it was
    /// out of range and ignored.
    pub fn record(&mut self, minute: EffectiveMinute) -> Option<RangeLabel> {
        let label = RangeLabel::for_minute(minute)?;
        self.counts[label.index()] += 1;
        Some(label)
    }

    /// Count for a single range.
    pub fn get(&self, label: RangeLabel) -> u64 {
        self.counts[label.index()]
    }

    /// Sum of all range counts.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Iterate `(label, count)` pairs in reporting order.
    pub fn iter(&self) -> impl Iterator<Item = (RangeLabel, u64)> + '_ {
        RangeLabel::ALL
            .into_iter()
            .map(move |label| (label, self.get(label)))
    }
}

impl FromIterator<EffectiveMinute> for HistogramResult {
    fn from_iter<I: IntoIterator<Item = EffectiveMinute>>(iter: I) -> Self {
        let mut histogram = Self::new();
        for minute in iter {
            histogram.record(minute);
        }
        histogram
    }
}

impl Serialize for HistogramResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(RangeLabel::ALL.len()))?;
        for (label, count) in self.iter() {
            map.serialize_entry(label.as_str(), &count)?;
        }
        map.end()
    }
}

/// Count goals per minute range.
///
/// Unparseable and missing fields are skipped, as are minutes outside
/// `[0, 120]`. The result always lists every range.
pub fn compute_minute_histogram<'a, I>(rows: I) -> HistogramResult
where
    I: IntoIterator<Item = &'a RawMinuteField>,
{
    rows.into_iter().filter_map(parse_minute).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_boundaries() {
        let cases = [
            (0, Some("0-15")),
            (15, Some("0-15")),
            (16, Some("16-30")),
            (30, Some("16-30")),
            (31, Some("31-45")),
            (45, Some("31-45")),
            (46, Some("46-60")),
            (60, Some("46-60")),
            (61, Some("61-75")),
            (75, Some("61-75")),
            (76, Some("76+")),
            (120, Some("76+")),
            (121, None),
            (-1, None),
        ];

        for (minute, expected) in cases {
            assert_eq!(
                RangeLabel::for_minute(minute).map(RangeLabel::as_str),
                expected,
                "minute {}",
                minute
            );
        }
    }

    #[test]
    fn test_empty_input_lists_every_range() {
        let rows: Vec<RawMinuteField> = Vec::new();
        let histogram = compute_minute_histogram(&rows);
        let labels: Vec<&str> = histogram.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, ["0-15", "16-30", "31-45", "46-60", "61-75", "76+"]);
        assert_eq!(histogram.total(), 0);
    }

    #[test]
    fn test_mixed_input() {
        let rows: Vec<RawMinuteField> = vec![
            "10".into(),
            "15".into(),
            "16".into(),
            "45+2".into(),
            "90+1".into(),
            "bad".into(),
            RawMinuteField::Missing,
            "200".into(),
        ];

        let histogram = compute_minute_histogram(&rows);

        assert_eq!(histogram.get(RangeLabel::UpTo15), 2);
        assert_eq!(histogram.get(RangeLabel::UpTo30), 1);
        assert_eq!(histogram.get(RangeLabel::UpTo45), 0);
        assert_eq!(histogram.get(RangeLabel::UpTo60), 1);
        assert_eq!(histogram.get(RangeLabel::UpTo75), 0);
        assert_eq!(histogram.get(RangeLabel::Late), 1);
        assert_eq!(histogram.total(), 5);
    }

    #[test]
    fn test_record_reports_range() {
        let mut histogram = HistogramResult::new();
        assert_eq!(histogram.record(61), Some(RangeLabel::UpTo75));
        assert_eq!(histogram.record(500), None);
        assert_eq!(histogram.total(), 1);
    }

    #[test]
    fn test_serializes_in_reporting_order() {
        let histogram: HistogramResult = [3, 88, 88, 50].into_iter().collect();
        let json = serde_json::to_string(&histogram).unwrap();
        assert_eq!(
            json,
            r#"{"0-15":1,"16-30":0,"31-45":0,"46-60":1,"61-75":0,"76+":2}"#
        );
    }
}
