//! Minute-notation parsing for goal log entries.
//!
//! Goal logs record the minute of play either as a plain number (`"23"`) or in
//! stoppage-time notation (`"90+2"`). Parsing is total: anything that cannot be
//! read as a minute yields `None` and is left out of downstream aggregates.

/// Minute within a match, including stoppage time (`"90+2"` becomes `92`).
pub type EffectiveMinute = i64;

/// Cell values treated as "no value" when reading a dataset.
pub const MISSING_SENTINELS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// A raw value from a dataset's minute column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawMinuteField {
    /// No value recorded
    Missing,
    /// A value the reader already decoded as an integer
    Integer(i64),
    /// Free text, usually `"<int>"` or `"<int>+<int>"`
    Text(String),
}

impl RawMinuteField {
    /// Build a field from a CSV cell, mapping the missing-value sentinels to
    /// [`RawMinuteField::Missing`].
    pub fn from_cell(cell: &str) -> Self {
        if is_missing(cell) {
            Self::Missing
        } else {
            Self::Text(cell.to_string())
        }
    }

    /// Whether this field carries no value.
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

impl From<&str> for RawMinuteField {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RawMinuteField {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for RawMinuteField {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl<T: Into<RawMinuteField>> From<Option<T>> for RawMinuteField {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Missing, Into::into)
    }
}

/// Whether a raw CSV cell is one of the missing-value sentinels.
pub fn is_missing(cell: &str) -> bool {
    MISSING_SENTINELS.contains(&cell)
}

/// Parse a raw minute field into its effective minute.
///
/// Never fails: missing values, garbage text, malformed stoppage notation
/// (`"1+2+3"`) and sums that overflow all yield `None`. Negative values are
/// returned as-is; range checks belong to the bucketing step.
pub fn parse_minute(field: &RawMinuteField) -> Option<EffectiveMinute> {
    match field {
        RawMinuteField::Missing => None,
        RawMinuteField::Integer(value) => Some(*value),
        RawMinuteField::Text(text) => parse_minute_str(text),
    }
}

/// Parse minute notation from text. See [`parse_minute`].
pub fn parse_minute_str(text: &str) -> Option<EffectiveMinute> {
    if !text.contains('+') {
        return text.parse::<i64>().ok();
    }

    let mut parts = text.split('+');
    let (base, extra) = match (parts.next(), parts.next(), parts.next()) {
        (Some(base), Some(extra), None) => (base, extra),
        _ => return None,
    };

    let base = base.parse::<i64>().ok()?;
    let extra = extra.parse::<i64>().ok()?;
    base.checked_add(extra)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Option<EffectiveMinute> {
        parse_minute(&RawMinuteField::from(text))
    }

    #[test]
    fn test_plain_minutes() {
        assert_eq!(parse("0"), Some(0));
        assert_eq!(parse("23"), Some(23));
        assert_eq!(parse("-4"), Some(-4));
    }

    #[test]
    fn test_stoppage_time() {
        assert_eq!(parse("90+1"), Some(91));
        assert_eq!(parse("45+2"), Some(47));
        assert_eq!(parse("90+-1"), Some(89));
    }

    #[test]
    fn test_unparseable() {
        assert_eq!(parse(""), None);
        assert_eq!(parse("abc"), None);
        assert_eq!(parse("1+2+3"), None);
        assert_eq!(parse("+5"), None);
        assert_eq!(parse("90+"), None);
        assert_eq!(parse("90+x"), None);
        assert_eq!(parse("45.5"), None);
    }

    #[test]
    fn test_whitespace_is_not_trimmed() {
        assert_eq!(parse(" 10"), None);
        assert_eq!(parse("10 "), None);
        assert_eq!(parse("90+ 1"), None);
    }

    #[test]
    fn test_overflowing_sum_is_unparseable() {
        let text = format!("{}+1", i64::MAX);
        assert_eq!(parse(&text), None);
    }

    #[test]
    fn test_missing_and_integer_fields() {
        assert_eq!(parse_minute(&RawMinuteField::Missing), None);
        assert_eq!(parse_minute(&RawMinuteField::from(None::<&str>)), None);
        assert_eq!(parse_minute(&RawMinuteField::Integer(77)), Some(77));
        assert_eq!(parse_minute(&RawMinuteField::from(Some(12_i64))), Some(12));
    }

    #[test]
    fn test_from_cell_sentinels() {
        assert!(RawMinuteField::from_cell("").is_missing());
        assert!(RawMinuteField::from_cell("NaN").is_missing());
        assert!(RawMinuteField::from_cell("N/A").is_missing());
        assert_eq!(
            RawMinuteField::from_cell("90+3"),
            RawMinuteField::Text("90+3".to_string())
        );
    }
}
