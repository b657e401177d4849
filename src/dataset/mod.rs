//! Goal log dataset loading and summaries.
//!
//! The dataset is a CSV file with a header row, one goal per record. Only a
//! handful of columns are interpreted (`Minute`, `Competition`, `Season`,
//! `Type`); everything else is carried through as text for summaries and
//! LLM context.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use regex::RegexBuilder;
use serde::Serialize;
use serde_json::{Map, Number, Value};

use crate::models::{is_missing, parse_minute, RawMinuteField};

/// Column holding the minute of each goal
pub const MINUTE_COLUMN: &str = "Minute";
/// Column holding the competition name
pub const COMPETITION_COLUMN: &str = "Competition";
/// Column holding the season label
pub const SEASON_COLUMN: &str = "Season";
/// Column holding the goal type (e.g. "Left-footed shot")
pub const TYPE_COLUMN: &str = "Type";

/// Errors that can occur while loading or querying a dataset
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// The dataset file could not be opened
    #[error("Failed to open dataset {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed CSV content
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is not present in the header
    #[error("Column not found: {0}")]
    MissingColumn(String),

    /// The competition filter is not a valid regular expression
    #[error("Invalid category pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// An in-memory goal log
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// Shape of the dataset plus its first few rows
#[derive(Debug, Clone, Serialize)]
pub struct DatasetSummary {
    pub num_rows: usize,
    pub num_columns: usize,
    pub columns: Vec<String>,
    pub head: Vec<Map<String, Value>>,
}

/// Aggregate figures handed to LLMs as analysis context
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisStats {
    pub total_goals: usize,
    pub competitions: Vec<String>,
    pub seasons: Vec<String>,
    pub avg_minute: Option<f64>,
    /// Goal counts per type, most frequent first
    pub common_type: Map<String, Value>,
}

impl Dataset {
    /// Load a dataset from a CSV file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| DatasetError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let dataset = Self::from_reader(file)?;

        tracing::debug!(
            "Loaded {} rows x {} columns from {}",
            dataset.len(),
            dataset.headers.len(),
            path.display()
        );
        Ok(dataset)
    }

    /// Load a dataset from any CSV source with a header row.
    ///
    /// Short records are padded with empty (missing) cells; extra trailing
    /// cells are dropped.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let mut row: Vec<String> = record.iter().map(String::from).collect();
            row.resize(headers.len(), String::new());
            rows.push(row);
        }

        Ok(Self { headers, rows })
    }

    /// Column names in file order
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset has no records
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_index(&self, column: &str) -> Result<usize, DatasetError> {
        self.headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| DatasetError::MissingColumn(column.to_string()))
    }

    /// Non-missing cells of a column, one entry per row
    fn column_cells(&self, column: &str) -> Result<Vec<Option<&str>>, DatasetError> {
        let idx = self.column_index(column)?;
        Ok(self
            .rows
            .iter()
            .map(|row| Some(row[idx].as_str()).filter(|cell| !is_missing(cell)))
            .collect())
    }

    /// Raw minute values of the given column, one per row
    pub fn minute_fields(&self, column: &str) -> Result<Vec<RawMinuteField>, DatasetError> {
        let idx = self.column_index(column)?;
        Ok(self
            .rows
            .iter()
            .map(|row| RawMinuteField::from_cell(&row[idx]))
            .collect())
    }

    /// Keep rows whose competition matches `category`, ignoring case.
    ///
    /// `category` is a regular expression searched anywhere in the cell, so
    /// `"LaLiga|Copa"` keeps both competitions.
    pub fn filter_competition(&self, category: &str) -> Result<Self, DatasetError> {
        let idx = self.column_index(COMPETITION_COLUMN)?;
        let pattern = RegexBuilder::new(category).case_insensitive(true).build()?;

        let rows = self
            .rows
            .iter()
            .filter(|row| {
                let cell = &row[idx];
                !is_missing(cell) && pattern.is_match(cell)
            })
            .cloned()
            .collect();

        Ok(Self {
            headers: self.headers.clone(),
            rows,
        })
    }

    /// First `n` rows as JSON objects keyed by column name
    pub fn sample(&self, n: usize) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .take(n)
            .map(|row| {
                self.headers
                    .iter()
                    .zip(row)
                    .map(|(header, cell)| (header.clone(), cell_to_json(cell)))
                    .collect()
            })
            .collect()
    }

    /// Row/column counts plus the first `head_rows` rows
    pub fn summary(&self, head_rows: usize) -> DatasetSummary {
        DatasetSummary {
            num_rows: self.len(),
            num_columns: self.headers.len(),
            columns: self.headers.clone(),
            head: self.sample(head_rows),
        }
    }

    /// Aggregate figures for LLM analysis prompts
    pub fn analysis_stats(&self) -> Result<AnalysisStats, DatasetError> {
        let competitions = unique_in_order(self.column_cells(COMPETITION_COLUMN)?);
        let seasons = unique_in_order(self.column_cells(SEASON_COLUMN)?);

        let minutes: Vec<i64> = self
            .minute_fields(MINUTE_COLUMN)?
            .iter()
            .filter_map(parse_minute)
            .collect();
        let avg_minute = if minutes.is_empty() {
            None
        } else {
            Some(minutes.iter().map(|&m| m as f64).sum::<f64>() / minutes.len() as f64)
        };

        let mut type_counts: Vec<(&str, u64)> = Vec::new();
        let mut type_index: HashMap<&str, usize> = HashMap::new();
        for cell in self.column_cells(TYPE_COLUMN)?.into_iter().flatten() {
            let idx = *type_index.entry(cell).or_insert_with(|| {
                type_counts.push((cell, 0));
                type_counts.len() - 1
            });
            type_counts[idx].1 += 1;
        }
        // Stable sort keeps first-appearance order among ties
        type_counts.sort_by(|a, b| b.1.cmp(&a.1));

        Ok(AnalysisStats {
            total_goals: self.len(),
            competitions,
            seasons,
            avg_minute,
            common_type: type_counts
                .into_iter()
                .map(|(name, count)| (name.to_string(), Value::from(count)))
                .collect(),
        })
    }
}

fn unique_in_order(cells: Vec<Option<&str>>) -> Vec<String> {
    let mut seen = HashSet::new();
    cells
        .into_iter()
        .flatten()
        .filter(|cell| seen.insert(*cell))
        .map(str::to_string)
        .collect()
}

/// Convert a CSV cell into the closest JSON value
fn cell_to_json(cell: &str) -> Value {
    if is_missing(cell) {
        return Value::Null;
    }
    if let Ok(int) = cell.parse::<i64>() {
        return Value::from(int);
    }
    if let Some(number) = cell.parse::<f64>().ok().and_then(Number::from_f64) {
        return Value::Number(number);
    }
    Value::String(cell.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Season,Competition,Matchday,Date,Venue,Club,Opponent,Result,Playing_Position,Minute,At_score,Type,Goal_assist
04/05,LaLiga,34,05/01/05,H,FC Barcelona,Albacete Balompie,2:0,CF,90+1,2:0,Left-footed shot,Ronaldinho Gaucho
05/06,UEFA Champions League,5,11/02/05,H,FC Barcelona,Panathinaikos Athens,5:0,RW,34,3:0,Left-footed shot,
05/06,LaLiga,13,11/27/05,H,FC Barcelona,Racing Santander,4:1,RW,51,2:1,Header,Samuel Eto'o
05/06,Copa del Rey,1,01/11/06,A,FC Barcelona,Zaragoza,2:4,RW,,1:1,Left-footed shot,
";

    fn sample() -> Dataset {
        Dataset::from_reader(SAMPLE.as_bytes()).unwrap()
    }

    #[test]
    fn test_load_from_reader() {
        let dataset = sample();
        assert_eq!(dataset.len(), 4);
        assert_eq!(dataset.headers().len(), 13);
        assert_eq!(dataset.headers()[9], "Minute");
    }

    #[test]
    fn test_short_rows_are_padded() {
        let dataset = Dataset::from_reader("Minute,Type\n12\n".as_bytes()).unwrap();
        let sample = dataset.sample(1);
        assert_eq!(sample[0]["Minute"], Value::from(12));
        assert_eq!(sample[0]["Type"], Value::Null);
    }

    #[test]
    fn test_minute_fields() {
        let fields = sample().minute_fields(MINUTE_COLUMN).unwrap();
        assert_eq!(
            fields,
            vec![
                RawMinuteField::Text("90+1".to_string()),
                RawMinuteField::Text("34".to_string()),
                RawMinuteField::Text("51".to_string()),
                RawMinuteField::Missing,
            ]
        );
    }

    #[test]
    fn test_missing_column() {
        let result = sample().minute_fields("Minuto");
        assert!(matches!(result, Err(DatasetError::MissingColumn(c)) if c == "Minuto"));
    }

    #[test]
    fn test_filter_competition_ignores_case() {
        let dataset = sample();
        assert_eq!(dataset.filter_competition("laliga").unwrap().len(), 2);
        assert_eq!(dataset.filter_competition("Champions").unwrap().len(), 1);
        assert_eq!(dataset.filter_competition("Serie A").unwrap().len(), 0);
    }

    #[test]
    fn test_filter_competition_accepts_alternation() {
        let dataset = sample();
        let filtered = dataset.filter_competition("laliga|COPA").unwrap();
        assert_eq!(filtered.len(), 3);
        assert_eq!(
            filtered.analysis_stats().unwrap().competitions,
            vec!["LaLiga", "Copa del Rey"]
        );
        assert_eq!(dataset.filter_competition("^Copa").unwrap().len(), 1);
    }

    #[test]
    fn test_filter_competition_rejects_bad_pattern() {
        let result = sample().filter_competition("Champions (");
        assert!(matches!(result, Err(DatasetError::Pattern(_))));
    }

    #[test]
    fn test_type_counts_rank_by_frequency_then_first_seen() {
        let csv = "Season,Competition,Minute,Type\n\
                   a,X,1,Penalty\nb,Y,2,Header\na,X,3,Header\nb,Z,4,Solo run\na,Y,5,Penalty\nb,X,6,Header\n";
        let stats = Dataset::from_reader(csv.as_bytes())
            .unwrap()
            .analysis_stats()
            .unwrap();
        let types: Vec<(&str, u64)> = stats
            .common_type
            .iter()
            .map(|(name, count)| (name.as_str(), count.as_u64().unwrap()))
            .collect();
        assert_eq!(types, [("Header", 3), ("Penalty", 2), ("Solo run", 1)]);
        assert_eq!(stats.competitions, vec!["X", "Y", "Z"]);
        assert_eq!(stats.seasons, vec!["a", "b"]);
    }

    #[test]
    fn test_summary() {
        let summary = sample().summary(2);
        assert_eq!(summary.num_rows, 4);
        assert_eq!(summary.num_columns, 13);
        assert_eq!(summary.head.len(), 2);
        assert_eq!(summary.head[0]["Minute"], Value::from("90+1"));
        assert_eq!(summary.head[0]["Matchday"], Value::from(34));
        assert_eq!(summary.head[1]["Goal_assist"], Value::Null);
    }

    #[test]
    fn test_analysis_stats() {
        let stats = sample().analysis_stats().unwrap();
        assert_eq!(stats.total_goals, 4);
        assert_eq!(
            stats.competitions,
            vec!["LaLiga", "UEFA Champions League", "Copa del Rey"]
        );
        assert_eq!(stats.seasons, vec!["04/05", "05/06"]);
        // (91 + 34 + 51) / 3
        let avg = stats.avg_minute.unwrap();
        assert!((avg - 176.0 / 3.0).abs() < 1e-9);

        let types: Vec<(&String, &Value)> = stats.common_type.iter().collect();
        assert_eq!(types[0], (&"Left-footed shot".to_string(), &Value::from(3)));
        assert_eq!(types[1], (&"Header".to_string(), &Value::from(1)));
    }

    #[test]
    fn test_open_missing_file() {
        let result = Dataset::from_path("/nonexistent/goals.csv");
        assert!(matches!(result, Err(DatasetError::Open { .. })));
    }
}
