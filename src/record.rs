//! Parsing of raw input lines into observations or string categories.

/// One parsed input line.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    /// First field parsed as a number. `facets[i]` belongs to facet column `i + 1`.
    Observation { value: f64, facets: Vec<String> },
    /// First field was not numeric; only the raw field is kept.
    Category(String),
}

impl Record {
    /// Facet value at a 1-indexed column, if the record is an observation that long.
    pub fn facet(&self, column: usize) -> Option<&str> {
        match self {
            Record::Observation { facets, .. } if column >= 1 => {
                facets.get(column - 1).map(String::as_str)
            }
            _ => None,
        }
    }

    pub fn is_observation(&self) -> bool {
        matches!(self, Record::Observation { .. })
    }
}

/// Parse one line of tab-separated input.
///
/// Returns `None` for lines that are empty after trimming.
pub fn parse_line(line: &str) -> Option<Record> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let mut fields = line.split('\t');
    let first = fields.next()?;

    match first.parse::<f64>() {
        Ok(value) => Some(Record::Observation {
            value,
            facets: fields.map(str::to_string).collect(),
        }),
        Err(_) => Some(Record::Category(first.to_string())),
    }
}
