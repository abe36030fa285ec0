//! Logical metric definitions translated to SQL by each dialect

use serde::{Deserialize, Serialize};

/// Closed set of metric kinds understood by the SQL dialects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Percentile,
    Median,
    Average,
    Count,
    CountDistinct,
    Sum,
    Min,
    Max,

    // Non-aggregating kinds: the SQL is used as written
    Number,
    String,
    Date,
    Timestamp,
    Boolean,
}

impl MetricKind {
    /// Whether this kind wraps its SQL in an aggregate
    pub fn is_aggregate(&self) -> bool {
        !matches!(
            self,
            Self::Number | Self::String | Self::Date | Self::Timestamp | Self::Boolean
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Percentile => "percentile",
            Self::Median => "median",
            Self::Average => "average",
            Self::Count => "count",
            Self::CountDistinct => "count_distinct",
            Self::Sum => "sum",
            Self::Min => "min",
            Self::Max => "max",
            Self::Number => "number",
            Self::String => "string",
            Self::Date => "date",
            Self::Timestamp => "timestamp",
            Self::Boolean => "boolean",
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MetricKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.to_lowercase().replace('-', "_").as_str() {
            "percentile" => Self::Percentile,
            "median" => Self::Median,
            "average" | "avg" => Self::Average,
            "count" => Self::Count,
            "count_distinct" => Self::CountDistinct,
            "sum" => Self::Sum,
            "min" => Self::Min,
            "max" => Self::Max,
            "number" => Self::Number,
            "string" => Self::String,
            "date" => Self::Date,
            "timestamp" => Self::Timestamp,
            "boolean" => Self::Boolean,
            other => return Err(format!("unknown metric kind '{}'", other)),
        };
        Ok(kind)
    }
}

/// A metric to render: its kind plus the percentile parameter, if any
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    #[serde(rename = "type")]
    pub kind: MetricKind,

    /// Percentile in the 0..=100 range, only meaningful for `Percentile`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentile: Option<f64>,
}

impl Metric {
    pub fn new(kind: MetricKind) -> Self {
        Self { kind, percentile: None }
    }

    pub fn percentile(percentile: f64) -> Self {
        Self {
            kind: MetricKind::Percentile,
            percentile: Some(percentile),
        }
    }

    pub fn median() -> Self {
        Self::new(MetricKind::Median)
    }

    /// Percentile as a 0..=1 fraction, defaulting to the median
    pub fn fraction(&self) -> f64 {
        self.percentile.unwrap_or(50.0) / 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_metric_kind() {
        assert_eq!("median".parse::<MetricKind>().unwrap(), MetricKind::Median);
        assert_eq!("count-distinct".parse::<MetricKind>().unwrap(), MetricKind::CountDistinct);
        assert_eq!("AVG".parse::<MetricKind>().unwrap(), MetricKind::Average);
        assert!("mode".parse::<MetricKind>().is_err());
    }

    #[test]
    fn fraction_defaults_to_median() {
        assert_eq!(Metric::new(MetricKind::Percentile).fraction(), 0.5);
        assert_eq!(Metric::percentile(90.0).fraction(), 0.9);
    }

    #[test]
    fn aggregate_kinds() {
        assert!(MetricKind::Sum.is_aggregate());
        assert!(MetricKind::Median.is_aggregate());
        assert!(!MetricKind::Number.is_aggregate());
    }

    #[test]
    fn metric_deserializes_from_type_field() {
        let metric: Metric = serde_json::from_str(r#"{"type": "percentile", "percentile": 90}"#).unwrap();
        assert_eq!(metric, Metric::percentile(90.0));
    }
}
