//! SQL dialect policy
//!
//! Each warehouse dialect implements [`SqlDialect`]. Default methods hold the
//! shared behavior; a dialect overrides only the entries where its SQL
//! diverges, and can still call [`default_metric_sql`] explicitly for
//! everything it does not handle itself.

use quarry_core::{AdapterType, Metric, MetricKind};
use std::fmt;

/// Quoting conventions and metric translation for one SQL engine
pub trait SqlDialect: fmt::Debug + Send + Sync {
    /// Stable identifier of the dialect
    fn adapter_type(&self) -> AdapterType;

    // =========================================================================
    // Quoting
    // =========================================================================

    /// Quote character for identifiers; may be empty
    fn identifier_quote_char(&self) -> &'static str {
        "\""
    }

    /// Delimiter for string literals
    fn string_quote_char(&self) -> &'static str {
        "'"
    }

    /// Prefix that escapes a string delimiter inside a literal
    fn escaped_string_quote_char(&self) -> &'static str {
        "'"
    }

    /// Render a string literal, escaping embedded delimiters
    fn quote_string_literal(&self, value: &str) -> String {
        let quote = self.string_quote_char();
        let escaped = value.replace(quote, &format!("{}{}", self.escaped_string_quote_char(), quote));
        format!("{}{}{}", quote, escaped, quote)
    }

    // =========================================================================
    // Metrics
    // =========================================================================

    /// Translate a logical metric over `sql` into an expression
    fn metric_sql(&self, sql: &str, metric: &Metric) -> String {
        default_metric_sql(sql, metric)
    }
}

/// Metric translation shared by every dialect
pub fn default_metric_sql(sql: &str, metric: &Metric) -> String {
    match metric.kind {
        MetricKind::Percentile => format!(
            "PERCENTILE_CONT({}) WITHIN GROUP (ORDER BY {})",
            format_fraction(metric.fraction()),
            sql
        ),
        MetricKind::Median => format!("PERCENTILE_CONT(0.5) WITHIN GROUP (ORDER BY {})", sql),
        MetricKind::Average => format!("AVG({})", sql),
        MetricKind::Count => format!("COUNT({})", sql),
        MetricKind::CountDistinct => format!("COUNT(DISTINCT {})", sql),
        MetricKind::Sum => format!("SUM({})", sql),
        MetricKind::Min => format!("MIN({})", sql),
        MetricKind::Max => format!("MAX({})", sql),
        MetricKind::Number
        | MetricKind::String
        | MetricKind::Date
        | MetricKind::Timestamp
        | MetricKind::Boolean => sql.to_string(),
    }
}

/// Render a percentile fraction in its shortest decimal form (`0.9`, `0.25`)
pub fn format_fraction(fraction: f64) -> String {
    format!("{}", fraction)
}

/// Quote an identifier with backticks, doubling embedded backticks
pub fn quote_backtick(ident: &str) -> String {
    format!("`{}`", ident.replace('`', "``"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Ansi;

    impl SqlDialect for Ansi {
        fn adapter_type(&self) -> AdapterType {
            AdapterType::Starrocks
        }
    }

    #[test]
    fn test_default_quoting() {
        assert_eq!(Ansi.identifier_quote_char(), "\"");
        assert_eq!(Ansi.string_quote_char(), "'");
        assert_eq!(Ansi.quote_string_literal("it's"), "'it''s'");
        assert_eq!(Ansi.quote_string_literal(r"a\b"), r"'a\b'");
    }

    #[test]
    fn test_default_aggregates() {
        assert_eq!(default_metric_sql("amount", &Metric::new(MetricKind::Sum)), "SUM(amount)");
        assert_eq!(default_metric_sql("amount", &Metric::new(MetricKind::Average)), "AVG(amount)");
        assert_eq!(default_metric_sql("id", &Metric::new(MetricKind::Count)), "COUNT(id)");
        assert_eq!(
            default_metric_sql("user_id", &Metric::new(MetricKind::CountDistinct)),
            "COUNT(DISTINCT user_id)"
        );
        assert_eq!(default_metric_sql("x", &Metric::new(MetricKind::Min)), "MIN(x)");
        assert_eq!(default_metric_sql("x", &Metric::new(MetricKind::Max)), "MAX(x)");
    }

    #[test]
    fn test_default_percentiles() {
        assert_eq!(
            default_metric_sql("x", &Metric::percentile(90.0)),
            "PERCENTILE_CONT(0.9) WITHIN GROUP (ORDER BY x)"
        );
        assert_eq!(
            default_metric_sql("x", &Metric::median()),
            "PERCENTILE_CONT(0.5) WITHIN GROUP (ORDER BY x)"
        );
    }

    #[test]
    fn test_non_aggregates_pass_through() {
        for kind in [MetricKind::Number, MetricKind::String, MetricKind::Date, MetricKind::Timestamp, MetricKind::Boolean] {
            assert_eq!(default_metric_sql("SUM(a) / SUM(b)", &Metric::new(kind)), "SUM(a) / SUM(b)");
        }
    }

    #[test]
    fn test_trait_default_delegates() {
        assert_eq!(Ansi.metric_sql("x", &Metric::new(MetricKind::Sum)), "SUM(x)");
    }

    #[test]
    fn test_format_fraction() {
        assert_eq!(format_fraction(0.5), "0.5");
        assert_eq!(format_fraction(0.9), "0.9");
        assert_eq!(format_fraction(25.0 / 100.0), "0.25");
        assert_eq!(format_fraction(99.0 / 100.0), "0.99");
    }

    #[test]
    fn test_quote_backtick() {
        assert_eq!(quote_backtick("default_catalog"), "`default_catalog`");
        assert_eq!(quote_backtick("we`ird"), "`we``ird`");
    }
}
