use std::fmt;

use serde::Deserialize;
use serde_json::Value;

use super::records::{DEFAULT_LOOKUP_FIELD, Record};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOperator {
    And,
    #[default]
    Or,
}

impl FilterOperator {
    fn keyword(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

/// Equality filter over one column: `Column eq 'a'`, or several equalities
/// joined by one operator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Filter {
    column: String,
    values: Vec<String>,
    operator: FilterOperator,
}

impl Filter {
    /// Builds a filter from a comma-separated list of literal values. Returns
    /// `None` when there is no column or no non-blank value.
    pub fn from_text(column: &str, text: &str, operator: FilterOperator) -> Option<Self> {
        let column = column.trim();
        if column.is_empty() {
            return None;
        }

        let values = text
            .split(',')
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_owned)
            .collect::<Vec<_>>();
        if values.is_empty() {
            return None;
        }

        Some(Self {
            column: column.to_owned(),
            values,
            operator,
        })
    }

    pub fn matches(&self, record: &Record) -> bool {
        let Some(actual) = record.get(&self.column).and_then(comparable_text) else {
            return false;
        };

        match self.operator {
            FilterOperator::Or => self.values.iter().any(|value| *value == actual),
            FilterOperator::And => self.values.iter().all(|value| *value == actual),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let condition = |value: &str| format!("{} eq '{}'", self.column, value.replace('\'', "''"));

        if let [value] = self.values.as_slice() {
            return f.write_str(&condition(value));
        }

        let joined = self
            .values
            .iter()
            .map(|value| condition(value))
            .collect::<Vec<_>>()
            .join(&format!(" {} ", self.operator.keyword()));
        write!(f, "({joined})")
    }
}

fn comparable_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Object(expanded) => expanded.get(DEFAULT_LOOKUP_FIELD).and_then(comparable_text),
        Value::Null | Value::Array(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn single_value_builds_plain_equality() {
        let filter = Filter::from_text("Status", " New ", FilterOperator::Or).unwrap();
        assert_eq!(filter.to_string(), "Status eq 'New'");
    }

    #[test]
    fn several_values_are_joined_by_operator() {
        let or = Filter::from_text("Status", "New, Modified,,", FilterOperator::Or).unwrap();
        assert_eq!(or.to_string(), "(Status eq 'New' or Status eq 'Modified')");

        let and = Filter::from_text("Status", "New,Modified", FilterOperator::And).unwrap();
        assert_eq!(and.to_string(), "(Status eq 'New' and Status eq 'Modified')");
    }

    #[test]
    fn quotes_are_escaped() {
        let filter = Filter::from_text("Owner", "O'Brien", FilterOperator::Or).unwrap();
        assert_eq!(filter.to_string(), "Owner eq 'O''Brien'");
    }

    #[test]
    fn blank_inputs_produce_no_filter() {
        assert!(Filter::from_text("", "New", FilterOperator::Or).is_none());
        assert!(Filter::from_text("Status", " , ,", FilterOperator::Or).is_none());
    }

    #[test]
    fn matches_direct_and_expanded_values() {
        let filter = Filter::from_text("Status", "New,Active", FilterOperator::Or).unwrap();
        assert!(filter.matches(&record(json!({ "Status": "Active" }))));
        assert!(filter.matches(&record(json!({ "Status": { "Title": "New" } }))));
        assert!(!filter.matches(&record(json!({ "Status": "Closed" }))));
        assert!(!filter.matches(&record(json!({}))));

        let and = Filter::from_text("Status", "New,Active", FilterOperator::And).unwrap();
        assert!(!and.matches(&record(json!({ "Status": "New" }))));
    }
}
