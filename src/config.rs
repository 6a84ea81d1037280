use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::warn;

use crate::source::{ColumnDescriptor, ColumnMetadata, Filter, FilterOperator, QueryPlan};

pub const MAX_LEVELS: usize = 7;
pub const MAX_TOOLTIP_FIELDS: usize = 3;

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub column: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub operator: FilterOperator,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// First page of the record list, relative to the config file.
    pub list: String,
    pub root_value: String,
    pub grouping_columns: Vec<String>,
    /// Tooltip columns per level (1-based).
    pub tooltip_fields: BTreeMap<usize, Vec<String>>,
    /// CSS-style colour per level (1-based).
    pub node_colors: BTreeMap<usize, String>,
    pub filter: Option<FilterConfig>,
    pub columns: HashMap<String, ColumnDescriptor>,
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl TreeConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let mut config = Self::from_json(&raw)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        config.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(config)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw).context("invalid config JSON")?;
        Ok(config.normalized())
    }

    /// Trims blank entries and enforces the level and tooltip limits.
    fn normalized(mut self) -> Self {
        self.root_value = self.root_value.trim().to_owned();
        self.grouping_columns.retain(|column| !column.trim().is_empty());
        if self.grouping_columns.len() > MAX_LEVELS {
            warn!(
                configured = self.grouping_columns.len(),
                max = MAX_LEVELS,
                "too many grouping columns; extra levels ignored"
            );
            self.grouping_columns.truncate(MAX_LEVELS);
        }

        self.tooltip_fields.retain(|level, fields| {
            if !(1..=MAX_LEVELS).contains(level) {
                warn!(level, "tooltip fields configured for an unsupported level; ignored");
                return false;
            }
            fields.retain(|field| !field.trim().is_empty());
            if fields.len() > MAX_TOOLTIP_FIELDS {
                warn!(
                    level,
                    max = MAX_TOOLTIP_FIELDS,
                    "too many tooltip fields; extra fields ignored"
                );
                fields.truncate(MAX_TOOLTIP_FIELDS);
            }
            !fields.is_empty()
        });

        self.node_colors.retain(|level, color| {
            let keep = (1..=MAX_LEVELS).contains(level) && !color.trim().is_empty();
            if !keep {
                warn!(level, %color, "node colour ignored");
            }
            keep
        });
        self
    }

    pub fn apply_overrides(&mut self, list: Option<PathBuf>, root_value: Option<String>) {
        if let Some(list) = list {
            self.list = std::path::absolute(&list)
                .unwrap_or(list)
                .to_string_lossy()
                .into_owned();
        }
        if let Some(root_value) = root_value {
            self.root_value = root_value.trim().to_owned();
        }
    }

    /// Root value and at least one grouping column are required to draw a tree.
    pub fn missing_requirement(&self) -> Option<&'static str> {
        if self.list.trim().is_empty() {
            Some("no record list configured")
        } else if self.root_value.is_empty() {
            Some("no root node value configured")
        } else if self.grouping_columns.is_empty() {
            Some("no grouping columns configured")
        } else {
            None
        }
    }

    pub fn metadata(&self) -> ColumnMetadata {
        ColumnMetadata::new(self.columns.clone())
    }

    pub fn filter(&self) -> Option<Filter> {
        let filter = self.filter.as_ref()?;
        Filter::from_text(&filter.column, &filter.text, filter.operator)
    }

    pub fn query_plan(&self, metadata: &ColumnMetadata) -> QueryPlan {
        let columns = self
            .grouping_columns
            .iter()
            .chain(self.tooltip_fields.values().flatten())
            .map(String::as_str);
        QueryPlan::for_columns(columns, metadata)
    }

    pub fn tooltip_fields_for(&self, level: usize) -> &[String] {
        self.tooltip_fields
            .get(&level)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
