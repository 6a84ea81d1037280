use std::collections::HashSet;

use tracing::{debug, warn};

use super::records::{ColumnMetadata, ColumnShape, DEFAULT_LOOKUP_FIELD};

/// Fields to select and reference columns to expand so every requested column
/// can be resolved from the fetched records.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryPlan {
    pub select: Vec<String>,
    pub expand: Vec<String>,
}

impl QueryPlan {
    pub fn for_columns<'a>(
        columns: impl IntoIterator<Item = &'a str>,
        metadata: &ColumnMetadata,
    ) -> Self {
        let mut plan = Self::default();
        let mut seen_select = HashSet::new();
        let mut seen_expand = HashSet::new();

        let mut select = |plan: &mut Self, field: String| {
            if seen_select.insert(field.clone()) {
                plan.select.push(field);
            }
        };
        let mut expand = |plan: &mut Self, column: &str| {
            if seen_expand.insert(column.to_owned()) {
                plan.expand.push(column.to_owned());
            }
        };

        for column in columns {
            match metadata.shape(column) {
                ColumnShape::Direct => select(&mut plan, column.to_owned()),
                ColumnShape::Reference { field, indexed } => {
                    select(&mut plan, format!("{column}/{field}"));
                    expand(&mut plan, column);
                    if indexed {
                        select(&mut plan, format!("{column}Id"));
                    }
                }
                ColumnShape::Derived { base, field } => {
                    let Some(base_descriptor) = metadata
                        .get(base)
                        .filter(|descriptor| descriptor.is_reference())
                    else {
                        warn!(%column, %base, "projected column has no reference base; skipping");
                        continue;
                    };
                    let field = field
                        .or_else(|| base_descriptor.lookup_field())
                        .unwrap_or(DEFAULT_LOOKUP_FIELD);
                    select(&mut plan, format!("{base}/{field}"));
                    expand(&mut plan, base);
                }
            }
        }

        debug!(select = ?plan.select, expand = ?plan.expand, "query plan");
        plan
    }
}
