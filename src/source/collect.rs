use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde_json::{Map, Value};
use tracing::{debug, info};

use super::filter::Filter;
use super::parse::parse_record_page;
use super::query::QueryPlan;
use super::records::Record;

#[derive(Clone, Debug, Default)]
pub struct FetchRequest {
    pub list: String,
    pub plan: QueryPlan,
    pub filter: Option<Filter>,
}

/// Supplies the full, materialised record set for one list.
pub trait RecordSource {
    fn fetch(&self, request: &FetchRequest) -> Result<Vec<Record>>;
}

/// Reads a list from JSON page files on disk. `FetchRequest::list` names the
/// first page; next links are followed relative to the page that holds them.
#[derive(Clone, Debug, Default)]
pub struct JsonFileSource {
    base_dir: PathBuf,
}

impl JsonFileSource {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn page_path(&self, current_dir: &Path, link: &str) -> PathBuf {
        let link = Path::new(link);
        if link.is_absolute() {
            link.to_path_buf()
        } else {
            current_dir.join(link)
        }
    }
}

impl RecordSource for JsonFileSource {
    fn fetch(&self, request: &FetchRequest) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        let mut visited = HashSet::new();
        let mut next = Some(self.page_path(&self.base_dir, &request.list));
        let mut page_count = 0usize;

        while let Some(path) = next.take() {
            // `..` segments would otherwise hide a page that links back to itself.
            let path = fs::canonicalize(&path).unwrap_or(path);
            if !visited.insert(path.clone()) {
                return Err(anyhow!(
                    "page {} was already read; next links form a cycle",
                    path.display()
                ));
            }

            let raw = fs::read_to_string(&path)
                .with_context(|| format!("failed to read record page {}", path.display()))?;
            let page = parse_record_page(&raw)
                .with_context(|| format!("failed to parse record page {}", path.display()))?;
            page_count += 1;
            debug!(page = %path.display(), records = page.records.len(), "read record page");

            records.extend(
                page.records
                    .into_iter()
                    .filter(|record| {
                        request
                            .filter
                            .as_ref()
                            .is_none_or(|filter| filter.matches(record))
                    })
                    .map(|record| project(record, &request.plan)),
            );

            let current_dir = path.parent().unwrap_or(Path::new("")).to_path_buf();
            next = page.next.map(|link| self.page_path(&current_dir, &link));
        }

        let filter = request
            .filter
            .as_ref()
            .map_or_else(|| "none".to_owned(), ToString::to_string);
        info!(
            list = %request.list,
            pages = page_count,
            records = records.len(),
            %filter,
            "fetched records"
        );
        Ok(records)
    }
}

/// Keeps only the selected fields; `Base/Field` selections keep `Field` on the
/// expanded `Base` sub-object, or the flattened `Base/Field` key.
fn project(record: Record, plan: &QueryPlan) -> Record {
    if plan.select.is_empty() {
        return record;
    }

    let mut projected = Map::new();
    for selected in &plan.select {
        if let Some(value) = record.get(selected) {
            projected.insert(selected.clone(), value.clone());
            continue;
        }

        let Some((base, field)) = selected.split_once('/') else {
            continue;
        };
        if !plan.expand.iter().any(|expanded| expanded == base) {
            continue;
        }
        let Some(value) = record
            .get(base)
            .and_then(Value::as_object)
            .and_then(|expanded| expanded.get(field))
        else {
            continue;
        };

        if let Value::Object(target) = projected
            .entry(base.to_owned())
            .or_insert_with(|| Value::Object(Map::new()))
        {
            target.insert(field.to_owned(), value.clone());
        }
    }
    projected
}
