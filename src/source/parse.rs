use anyhow::{Context, Result, anyhow};
use serde_json::Value;

use super::records::Record;

const NEXT_LINK_KEYS: [&str; 3] = ["@odata.nextLink", "odata.nextLink", "nextLink"];

/// One page of a paged record listing.
#[derive(Clone, Debug, Default, PartialEq)]
pub(super) struct RecordPage {
    pub(super) records: Vec<Record>,
    pub(super) next: Option<String>,
}

/// Accepts a bare array, a `{ "value": [...] }` page with an optional next
/// link, or the verbose `{ "d": { "results": [...], "__next": ... } }` shape.
pub(super) fn parse_record_page(raw: &str) -> Result<RecordPage> {
    let parsed: Value = serde_json::from_str(raw).context("invalid JSON in record page")?;

    if let Value::Array(items) = parsed {
        return Ok(RecordPage {
            records: collect_records(items)?,
            next: None,
        });
    }

    let object = parsed
        .as_object()
        .ok_or_else(|| anyhow!("unexpected JSON type for a record page"))?;

    if let Some(verbose) = object.get("d").and_then(Value::as_object) {
        let results = verbose
            .get("results")
            .and_then(Value::as_array)
            .ok_or_else(|| anyhow!("verbose page has no `results` array"))?;
        return Ok(RecordPage {
            records: collect_records(results.clone())?,
            next: non_empty_link(verbose.get("__next")),
        });
    }

    let values = object
        .get("value")
        .and_then(Value::as_array)
        .ok_or_else(|| anyhow!("record page has no `value` array"))?;
    let next = non_empty_link(NEXT_LINK_KEYS.iter().find_map(|key| object.get(*key)));

    Ok(RecordPage {
        records: collect_records(values.clone())?,
        next,
    })
}

/// A blank next link marks the last page.
fn non_empty_link(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|link| !link.trim().is_empty())
        .map(str::to_owned)
}

fn collect_records(items: Vec<Value>) -> Result<Vec<Record>> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(record) => Ok(record),
            _ => Err(anyhow!("record #{index} is not a JSON object")),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_array() {
        let page = parse_record_page(r#"[{ "Dept": "Eng" }, { "Dept": "Ops" }]"#).unwrap();
        assert_eq!(page.records.len(), 2);
        assert_eq!(page.next, None);
    }

    #[test]
    fn parses_value_page_with_next_link() {
        let page = parse_record_page(
            r#"{ "value": [{ "Dept": "Eng" }], "@odata.nextLink": "page-2.json" }"#,
        )
        .unwrap();
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.next.as_deref(), Some("page-2.json"));
    }

    #[test]
    fn parses_verbose_page() {
        let page = parse_record_page(
            r#"{ "d": { "results": [{ "Dept": "Eng" }], "__next": "more.json" } }"#,
        )
        .unwrap();
        assert_eq!(page.records[0]["Dept"], "Eng");
        assert_eq!(page.next.as_deref(), Some("more.json"));
    }

    #[test]
    fn blank_next_link_ends_the_listing() {
        let verbose =
            parse_record_page(r#"{ "d": { "results": [{ "Dept": "Eng" }], "__next": "" } }"#)
                .unwrap();
        assert_eq!(verbose.records.len(), 1);
        assert_eq!(verbose.next, None);

        let value = parse_record_page(r#"{ "value": [], "nextLink": " " }"#).unwrap();
        assert_eq!(value.next, None);
    }

    #[test]
    fn rejects_non_object_records_and_unknown_shapes() {
        assert!(parse_record_page(r#"[1, 2]"#).is_err());
        assert!(parse_record_page(r#"{ "items": [] }"#).is_err());
        assert!(parse_record_page("not json").is_err());
    }
}
