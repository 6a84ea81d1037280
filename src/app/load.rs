use std::path::PathBuf;

use anyhow::Result;
use tracing::{error, info};

use crate::config::TreeConfig;
use crate::hierarchy::{BuildStats, Hierarchy, HierarchyBuilder};
use crate::source::{ColumnMetadata, FetchRequest, JsonFileSource, RecordSource};

/// Where a load reads from. Re-used verbatim by Reload.
#[derive(Clone, Debug)]
pub struct LoadRequest {
    pub config_path: PathBuf,
    pub records: Option<PathBuf>,
    pub root_value: Option<String>,
}

pub(super) struct LoadedTree {
    pub(super) config: TreeConfig,
    pub(super) metadata: ColumnMetadata,
    pub(super) hierarchy: Hierarchy,
    pub(super) stats: BuildStats,
}

pub(super) enum LoadOutcome {
    Unconfigured(String),
    Loaded(Box<LoadedTree>),
}

/// Reads the config, fetches the records and builds the hierarchy. A fetch
/// failure degrades to an empty record set; only config errors are returned.
pub(super) fn load_tree(request: &LoadRequest) -> Result<LoadOutcome> {
    let mut config = TreeConfig::load(&request.config_path)?;
    config.apply_overrides(request.records.clone(), request.root_value.clone());
    if let Some(reason) = config.missing_requirement() {
        info!(reason, "configuration incomplete; nothing to draw");
        return Ok(LoadOutcome::Unconfigured(reason.to_owned()));
    }

    let metadata = config.metadata();
    let fetch = FetchRequest {
        list: config.list.clone(),
        plan: config.query_plan(&metadata),
        filter: config.filter(),
    };
    let source = JsonFileSource::new(config.base_dir.clone());
    let records = source.fetch(&fetch).unwrap_or_else(|fetch_error| {
        let reason = format!("{fetch_error:#}");
        error!(
            list = %fetch.list,
            error = %reason,
            "failed to fetch records; drawing the root alone"
        );
        Vec::new()
    });

    let (hierarchy, stats) = HierarchyBuilder::new(
        &config.root_value,
        &config.grouping_columns,
        &config.tooltip_fields,
        &metadata,
    )
    .build(&records);

    info!(
        records = stats.records,
        nodes = stats.nodes,
        depth = stats.max_depth,
        "hierarchy built"
    );

    Ok(LoadOutcome::Loaded(Box::new(LoadedTree {
        config,
        metadata,
        hierarchy,
        stats,
    })))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn request(dir: &tempfile::TempDir, config: &str) -> LoadRequest {
        let config_path = dir.path().join("tree.json");
        fs::write(&config_path, config).unwrap();
        LoadRequest {
            config_path,
            records: None,
            root_value: None,
        }
    }

    fn loaded(outcome: LoadOutcome) -> Box<LoadedTree> {
        match outcome {
            LoadOutcome::Loaded(tree) => tree,
            LoadOutcome::Unconfigured(reason) => panic!("unexpected unconfigured: {reason}"),
        }
    }

    #[test]
    fn loads_records_relative_to_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("people.json"),
            r#"[
                { "Dept": "Eng", "Team": "Core", "Manager": { "Title": "Alice" } },
                { "Dept": "Eng", "Team": "Web" },
                { "Dept": "Sales", "Team": "" }
            ]"#,
        )
        .unwrap();
        let request = request(
            &dir,
            r#"{
                "list": "people.json",
                "root_value": "Company",
                "grouping_columns": ["Dept", "Team"],
                "tooltip_fields": { "1": ["Manager"] },
                "columns": { "Manager": { "kind": "reference" } }
            }"#,
        );

        let tree = loaded(load_tree(&request).unwrap());
        let root = tree.hierarchy.root().unwrap();
        assert_eq!(root.child_titles(), vec!["Eng", "Sales"]);
        assert_eq!(root.descend(&["Eng"]).unwrap().child_titles(), vec!["Core", "Web"]);
        assert_eq!(
            root.descend(&["Eng"]).unwrap().tooltip_data.get("Manager").map(String::as_str),
            Some("Alice")
        );
        assert!(root.descend(&["Sales"]).unwrap().children.is_empty());
        assert_eq!(tree.stats.records, 3);
    }

    #[test]
    fn fetch_failure_yields_lone_root() {
        let dir = tempfile::tempdir().unwrap();
        let request = request(
            &dir,
            r#"{ "list": "missing.json", "root_value": "Company", "grouping_columns": ["Dept"] }"#,
        );

        let tree = loaded(load_tree(&request).unwrap());
        assert_eq!(tree.hierarchy.node_count(), 1);
        assert_eq!(tree.stats.records, 0);
    }

    #[test]
    fn incomplete_configuration_is_not_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let mut request = request(&dir, r#"{ "list": "x.json", "grouping_columns": ["Dept"] }"#);

        assert!(matches!(
            load_tree(&request).unwrap(),
            LoadOutcome::Unconfigured(reason) if reason == "no root node value configured"
        ));

        request.root_value = Some("Company".to_owned());
        assert!(matches!(load_tree(&request).unwrap(), LoadOutcome::Loaded(_)));
    }

    #[test]
    fn unreadable_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let request = request(&dir, "{ not json");
        assert!(load_tree(&request).is_err());
    }
}
