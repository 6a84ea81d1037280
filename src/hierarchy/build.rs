use std::collections::{BTreeMap, HashMap};

use tracing::{debug, trace};

use crate::source::{ColumnMetadata, Record};

use super::node::{Hierarchy, TreeNode};
use super::resolve::{resolve, resolve_or_empty};

const TRACED_RECORDS: usize = 3;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub records: usize,
    pub nodes: usize,
    pub max_depth: usize,
    /// Records whose descent stopped at each level (1-based).
    pub gaps_by_level: BTreeMap<usize, usize>,
}

/// Groups flat records into a tree, one level per grouping column.
pub struct HierarchyBuilder<'a> {
    root_value: &'a str,
    grouping_columns: &'a [String],
    tooltip_fields: &'a BTreeMap<usize, Vec<String>>,
    metadata: &'a ColumnMetadata,
}

struct DraftNode {
    node: TreeNode,
    drafts: Vec<DraftNode>,
    index_by_title: HashMap<String, usize>,
}

impl DraftNode {
    fn new(node: TreeNode) -> Self {
        Self {
            node,
            drafts: Vec::new(),
            index_by_title: HashMap::new(),
        }
    }

    fn finish(self) -> TreeNode {
        let mut node = self.node;
        node.children = self.drafts.into_iter().map(DraftNode::finish).collect();
        node
    }
}

impl<'a> HierarchyBuilder<'a> {
    pub fn new(
        root_value: &'a str,
        grouping_columns: &'a [String],
        tooltip_fields: &'a BTreeMap<usize, Vec<String>>,
        metadata: &'a ColumnMetadata,
    ) -> Self {
        Self {
            root_value,
            grouping_columns,
            tooltip_fields,
            metadata,
        }
    }

    pub fn build(&self, records: &[Record]) -> (Hierarchy, BuildStats) {
        let mut stats = BuildStats {
            records: records.len(),
            ..BuildStats::default()
        };
        let mut root = DraftNode::new(TreeNode::new(self.root_value, 0));

        if self.root_value.is_empty() || self.grouping_columns.is_empty() {
            debug!("hierarchy configuration incomplete; producing a lone root");
            stats.nodes = 1;
            return (
                Hierarchy {
                    roots: vec![root.finish()],
                },
                stats,
            );
        }

        for (record_index, record) in records.iter().enumerate() {
            self.place_record(&mut root, record, record_index, &mut stats);
        }

        let root = root.finish();
        stats.nodes = root.node_count();
        stats.max_depth = root.depth();
        debug!(
            records = stats.records,
            nodes = stats.nodes,
            max_depth = stats.max_depth,
            gaps = ?stats.gaps_by_level,
            "hierarchy built"
        );

        (Hierarchy { roots: vec![root] }, stats)
    }

    fn place_record(
        &self,
        root: &mut DraftNode,
        record: &Record,
        record_index: usize,
        stats: &mut BuildStats,
    ) {
        let mut current = root;

        for (column_index, column) in self.grouping_columns.iter().enumerate() {
            let level = column_index + 1;
            let title = match resolve(record, column, self.metadata) {
                Ok(title) => title,
                Err(gap) => {
                    if record_index < TRACED_RECORDS {
                        trace!(record_index, level, %column, %gap, "stopping descent");
                    }
                    *stats.gaps_by_level.entry(level).or_default() += 1;
                    return;
                }
            };

            let index = match current.index_by_title.get(&title) {
                Some(&index) => index,
                None => {
                    let node = self.new_node(record, title.clone(), level);
                    current.drafts.push(DraftNode::new(node));
                    let index = current.drafts.len() - 1;
                    current.index_by_title.insert(title, index);
                    index
                }
            };
            current = &mut current.drafts[index];
        }
    }

    fn new_node(&self, record: &Record, title: String, level: usize) -> TreeNode {
        let mut node = TreeNode::new(title, level);
        let Some(fields) = self.tooltip_fields.get(&level) else {
            return node;
        };

        for field in fields {
            let value = resolve_or_empty(record, field, self.metadata);
            if !value.is_empty() {
                node.tooltip_data.insert(field.clone(), value);
            }
        }
        node
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    use super::*;
    use crate::source::ColumnDescriptor;

    fn records(values: Value) -> Vec<Record> {
        values
            .as_array()
            .unwrap()
            .iter()
            .map(|value| value.as_object().cloned().unwrap())
            .collect()
    }

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| (*name).to_owned()).collect()
    }

    fn build(
        items: &[Record],
        root: &str,
        grouping: &[String],
        tooltips: &BTreeMap<usize, Vec<String>>,
    ) -> Hierarchy {
        let metadata = ColumnMetadata::default();
        HierarchyBuilder::new(root, grouping, tooltips, &metadata)
            .build(items)
            .0
    }

    #[test]
    fn groups_company_departments_and_teams() {
        let items = records(json!([
            { "Dept": "Eng", "Team": "Core" },
            { "Dept": "Eng", "Team": "Infra" },
            { "Dept": "Sales", "Team": "EMEA" },
        ]));
        let grouping = columns(&["Dept", "Team"]);
        let hierarchy = build(&items, "Company", &grouping, &BTreeMap::new());

        let root = hierarchy.root().unwrap();
        assert_eq!(hierarchy.roots.len(), 1);
        assert_eq!(root.title, "Company");
        assert_eq!(root.level, 0);
        assert!(root.tooltip_data.is_empty());
        assert_eq!(root.child_titles(), vec!["Eng", "Sales"]);
        assert_eq!(root.child("Eng").unwrap().child_titles(), vec!["Core", "Infra"]);
        assert_eq!(root.child("Sales").unwrap().child_titles(), vec!["EMEA"]);
        assert_eq!(root.descend(&["Eng", "Infra"]).unwrap().level, 2);
    }

    #[test]
    fn every_fully_resolved_record_has_a_matching_path() {
        let items = records(json!([
            { "A": "x", "B": "1", "C": "p" },
            { "A": "y", "B": "1", "C": "q" },
            { "A": "x", "B": "2", "C": "p" },
            { "A": "x", "B": "1", "C": "r" },
        ]));
        let grouping = columns(&["A", "B", "C"]);
        let hierarchy = build(&items, "root", &grouping, &BTreeMap::new());
        let root = hierarchy.root().unwrap();

        for item in &items {
            let path = grouping
                .iter()
                .map(|column| item[column].as_str().unwrap())
                .collect::<Vec<_>>();
            let leaf = root.descend(&path).unwrap();
            assert_eq!(leaf.level, 3);
            assert!(leaf.children.is_empty());
        }
        assert_eq!(root.child_titles(), vec!["x", "y"]);
        assert_eq!(root.descend(&["x", "1"]).unwrap().child_titles(), vec!["p", "r"]);
    }

    #[test]
    fn empty_value_truncates_the_branch() {
        let items = records(json!([
            { "Dept": "", "Team": "Ghost" },
            { "Dept": "Eng", "Team": "" , "Squad": "Lost" },
            { "Dept": "Eng", "Team": "Core", "Squad": "Alpha" },
        ]));
        let grouping = columns(&["Dept", "Team", "Squad"]);
        let metadata = ColumnMetadata::default();
        let tooltips = BTreeMap::new();
        let (hierarchy, stats) =
            HierarchyBuilder::new("Company", &grouping, &tooltips, &metadata).build(&items);
        let root = hierarchy.root().unwrap();

        assert_eq!(root.child_titles(), vec!["Eng"]);
        assert!(root.child("").is_none());
        assert_eq!(root.child("Eng").unwrap().child_titles(), vec!["Core"]);
        assert!(root.descend(&["Eng", "Core", "Alpha"]).is_some());
        assert_eq!(stats.gaps_by_level.get(&1), Some(&1));
        assert_eq!(stats.gaps_by_level.get(&2), Some(&1));
        assert_eq!(stats.nodes, 4);
        assert_eq!(stats.max_depth, 3);
    }

    #[test]
    fn merging_is_case_sensitive_and_keeps_first_seen_order() {
        let items = records(json!([
            { "Dept": "sales" },
            { "Dept": "Eng" },
            { "Dept": "Sales" },
            { "Dept": "Eng" },
        ]));
        let grouping = columns(&["Dept"]);
        let hierarchy = build(&items, "Company", &grouping, &BTreeMap::new());

        assert_eq!(
            hierarchy.root().unwrap().child_titles(),
            vec!["sales", "Eng", "Sales"]
        );
    }

    #[test]
    fn tooltip_data_is_first_write_wins() {
        let items = records(json!([
            { "Dept": "Eng", "Manager": "Alice", "Budget": "" },
            { "Dept": "Eng", "Manager": "Bob", "Budget": "10k" },
            { "Dept": "Sales", "Manager": "Carol" },
        ]));
        let grouping = columns(&["Dept"]);
        let tooltips = BTreeMap::from([(1, columns(&["Manager", "Budget"]))]);
        let hierarchy = build(&items, "Company", &grouping, &tooltips);
        let root = hierarchy.root().unwrap();

        let eng = root.child("Eng").unwrap();
        assert_eq!(
            eng.tooltip_data,
            BTreeMap::from([("Manager".to_owned(), "Alice".to_owned())])
        );
        assert_eq!(
            root.child("Sales").unwrap().tooltip_data.get("Manager").map(String::as_str),
            Some("Carol")
        );
    }

    #[test]
    fn tooltips_resolve_reference_columns_per_level() {
        let items = records(json!([
            { "Dept": "Eng", "Team": "Core", "Lead": { "Title": "Dana" } },
        ]));
        let grouping = columns(&["Dept", "Team"]);
        let tooltips = BTreeMap::from([(2, columns(&["Lead"]))]);
        let mut metadata = ColumnMetadata::default();
        metadata.insert("Lead", ColumnDescriptor::reference(None, false));
        let (hierarchy, _) =
            HierarchyBuilder::new("Company", &grouping, &tooltips, &metadata).build(&items);
        let root = hierarchy.root().unwrap();

        assert!(root.child("Eng").unwrap().tooltip_data.is_empty());
        assert_eq!(
            root.descend(&["Eng", "Core"]).unwrap().tooltip_data.get("Lead").map(String::as_str),
            Some("Dana")
        );
    }

    #[test]
    fn incomplete_configuration_yields_lone_root() {
        let items = records(json!([{ "Dept": "Eng" }]));
        let no_columns = Vec::new();
        let lone = build(&items, "Company", &no_columns, &BTreeMap::new());
        assert_eq!(lone.node_count(), 1);
        assert!(lone.root().unwrap().children.is_empty());

        let grouping = columns(&["Dept"]);
        let unnamed = build(&items, "", &grouping, &BTreeMap::new());
        assert_eq!(unnamed.node_count(), 1);
    }

    #[test]
    fn building_twice_is_identical() {
        let items = records(json!([
            { "Dept": "Eng", "Team": "Core", "Manager": "Alice" },
            { "Dept": "Ops", "Manager": "Eve" },
            { "Dept": "Eng", "Team": "Infra", "Manager": "Bob" },
        ]));
        let grouping = columns(&["Dept", "Team"]);
        let tooltips = BTreeMap::from([(1, columns(&["Manager"])), (2, columns(&["Manager"]))]);

        let first = build(&items, "Company", &grouping, &tooltips);
        let second = build(&items, "Company", &grouping, &tooltips);
        assert_eq!(first, second);
    }
}
