use crate::source::ColumnMetadata;
use crate::tree::RenderNode;

/// `"{display name}: {value}"` for each configured field the node carries, in
/// configured order. Fields without a value are left out.
pub(super) fn tooltip_lines(
    node: &RenderNode,
    fields: &[String],
    metadata: &ColumnMetadata,
) -> Vec<String> {
    fields
        .iter()
        .filter_map(|field| {
            let value = node.tooltip_data.get(field)?;
            (!value.is_empty()).then(|| format!("{}: {value}", metadata.display_name(field)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::hierarchy::TreeNode;
    use crate::source::ColumnDescriptor;
    use crate::tree::RenderState;

    #[test]
    fn lists_present_fields_with_display_names() {
        let root = TreeNode {
            tooltip_data: BTreeMap::from([
                ("Manager".to_owned(), "Alice".to_owned()),
                ("Site".to_owned(), "Oslo".to_owned()),
            ]),
            ..TreeNode::new("Eng", 1)
        };
        let state = RenderState::from_tree(&root);
        let metadata = ColumnMetadata::from_iter([(
            "Manager".to_owned(),
            ColumnDescriptor::reference(None, false).with_display_name("Line manager"),
        )]);
        let fields = ["Budget", "Site", "Manager"].map(str::to_owned);

        assert_eq!(
            tooltip_lines(state.node(RenderState::ROOT), &fields, &metadata),
            vec!["Site: Oslo", "Line manager: Alice"]
        );
    }

    #[test]
    fn no_fields_means_title_only() {
        let state = RenderState::from_tree(&TreeNode::new("Company", 0));
        let lines = tooltip_lines(state.node(RenderState::ROOT), &[], &ColumnMetadata::default());
        assert!(lines.is_empty());
    }
}
