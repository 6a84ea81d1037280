use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{Map, Value};

/// Marks a column as a projection of another reference column (`Base_x003a_Field`).
pub const PROJECTION_SEPARATOR: &str = "_x003a_";

/// Display field used when a reference column does not configure one.
pub const DEFAULT_LOOKUP_FIELD: &str = "Title";

pub type Record = Map<String, Value>;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ColumnKind {
    #[default]
    Direct,
    Reference {
        indexed: bool,
        lookup_field: Option<String>,
    },
    Derived {
        base: Option<String>,
        lookup_field: Option<String>,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "RawColumn")]
pub struct ColumnDescriptor {
    pub display_name: Option<String>,
    pub kind: ColumnKind,
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum RawKind {
    #[default]
    Direct,
    Reference,
    Derived,
}

#[derive(Clone, Debug, Deserialize)]
struct RawColumn {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    kind: RawKind,
    #[serde(default)]
    indexed: bool,
    #[serde(default)]
    lookup_field: Option<String>,
    #[serde(default)]
    base: Option<String>,
}

impl From<RawColumn> for ColumnDescriptor {
    fn from(raw: RawColumn) -> Self {
        let kind = match raw.kind {
            RawKind::Direct => ColumnKind::Direct,
            RawKind::Reference => ColumnKind::Reference {
                indexed: raw.indexed,
                lookup_field: raw.lookup_field,
            },
            RawKind::Derived => ColumnKind::Derived {
                base: raw.base,
                lookup_field: raw.lookup_field,
            },
        };

        Self {
            display_name: raw.display_name,
            kind,
        }
    }
}

impl ColumnDescriptor {
    #[cfg(test)]
    pub fn direct() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn reference(lookup_field: Option<&str>, indexed: bool) -> Self {
        Self {
            display_name: None,
            kind: ColumnKind::Reference {
                indexed,
                lookup_field: lookup_field.map(str::to_owned),
            },
        }
    }

    #[cfg(test)]
    pub fn derived(lookup_field: Option<&str>) -> Self {
        Self {
            display_name: None,
            kind: ColumnKind::Derived {
                base: None,
                lookup_field: lookup_field.map(str::to_owned),
            },
        }
    }

    #[cfg(test)]
    pub fn with_display_name(mut self, display_name: &str) -> Self {
        self.display_name = Some(display_name.to_owned());
        self
    }

    pub fn lookup_field(&self) -> Option<&str> {
        match &self.kind {
            ColumnKind::Direct => None,
            ColumnKind::Reference { lookup_field, .. }
            | ColumnKind::Derived { lookup_field, .. } => lookup_field.as_deref(),
        }
    }

    pub fn is_reference(&self) -> bool {
        matches!(self.kind, ColumnKind::Reference { .. })
    }
}

/// How a column name resolves once projection naming is taken into account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ColumnShape<'a> {
    Direct,
    Reference { field: &'a str, indexed: bool },
    Derived { base: &'a str, field: Option<&'a str> },
}

/// Read-only column lookup table supplied by the metadata collaborator.
#[derive(Clone, Debug, Default)]
pub struct ColumnMetadata {
    columns: HashMap<String, ColumnDescriptor>,
}

impl ColumnMetadata {
    pub fn new(columns: HashMap<String, ColumnDescriptor>) -> Self {
        Self { columns }
    }

    #[cfg(test)]
    pub fn insert(&mut self, column: impl Into<String>, descriptor: ColumnDescriptor) {
        self.columns.insert(column.into(), descriptor);
    }

    pub fn get(&self, column: &str) -> Option<&ColumnDescriptor> {
        self.columns.get(column)
    }

    pub fn display_name<'a>(&'a self, column: &'a str) -> &'a str {
        self.columns
            .get(column)
            .and_then(|descriptor| descriptor.display_name.as_deref())
            .unwrap_or(column)
    }

    /// Classifies `column`. Projection naming wins over the declared kind, and a
    /// column without metadata is read directly.
    pub fn shape<'a>(&'a self, column: &'a str) -> ColumnShape<'a> {
        let descriptor = self.columns.get(column);

        if let Some((base, _)) = column.split_once(PROJECTION_SEPARATOR) {
            let declared_base = descriptor.and_then(|descriptor| match &descriptor.kind {
                ColumnKind::Derived { base, .. } => base.as_deref(),
                _ => None,
            });
            return ColumnShape::Derived {
                base: declared_base.unwrap_or(base),
                field: descriptor.and_then(ColumnDescriptor::lookup_field),
            };
        }

        match descriptor.map(|descriptor| &descriptor.kind) {
            None | Some(ColumnKind::Direct) => ColumnShape::Direct,
            Some(ColumnKind::Reference {
                indexed,
                lookup_field,
                ..
            }) => ColumnShape::Reference {
                field: lookup_field.as_deref().unwrap_or(DEFAULT_LOOKUP_FIELD),
                indexed: *indexed,
            },
            Some(ColumnKind::Derived { base, lookup_field }) => ColumnShape::Derived {
                base: base.as_deref().unwrap_or(column),
                field: lookup_field.as_deref(),
            },
        }
    }
}

impl FromIterator<(String, ColumnDescriptor)> for ColumnMetadata {
    fn from_iter<T: IntoIterator<Item = (String, ColumnDescriptor)>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
