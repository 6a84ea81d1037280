mod collect;
mod filter;
mod parse;
mod query;
mod records;

pub use collect::{FetchRequest, JsonFileSource, RecordSource};
pub use filter::{Filter, FilterOperator};
pub use query::QueryPlan;
pub use records::{ColumnDescriptor, ColumnMetadata, ColumnShape, DEFAULT_LOOKUP_FIELD, Record};
