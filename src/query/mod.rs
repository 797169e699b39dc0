//! Filter queries: a small textual grammar compiled into predicates that
//! select the types and members taking part in a comparison.

mod aggregator;
mod event_query;
mod field_query;
mod method_query;
mod modifiers;
mod type_query;

pub use aggregator::{FilterQuery, QueryAggregator};
pub use event_query::EventQuery;
pub use field_query::FieldQuery;
pub use method_query::{MethodQuery, ParameterFilter};
pub use modifiers::VisibilityFilter;
pub use type_query::{TypeQuery, TypeQueryMode};
