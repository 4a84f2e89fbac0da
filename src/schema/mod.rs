pub mod registry;
pub mod resolve;
pub mod types;

pub use registry::SchemaRegistry;
pub use resolve::{resolve, ResolvedColumn, ResolvedColumnMap, CITY_ROLE, STATE_ROLE};
pub use types::{SchemaEntry, SchemaSpec};
