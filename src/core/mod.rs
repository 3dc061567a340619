pub mod errors;
pub mod model;
pub mod value;

pub use errors::{GraphError, Result};
pub use model::{Index, Node, NodeId, Relationship, RelationshipId};
pub use value::{Properties, Value};
