pub mod alignment;
pub mod command;
pub mod id;
pub mod model;
pub mod serialization;
pub mod state;

pub use alignment::{AlignmentKind, DistributionAxis, align_nodes, distribute_nodes};
pub use command::{Command, NodePatch, ReorderDirection};
pub use id::NodeId;
pub use model::*;
pub use serialization::{
    LoadError, deserialize_document, deserialize_document_or_default, serialize_document,
};
pub use state::apply_command;
