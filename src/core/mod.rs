pub mod artifact;
pub mod node;

pub use artifact::{Artifact, DEFAULT_SCOPE, DEFAULT_TYPE, TEST_SCOPE};
pub use node::{DependencyNode, NodeResolution};
