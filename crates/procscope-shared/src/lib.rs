pub mod artifacts;

pub use artifacts::{ArtifactExt, ForestNode, ProcessForest, ProcessRecord, ProcessTable};
