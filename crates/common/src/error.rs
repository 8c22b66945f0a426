use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// The requested source asset is not a node of the built graph.
    #[error("Source asset {0} is not present in the rate graph.")]
    InvalidSource(String),

    /// Indicates an attempt to access a node index that exceeds the graph size (N).
    #[error("Node index {0} is out of bounds.")]
    NodeIndexOutOfBounds(usize),

    /// The detector reported a witness but no closed, profitable loop could be
    /// traced from it. Signals a defect in the detector/reconstructor pairing.
    #[error("Internal inconsistency during cycle reconstruction: {0}")]
    InternalInconsistency(String),
}
