pub mod csr;
pub mod engine;
pub mod graph_builder;
pub mod reconstructor;
pub mod snapshot;
pub mod solver;
pub mod traits;

pub use csr::GraphCSR;
pub use engine::{ArbitrageEngine, EngineConfig, Opportunity};
pub use graph_builder::{AssetGraph, GraphBuilder};
pub use reconstructor::CycleReconstructor;
pub use snapshot::PriceSnapshot;
pub use solver::{BellmanFordSolver, Detection, SourceStrategy};
pub use traits::CycleDetector;
