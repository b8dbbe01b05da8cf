//! Parallelized Partitioning Around Medoids (PAM) clustering.
//!
//! Objects are clustered around k of their own members by minimizing the
//! total object-to-medoid dissimilarity over a precomputed N x N matrix.
//! The search is sharded over worker threads and, through the [`Fabric`]
//! trait, over multiple processes that agree on every step with a single
//! argmin reduction.

pub use driver::{PamClustering, PamFit, MAX_SWAP_ITERATIONS};
pub use error::{Error, Result};
pub use matrix::{Dissimilarity, DissimilarityMatrix, Euclidean, Point2};
pub use reduce::{BestCandidate, Fabric, LocalCluster, SingleProcess};
pub use shard::Shard;
pub use state::{PamState, Phase};

mod driver;
mod error;
mod matrix;
mod reduce;
mod shard;
mod state;
