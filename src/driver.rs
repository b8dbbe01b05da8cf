use std::collections::HashMap;

use log::debug;
use num_traits::Float;
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::error::Result;
use crate::matrix::DissimilarityMatrix;
use crate::reduce::{BestCandidate, Fabric};
use crate::shard::Shard;
use crate::state::{PamState, Phase};

/// Upper bound on Swapping iterations. The loop normally stops much
/// earlier, on the first step whose best swap is not an improvement.
pub const MAX_SWAP_ITERATIONS: usize = 1000;

/// Parallelized PAM clustering driver.
///
/// Objects are sharded over `world_size * threads` workers. Each step every
/// worker scans its shard for the best local candidate, the per-thread
/// results fold in thread order, ranks agree on a global best through
/// [`Fabric::allreduce_min`], and every participant applies the identical
/// mutation. Divergence between participants is impossible as long as the
/// fabric reduction is deterministic over its inputs.
#[derive(Debug, Clone)]
pub struct PamClustering {
    n_clusters: usize,
    threads: usize,
}

impl PamClustering {
    pub fn new(n_clusters: usize, threads: usize) -> Self {
        assert!(threads > 0, "at least one worker thread is required");
        Self {
            n_clusters,
            threads,
        }
    }

    /// Run the three clustering phases to completion.
    ///
    /// Call with identical arguments on every rank of the fabric.
    pub fn fit<F, C>(&self, matrix: &DissimilarityMatrix<F>, fabric: &C) -> Result<PamFit<F>>
    where
        F: Float + Send + Sync,
        C: Fabric<F>,
    {
        let mut state = PamState::new(matrix, self.n_clusters)?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .build()
            .expect("failed to build worker pool");
        let rank = fabric.rank();

        // Initializing and Building: one medoid per step
        for step in 0..self.n_clusters {
            if rank == 0 {
                debug!("Building...{}", step);
            }
            let local = self.local_best(&pool, fabric, &state, build_scan);
            let best = fabric.allreduce_min(local)?;
            state.add_medoid(best.object as usize);
        }

        // Swapping: replace medoids while a replacement strictly improves
        let mut swap_iterations = 0;
        for iteration in 0..MAX_SWAP_ITERATIONS {
            if rank == 0 {
                debug!("Swapping...{}", iteration);
            }
            let local = self.local_best(&pool, fabric, &state, swap_scan);
            let best = fabric.allreduce_min(local)?;
            if best.distance < F::zero() {
                state.swap(best.medoid as usize, best.object as usize);
                swap_iterations = iteration + 1;
            } else {
                break;
            }
        }

        Ok(PamFit {
            medoids: state.medoids().to_vec(),
            labels: label_clusters(state.object_medoids()),
            object_medoids: state.object_medoids().to_vec(),
            total_cost: state.total_cost(),
            swap_iterations,
        })
    }

    // One evaluation step: every local worker scans its shard on the pool,
    // then the per-thread bests fold in thread-id order.
    fn local_best<F, C>(
        &self,
        pool: &rayon::ThreadPool,
        fabric: &C,
        state: &PamState<F>,
        scan: fn(&PamState<F>, Shard) -> BestCandidate<F>,
    ) -> BestCandidate<F>
    where
        F: Float + Send + Sync,
        C: Fabric<F>,
    {
        let workers = fabric.world_size() * self.threads;
        let first_worker = fabric.rank() * self.threads;
        let locals: Vec<BestCandidate<F>> = pool.install(|| {
            (0..self.threads)
                .into_par_iter()
                .map(|thread| {
                    let shard = Shard::of(first_worker + thread, workers, state.n_objects());
                    scan(state, shard)
                })
                .collect()
        });
        locals
            .into_iter()
            .reduce(BestCandidate::min)
            .expect("at least one worker thread")
    }
}

/// Result of a clustering run.
#[derive(Debug, Clone)]
pub struct PamFit<F> {
    medoids: Vec<usize>,
    object_medoids: Vec<usize>,
    labels: Vec<usize>,
    total_cost: F,
    swap_iterations: usize,
}

impl<F> PamFit<F>
where
    F: Float,
{
    /// Medoid objects in discovery order.
    pub fn medoids(&self) -> &[usize] {
        &self.medoids
    }

    /// Nearest medoid of every object.
    pub fn object_medoids(&self) -> &[usize] {
        &self.object_medoids
    }

    /// Contiguous cluster id per object, numbered by first encounter while
    /// scanning objects in order. Ids are not portable across runs that
    /// discover medoids in a different order.
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Sum over all objects of the distance to their nearest medoid.
    pub fn total_cost(&self) -> F {
        self.total_cost
    }

    /// Number of accepted swaps before the Swapping loop terminated.
    pub fn swap_iterations(&self) -> usize {
        self.swap_iterations
    }
}

// Initializing scores total distance to all objects, Building scores
// negated add-medoid profit. Both minimize, seeded with infinity.
fn build_scan<F>(state: &PamState<F>, shard: Shard) -> BestCandidate<F>
where
    F: Float,
{
    let mut best = BestCandidate::new(shard.begin as u32, 0, F::infinity());
    for object in shard.range() {
        if state.is_medoid(object) {
            continue;
        }
        let distance = match state.phase() {
            Phase::Initializing => state.distance_to_all(object),
            _ => -state.add_medoid_profit(object),
        };
        if distance < best.distance {
            best.distance = distance;
            best.object = object as u32;
        }
    }
    best
}

// Swapping scores every (medoid, non-medoid) pair. The zero seed means a
// non-improving swap can never win the reduction.
fn swap_scan<F>(state: &PamState<F>, shard: Shard) -> BestCandidate<F>
where
    F: Float,
{
    let mut best = BestCandidate::new(shard.begin as u32, state.medoids()[0] as u32, F::zero());
    for object in shard.range() {
        if state.is_medoid(object) {
            continue;
        }
        for &medoid in state.medoids() {
            let distance = state.swap_result(medoid, object);
            if distance < best.distance {
                best = BestCandidate::new(object as u32, medoid as u32, distance);
            }
        }
    }
    best
}

/// First-encounter numbering of nearest medoids into cluster ids in [0, k).
fn label_clusters(object_medoids: &[usize]) -> Vec<usize> {
    let mut cluster_ids: HashMap<usize, usize> = HashMap::new();
    object_medoids
        .iter()
        .map(|&medoid| {
            let next_id = cluster_ids.len();
            *cluster_ids.entry(medoid).or_insert(next_id)
        })
        .collect()
}
