use num_traits::Float;

use crate::error::{Error, Result};
use crate::matrix::DissimilarityMatrix;

/// Progress of the clustering state machine. The phase never regresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Initializing,
    Building,
    Swapping,
}

/// Evolving PAM state: the medoid set plus the per-object nearest and
/// second-nearest medoid maps.
///
/// One instance exists per participating process; worker threads hold it
/// read-only while scanning and only the driver thread mutates it. Every
/// mutation is driven by the globally reduced best candidate, so the state
/// stays identical across all participants at every step boundary.
///
/// The nearest-medoid map is exact at Swapping entry and after each swap.
/// During Building it is maintained lazily (each new medoid only relaxes
/// entries it improves), which is what [`PamState::add_medoid_profit`]
/// scores are defined against.
#[derive(Debug, Clone)]
pub struct PamState<'a, F> {
    matrix: &'a DissimilarityMatrix<F>,
    n_clusters: usize,
    phase: Phase,
    medoids: Vec<usize>,
    object_medoids: Vec<usize>,
    object_second_medoids: Vec<usize>,
}

impl<'a, F> PamState<'a, F>
where
    F: Float,
{
    /// Fails on an empty matrix and on `n_clusters` outside `[2, N]`.
    pub fn new(matrix: &'a DissimilarityMatrix<F>, n_clusters: usize) -> Result<Self> {
        let n_objects = matrix.len();
        if n_objects == 0 {
            return Err(Error::EmptyInput);
        }
        if n_clusters < 2 || n_clusters > n_objects {
            return Err(Error::InvalidClusterCount {
                requested: n_clusters,
                n_objects,
            });
        }
        Ok(Self {
            matrix,
            n_clusters,
            phase: Phase::Initializing,
            medoids: Vec::with_capacity(n_clusters),
            // n_objects is an out-of-range sentinel: no object is a medoid yet
            object_medoids: vec![n_objects; n_objects],
            object_second_medoids: vec![n_objects; n_objects],
        })
    }

    pub fn matrix(&self) -> &DissimilarityMatrix<F> {
        self.matrix
    }

    pub fn n_objects(&self) -> usize {
        self.matrix.len()
    }

    pub fn n_clusters(&self) -> usize {
        self.n_clusters
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Current medoid set in insertion order.
    pub fn medoids(&self) -> &[usize] {
        &self.medoids
    }

    /// Nearest medoid of every object.
    pub fn object_medoids(&self) -> &[usize] {
        &self.object_medoids
    }

    pub fn is_medoid(&self, object: usize) -> bool {
        self.object_medoids[object] == object
    }

    fn distance_to_medoid(&self, object: usize) -> F {
        self.matrix.distance(object, self.object_medoids[object])
    }

    fn distance_to_second_medoid(&self, object: usize) -> F {
        self.matrix
            .distance(object, self.object_second_medoids[object])
    }

    /// Sum of distances from `object` to every object. Scores the central
    /// object during Initializing.
    pub fn distance_to_all(&self, object: usize) -> F {
        let mut distance = F::zero();
        for another in 0..self.n_objects() {
            distance = distance + self.matrix.distance(object, another);
        }
        distance
    }

    /// Append `medoid` to the medoid set.
    ///
    /// The first call assigns every object to the new medoid and moves to
    /// Building. Later calls relax the nearest-medoid map. The call that
    /// brings the set to the configured cluster count recomputes both maps
    /// in full and moves to Swapping.
    pub fn add_medoid(&mut self, medoid: usize) {
        assert!(
            self.phase == Phase::Initializing || self.phase == Phase::Building,
            "medoids can only be added before Swapping"
        );
        assert!(self.medoids.len() < self.n_clusters);
        assert!(medoid < self.n_objects());

        self.medoids.push(medoid);

        if self.phase == Phase::Initializing {
            // every object starts on the central object
            for object_medoid in self.object_medoids.iter_mut() {
                *object_medoid = medoid;
            }
            self.phase = Phase::Building;
        } else {
            for object in 0..self.n_objects() {
                if self.is_medoid(object) {
                    continue;
                }
                if self.matrix.distance(object, medoid) < self.distance_to_medoid(object) {
                    self.object_medoids[object] = medoid;
                }
            }
            if self.medoids.len() == self.n_clusters {
                self.phase = Phase::Swapping;
                self.find_object_medoids();
            }
        }
    }

    /// Reduction in total dissimilarity from promoting the non-medoid
    /// `object` to a medoid. Nonnegative.
    pub fn add_medoid_profit(&self, object: usize) -> F {
        assert_eq!(Phase::Building, self.phase);
        assert!(!self.is_medoid(object));

        let mut profit = F::zero();
        for another in 0..self.n_objects() {
            if another == object || self.is_medoid(another) {
                continue;
            }
            let distance = self.matrix.distance(object, another);
            if distance < self.distance_to_medoid(another) {
                profit = profit + self.distance_to_medoid(another) - distance;
            }
        }
        profit
    }

    /// Change in total dissimilarity if `medoid` were replaced by the
    /// non-medoid `object`. Negative values are improvements.
    pub fn swap_result(&self, medoid: usize, object: usize) -> F {
        assert_eq!(Phase::Swapping, self.phase);
        assert!(!self.is_medoid(object));

        let mut change = F::zero();
        for j in 0..self.n_objects() {
            if j == object || self.is_medoid(j) {
                continue;
            }
            change = change + self.swap_distance_change(medoid, j, object);
        }
        change
    }

    // Contribution of the single object j to swap_result(medoid, object).
    fn swap_distance_change(&self, medoid: usize, j: usize, object: usize) -> F {
        let distance = self.matrix.distance(j, object);
        if self.object_medoids[j] == medoid {
            if self.distance_to_second_medoid(j) > distance {
                // object becomes j's new nearest
                distance - self.distance_to_medoid(j)
            } else {
                // j falls back to its former second-nearest
                self.distance_to_second_medoid(j) - self.distance_to_medoid(j)
            }
        } else if self.distance_to_medoid(j) > distance {
            // object beats j's current nearest
            distance - self.distance_to_medoid(j)
        } else {
            F::zero()
        }
    }

    /// Replace `medoid` with `object` in place and recompute both maps.
    pub fn swap(&mut self, medoid: usize, object: usize) {
        assert_eq!(Phase::Swapping, self.phase);
        assert!(object < self.n_objects());

        let position = self
            .medoids
            .iter()
            .position(|&m| m == medoid)
            .expect("swap source must be a current medoid");
        self.medoids[position] = object;

        self.find_object_medoids();
    }

    /// Total cost: sum over all objects of the distance to their nearest
    /// medoid.
    pub fn total_cost(&self) -> F {
        debug_assert_ne!(Phase::Initializing, self.phase);
        let mut cost = F::zero();
        for object in 0..self.n_objects() {
            cost = cost + self.distance_to_medoid(object);
        }
        cost
    }

    // Full recomputation of the nearest and second-nearest maps. Strict
    // comparisons: on a tie the medoid encountered later in the set takes
    // second place.
    fn find_object_medoids(&mut self) {
        debug_assert_ne!(Phase::Initializing, self.phase);
        let n_objects = self.n_objects();
        for object in 0..n_objects {
            let mut first = n_objects;
            let mut first_distance = F::infinity();
            let mut second = n_objects;
            let mut second_distance = F::infinity();
            for &medoid in &self.medoids {
                let distance = self.matrix.distance(medoid, object);
                if distance < first_distance {
                    second = first;
                    second_distance = first_distance;
                    first = medoid;
                    first_distance = distance;
                } else if distance < second_distance {
                    second = medoid;
                    second_distance = distance;
                }
            }
            debug_assert!(first < n_objects && second < n_objects);
            self.object_medoids[object] = first;
            self.object_second_medoids[object] = second;
        }
    }
}
