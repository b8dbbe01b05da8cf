use std::sync::{Arc, Condvar, Mutex, MutexGuard};

use num_traits::Float;

use crate::error::{Error, Result};

/// Per-step best-candidate record exchanged between workers.
///
/// The three fields are laid out contiguously (`object`, `medoid`,
/// `distance`) so a fabric backend can register the record as a custom
/// reduction datatype. The record is ephemeral: it only lives for the
/// duration of one step.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BestCandidate<F> {
    pub object: u32,
    pub medoid: u32,
    pub distance: F,
}

impl<F> BestCandidate<F>
where
    F: Float,
{
    pub fn new(object: u32, medoid: u32, distance: F) -> Self {
        Self {
            object,
            medoid,
            distance,
        }
    }

    /// Combine rule of the argmin reduction: the operand with strictly
    /// smaller distance wins, ties keep `self`.
    pub fn min(self, other: Self) -> Self {
        if other.distance < self.distance {
            other
        } else {
            self
        }
    }
}

/// Collective operations the clustering driver needs from a message
/// fabric.
///
/// The driver never exchanges point-to-point messages; agreement between
/// participants rests entirely on [`Fabric::allreduce_min`] returning a
/// bit-identical result on every rank. A participant failure is not
/// recoverable and surfaces as [`Error::Fabric`].
pub trait Fabric<F>
where
    F: Float,
{
    /// Rank of this process in `[0, world_size)`.
    fn rank(&self) -> usize;

    /// Total number of participating processes.
    fn world_size(&self) -> usize;

    /// Argmin-reduce one candidate per rank; every rank receives the same
    /// combined record.
    fn allreduce_min(&self, local: BestCandidate<F>) -> Result<BestCandidate<F>>;

    /// Block until every rank has arrived.
    fn barrier(&self) -> Result<()>;
}

/// Degenerate fabric for a world of one process.
#[derive(Debug, Default, Clone)]
pub struct SingleProcess;

impl<F> Fabric<F> for SingleProcess
where
    F: Float,
{
    fn rank(&self) -> usize {
        0
    }

    fn world_size(&self) -> usize {
        1
    }

    fn allreduce_min(&self, local: BestCandidate<F>) -> Result<BestCandidate<F>> {
        Ok(local)
    }

    fn barrier(&self) -> Result<()> {
        Ok(())
    }
}

/// In-process fabric: every rank runs on its own thread against a shared
/// reduction board.
///
/// Contributions are folded in rank order, so the reduction is
/// deterministic regardless of arrival order. Collectives are generation
/// counted, which makes them reusable across consecutive steps without a
/// reset in between.
pub struct LocalCluster<F> {
    shared: Arc<Shared<F>>,
    rank: usize,
}

struct Shared<F> {
    world_size: usize,
    board: Mutex<Board<F>>,
    condvar: Condvar,
}

struct Board<F> {
    slots: Vec<Option<BestCandidate<F>>>,
    arrived: usize,
    reduce_generation: u64,
    result: Option<BestCandidate<F>>,
    waiting: usize,
    barrier_generation: u64,
}

impl<F> LocalCluster<F>
where
    F: Float,
{
    /// One fabric handle per rank, all attached to the same world.
    pub fn world(world_size: usize) -> Vec<Self> {
        assert!(world_size > 0);
        let shared = Arc::new(Shared {
            world_size,
            board: Mutex::new(Board {
                slots: vec![None; world_size],
                arrived: 0,
                reduce_generation: 0,
                result: None,
                waiting: 0,
                barrier_generation: 0,
            }),
            condvar: Condvar::new(),
        });
        (0..world_size)
            .map(|rank| Self {
                shared: Arc::clone(&shared),
                rank,
            })
            .collect()
    }

    fn lock(&self, op: &'static str) -> Result<MutexGuard<'_, Board<F>>> {
        self.shared.board.lock().map_err(|e| Error::Fabric {
            op,
            message: e.to_string(),
        })
    }
}

impl<F> Fabric<F> for LocalCluster<F>
where
    F: Float,
{
    fn rank(&self) -> usize {
        self.rank
    }

    fn world_size(&self) -> usize {
        self.shared.world_size
    }

    fn allreduce_min(&self, local: BestCandidate<F>) -> Result<BestCandidate<F>> {
        const OP: &str = "allreduce_min";
        let mut board = self.lock(OP)?;
        let generation = board.reduce_generation;
        board.slots[self.rank] = Some(local);
        board.arrived += 1;
        if board.arrived == self.shared.world_size {
            // last to arrive folds in rank order and publishes
            let mut combined = board.slots[0].take().expect("slot 0 filled");
            for slot in board.slots[1..].iter_mut() {
                combined = combined.min(slot.take().expect("slot filled"));
            }
            board.result = Some(combined);
            board.arrived = 0;
            board.reduce_generation += 1;
            self.shared.condvar.notify_all();
            Ok(combined)
        } else {
            while board.reduce_generation == generation {
                board = self.shared.condvar.wait(board).map_err(|e| Error::Fabric {
                    op: OP,
                    message: e.to_string(),
                })?;
            }
            Ok(board.result.expect("reduction result published"))
        }
    }

    fn barrier(&self) -> Result<()> {
        const OP: &str = "barrier";
        let mut board = self.lock(OP)?;
        let generation = board.barrier_generation;
        board.waiting += 1;
        if board.waiting == self.shared.world_size {
            board.waiting = 0;
            board.barrier_generation += 1;
            self.shared.condvar.notify_all();
        } else {
            while board.barrier_generation == generation {
                board = self.shared.condvar.wait(board).map_err(|e| Error::Fabric {
                    op: OP,
                    message: e.to_string(),
                })?;
            }
        }
        Ok(())
    }
}
