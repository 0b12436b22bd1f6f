pub mod batch;
pub mod pool;

pub use batch::{
    batch_ranges, evaluate_batch, evaluate_batch_in, evaluate_batch_with_progress, rank_batch,
};
pub use pool::WorkerPool;
