//! Parallel evaluation of many candidate plans against one problem.
//!
//! Each evaluation is independent and allocates its own trajectory, so plans
//! are simply fanned out across Rayon workers.

use rayon::prelude::*;
use tracing::debug;

use crate::error::Result;
use crate::optimizer::ranking::{rank_plans, RankedPlan};
use crate::parallel::pool::WorkerPool;
use crate::workforce::{evaluate, Horizon, Parameters, Plan, PlanResult};

/// Evaluates every plan; results keep the input order.
pub fn evaluate_batch(
    horizon: &Horizon,
    params: &Parameters,
    plans: &[Plan],
) -> Vec<Result<PlanResult>> {
    plans
        .par_iter()
        .map(|plan| evaluate(horizon, params, plan.as_slice()))
        .collect()
}

/// Like [evaluate_batch] but runs inside `pool`.
pub fn evaluate_batch_in(
    pool: &WorkerPool,
    horizon: &Horizon,
    params: &Parameters,
    plans: &[Plan],
) -> Vec<Result<PlanResult>> {
    pool.install(|| evaluate_batch(horizon, params, plans))
}

/// Plans per progress report when ranking.
const RANK_PROGRESS_CHUNK: usize = 1_000;

/// Evaluates and ranks plans. Fails on the first plan with the wrong shape.
pub fn rank_batch(horizon: &Horizon, params: &Parameters, plans: Vec<Plan>) -> Result<Vec<RankedPlan>> {
    let chunks = plans.len().div_ceil(RANK_PROGRESS_CHUNK);
    let results = evaluate_batch_with_progress(horizon, params, &plans, chunks, |done, total| {
        debug!(done, total, "evaluated candidate plans");
    });
    let evaluated = plans
        .into_iter()
        .zip(results)
        .map(|(plan, result)| result.map(|result| (plan, result)))
        .collect::<Result<Vec<_>>>()?;
    Ok(rank_plans(evaluated))
}

/// Split `total` items into up to `num_batches` ranges `[start, end)`.
/// Batches are as equal in size as possible; later batches may be smaller.
pub fn batch_ranges(total: usize, num_batches: usize) -> Vec<(usize, usize)> {
    if total == 0 || num_batches == 0 {
        return Vec::new();
    }
    let num_batches = num_batches.min(total);
    let base = total / num_batches;
    let remainder = total % num_batches;
    let mut ranges = Vec::with_capacity(num_batches);
    let mut start = 0;
    for i in 0..num_batches {
        let size = base + if i < remainder { 1 } else { 0 };
        let end = start + size;
        ranges.push((start, end));
        start = end;
    }
    ranges
}

/// Evaluates `plans` in `num_batches` chunks, calling `on_progress(done, total)`
/// after each chunk.
pub fn evaluate_batch_with_progress<F>(
    horizon: &Horizon,
    params: &Parameters,
    plans: &[Plan],
    num_batches: usize,
    mut on_progress: F,
) -> Vec<Result<PlanResult>>
where
    F: FnMut(usize, usize),
{
    let total = plans.len();
    let mut results = Vec::with_capacity(total);
    for (start, end) in batch_ranges(total, num_batches) {
        results.extend(evaluate_batch(horizon, params, &plans[start..end]));
        on_progress(end, total);
    }
    results
}
