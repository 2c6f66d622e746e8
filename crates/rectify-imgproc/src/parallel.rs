use rayon::prelude::*;
use thiserror::Error;

/// Errors that can occur during parallel execution.
#[derive(Error, Debug, PartialEq)]
pub enum ParallelError {
    /// The thread pool failed to build.
    #[error("failed to build thread pool: {0}")]
    BuildError(String),

    /// The requested thread count is invalid.
    #[error("thread count must be > 0, got {0}")]
    InvalidThreadCount(usize),

    /// The row length must be non-zero.
    #[error("row length must be > 0")]
    InvalidRowLength,
}

/// Controls how parallel operations are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionStrategy {
    /// Use the global Rayon thread pool to process rows in parallel.
    #[default]
    Parallel,

    /// Run sequentially on the current thread.
    ///
    /// Useful for small images, debugging, or when the overhead of parallelization
    /// outweighs the benefits.
    Serial,

    /// Run on a local thread pool with `n` threads.
    ///
    /// # Warning
    /// Creates a new thread pool on every call, which has significant overhead.
    Fixed(usize),
}

impl ExecutionStrategy {
    /// Run `op` under this strategy's thread pool.
    ///
    /// `Serial` and `Parallel` run `op` on the calling thread (parallel iterators inside it
    /// use the global pool); `Fixed(n)` installs a dedicated pool with `n` threads.
    pub fn install<R: Send>(self, op: impl FnOnce() -> R + Send) -> Result<R, ParallelError> {
        match self {
            ExecutionStrategy::Serial | ExecutionStrategy::Parallel => Ok(op()),
            ExecutionStrategy::Fixed(0) => Err(ParallelError::InvalidThreadCount(0)),
            ExecutionStrategy::Fixed(n) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| ParallelError::BuildError(e.to_string()))?;
                Ok(pool.install(op))
            }
        }
    }

    fn is_serial(self) -> bool {
        matches!(self, ExecutionStrategy::Serial)
    }
}

/// Apply a function to each row of a flat buffer and sum the returned counts.
///
/// `first_row` is the index of the first row in `data`, passed through to `f` so callers
/// can work with absolute row coordinates.
///
/// # Arguments
///
/// * `data` - The row-major buffer; its length must be a multiple of `row_len`.
/// * `row_len` - Number of elements per row (width * channels).
/// * `first_row` - Absolute index of the first row of `data`.
/// * `strategy` - The execution strategy.
/// * `f` - The operation applied to `(row_index, row)`.
pub fn par_iter_rows_mut<T: Send>(
    data: &mut [T],
    row_len: usize,
    first_row: usize,
    strategy: ExecutionStrategy,
    f: impl Fn(usize, &mut [T]) -> usize + Send + Sync,
) -> Result<usize, ParallelError> {
    if row_len == 0 {
        return Err(ParallelError::InvalidRowLength);
    }

    if strategy.is_serial() {
        return Ok(data
            .chunks_exact_mut(row_len)
            .enumerate()
            .map(|(i, row)| f(first_row + i, row))
            .sum());
    }

    strategy.install(|| {
        data.par_chunks_exact_mut(row_len)
            .enumerate()
            .map(|(i, row)| f(first_row + i, row))
            .sum()
    })
}

/// Map every item of a slice, keeping the input order in the output.
pub fn par_map_ordered<T: Sync, R: Send>(
    items: &[T],
    strategy: ExecutionStrategy,
    f: impl Fn(&T) -> R + Send + Sync,
) -> Result<Vec<R>, ParallelError> {
    if strategy.is_serial() {
        return Ok(items.iter().map(f).collect());
    }

    strategy.install(|| items.par_iter().map(f).collect())
}
