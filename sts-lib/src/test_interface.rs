//! The Test Interface: the contract every statistical test is run through.
//!
//! The original five operations (`init`, `iterate`, `print`, `metrics`,
//! `destroy`) split into two halves here. `init`/`iterate` are genuinely
//! test-specific, so they stay a trait, [`StatTest`], each test implements
//! once. `print`/`metrics`/`destroy` operate identically over any test's
//! accumulated [`TestState`] - a `DynArray` of p-values plus counters - so
//! they are free functions in [`crate::reports`] and [`crate::metrics`]
//! rather than fifteen near-identical trait implementations.

use crate::bitvec::BitVec;
use crate::config::{DerivedConstants, RunConfig};
use crate::pvalue::NON_P_VALUE;
use crate::{Error, Test};
use std::sync::atomic::{AtomicU64, Ordering};

/// A lock-free slot for one `f64`, addressable by index across threads.
/// Every iteration writes to a distinct `(iteration, partition)` index, so
/// plain `Relaxed` stores/loads on the bit pattern are enough - this is
/// the reduction the design notes ask for in place of a per-append mutex.
#[derive(Debug, Default)]
struct AtomicF64Slot(AtomicU64);

impl AtomicF64Slot {
    fn new(value: f64) -> Self {
        Self(AtomicU64::new(value.to_bits()))
    }

    fn set(&self, value: f64) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }

    fn get(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }
}

/// One test's accumulated state across an entire run: every iteration's
/// statistic and p-value, plus the counters the invariants in the spec's
/// data model are stated over.
pub struct TestState {
    pub test: Test,
    pub partition_count: usize,
    /// Raw test statistic per (iteration, partition) slot, same indexing
    /// as `p_val`. What "the" statistic means is test-specific (a z-score,
    /// a chi-square, a linear complexity); it is recorded purely for
    /// human-readable reporting.
    stats: Vec<AtomicF64Slot>,
    p_val: Vec<AtomicF64Slot>,
    pub count: AtomicU64,
    pub valid: AtomicU64,
    pub valid_p_val: AtomicU64,
    pub success: AtomicU64,
    pub failure: AtomicU64,
    /// Set to `false` at `init` time if `n` is below this test's minimum.
    /// A disabled test is silently skipped by the iteration driver,
    /// metrics aggregator and report writers.
    pub enabled: bool,
}

impl TestState {
    pub fn new(test: Test, num_iterations: usize, partition_count: usize, enabled: bool) -> Self {
        let len = num_iterations * partition_count;
        TestState {
            test,
            partition_count,
            stats: (0..len).map(|_| AtomicF64Slot::new(0.0)).collect(),
            p_val: (0..len).map(|_| AtomicF64Slot::new(NON_P_VALUE)).collect(),
            count: AtomicU64::new(0),
            valid: AtomicU64::new(0),
            valid_p_val: AtomicU64::new(0),
            success: AtomicU64::new(0),
            failure: AtomicU64::new(0),
            enabled,
        }
    }

    pub fn stat_at(&self, index: usize) -> f64 {
        self.stats[index].get()
    }

    pub fn p_value_at(&self, index: usize) -> f64 {
        self.p_val[index].get()
    }

    pub fn len(&self) -> usize {
        self.p_val.len()
    }

    pub fn p_values(&self) -> Vec<f64> {
        (0..self.p_val.len()).map(|i| self.p_value_at(i)).collect()
    }

    /// Loads this test's accumulated p-values from a previously-persisted
    /// binary file (assess-only mode / distributed merge), replacing
    /// whatever is currently stored and resetting the counters from the
    /// loaded values themselves.
    pub fn load_p_values(&mut self, values: Vec<f64>, alpha: f64) {
        self.p_val = values.iter().map(|v| AtomicF64Slot::new(*v)).collect();
        self.stats = values.iter().map(|_| AtomicF64Slot::new(0.0)).collect();
        self.count.store(0, Ordering::Relaxed);
        self.valid.store(0, Ordering::Relaxed);
        self.valid_p_val.store(0, Ordering::Relaxed);
        self.success.store(0, Ordering::Relaxed);
        self.failure.store(0, Ordering::Relaxed);

        for (i, value) in values.into_iter().enumerate() {
            let iteration = i / self.partition_count.max(1);
            let partition = i % self.partition_count.max(1);
            self.record(iteration, partition, 0.0, value, alpha);
        }
    }

    /// Records the outcome of one iteration's partition `k` (`k` in
    /// `0..partition_count`). Classifies the p-value per §4.1/§7:
    /// NON_P_VALUE is an absence (no counter but `count`/`valid`
    /// incremented); a value outside `[0, 1]` is bogus, logged as a
    /// warning and always a failure; otherwise `failure` iff `p < alpha`.
    pub fn record(&self, iteration: usize, partition: usize, stat: f64, p_value: f64, alpha: f64) {
        let idx = iteration * self.partition_count + partition;
        self.stats[idx].set(stat);
        self.p_val[idx].set(p_value);

        self.count.fetch_add(1, Ordering::Relaxed);
        self.valid.fetch_add(1, Ordering::Relaxed);

        if crate::pvalue::is_non_p_value(p_value) {
            return;
        }

        if crate::internals::is_negative(p_value) || crate::internals::is_greater_than_one(p_value) {
            tracing::warn!(test = %self.test, iteration, partition, p_value, "bogus p-value outside [0, 1]");
            self.failure.fetch_add(1, Ordering::Relaxed);
            return;
        }

        self.valid_p_val.fetch_add(1, Ordering::Relaxed);

        if p_value < alpha {
            self.failure.fetch_add(1, Ordering::Relaxed);
        } else {
            self.success.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Records that this iteration could not run at all for this test
    /// (distinct from a single NON_P_VALUE partition): every partition is
    /// set to NON_P_VALUE.
    pub fn record_failed_iteration(&self, iteration: usize) {
        for partition in 0..self.partition_count {
            self.record(iteration, partition, NON_P_VALUE, NON_P_VALUE, 1.0);
        }
    }
}

/// A test's `init`/`iterate` half of the Test Interface. `print`,
/// `metrics` and `destroy` are uniform over [`TestState`] and live outside
/// this trait (see module docs).
pub trait StatTest {
    /// Per-test arguments (block length, template count, ...). `()` for
    /// tests that take none.
    type Args: Copy + Send + Sync;

    const TEST: Test;

    /// Minimum iteration bit length this test can run on with the given
    /// arguments.
    fn min_length(args: Self::Args) -> usize;

    /// Number of p-values this test emits per iteration with the given
    /// arguments. Constant for most tests; depends on template count for
    /// NonOverlappingTemplateMatching.
    fn partition_count(args: Self::Args) -> usize;

    /// Runs one iteration, returning one p-value per partition, in
    /// partition order. A test unable to compute a given partition's
    /// p-value for this iteration returns [`crate::pvalue::NON_P_VALUE`]
    /// for that slot rather than erroring - errors are reserved for
    /// conditions the spec calls fatal (overflow, NaN propagation,
    /// gamma-function failure).
    fn iterate(
        data: &BitVec,
        cfg: &RunConfig,
        derived: &DerivedConstants,
        args: Self::Args,
    ) -> Result<Vec<(f64, f64)>, Error>;

    /// `init`: whether this test can run at all given `cfg`. A `false`
    /// return means "disable with a warning", not an error.
    fn should_enable(cfg: &RunConfig, args: Self::Args) -> bool {
        cfg.iteration_bits >= Self::min_length(args)
    }
}
