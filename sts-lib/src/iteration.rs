//! The Iteration Driver: for each iteration, extracts the bit window, then
//! dispatches all enabled tests across a bounded thread pool, writing
//! results directly into each test's pre-sized [`TestState`].

use crate::bitvec::BitVec;
use crate::config::{DerivedConstants, RunConfig};
use crate::test_interface::{StatTest, TestState};
use crate::{Error, Test};
use rayon::prelude::*;
use std::sync::LazyLock;
use sts_lib_derive::use_thread_pool;

/// The bounded thread pool every iteration runs on, sized to the number of
/// available cores. A single pool is shared across the whole process
/// rather than rebuilt per run, matching the "pool size = hardware cores"
/// resource model of §5.
static ITERATION_THREAD_POOL: LazyLock<rayon::ThreadPool> = LazyLock::new(|| {
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_cpus::get())
        .thread_name(|idx| format!("sts-iteration-{idx}"))
        .build()
        .expect("failed to build the iteration thread pool")
});

/// A type-erased [`StatTest`], so a heterogeneous collection of tests (each
/// with its own `Args` type) can be driven by one loop. Built once per test
/// via [`crate::tests::registry`].
pub trait ErasedTest: Sync + Send {
    fn test(&self) -> Test;
    fn partition_count(&self) -> usize;
    fn should_enable(&self, cfg: &RunConfig) -> bool;
    fn iterate(
        &self,
        data: &BitVec,
        cfg: &RunConfig,
        derived: &DerivedConstants,
    ) -> Result<Vec<(f64, f64)>, Error>;
}

/// Adapts any [`StatTest`] implementation, plus a fixed choice of its
/// arguments, into an [`ErasedTest`].
pub struct TestAdapter<T: StatTest> {
    pub args: T::Args,
    _marker: std::marker::PhantomData<T>,
}

impl<T: StatTest> TestAdapter<T> {
    pub fn new(args: T::Args) -> Self {
        Self {
            args,
            _marker: std::marker::PhantomData,
        }
    }
}

impl<T: StatTest + Sync + Send> ErasedTest for TestAdapter<T>
where
    T::Args: Sync + Send,
{
    fn test(&self) -> Test {
        T::TEST
    }

    fn partition_count(&self) -> usize {
        T::partition_count(self.args)
    }

    fn should_enable(&self, cfg: &RunConfig) -> bool {
        T::should_enable(cfg, self.args)
    }

    fn iterate(
        &self,
        data: &BitVec,
        cfg: &RunConfig,
        derived: &DerivedConstants,
    ) -> Result<Vec<(f64, f64)>, Error> {
        T::iterate(data, cfg, derived, self.args)
    }
}

/// Runs all iterations of `cfg` over `input`, producing one [`TestState`]
/// per registry entry whose test is both enabled in `cfg` and able to run
/// at this iteration length. Disabled tests still get a `TestState` (with
/// `enabled = false` and zero-length arrays) so callers can report on them
/// uniformly.
#[use_thread_pool(ITERATION_THREAD_POOL)]
pub fn run_iterations(
    cfg: &RunConfig,
    derived: &DerivedConstants,
    input: &BitVec,
    registry: &[Box<dyn ErasedTest>],
) -> Vec<TestState> {
    let states: Vec<TestState> = registry
        .iter()
        .map(|entry| {
            let enabled = cfg.is_enabled(entry.test()) && entry.should_enable(cfg);
            let partition_count = if enabled { entry.partition_count() } else { 1 };
            if !enabled {
                tracing::warn!(test = %entry.test(), n = cfg.iteration_bits, "test disabled: iteration length below minimum");
            }
            TestState::new(entry.test(), cfg.num_iterations, partition_count.max(1), enabled)
        })
        .collect();

    (0..cfg.num_iterations).into_par_iter().for_each(|iteration| {
        let window = input.slice_bits(iteration * cfg.iteration_bits, cfg.iteration_bits);

        for (entry, state) in registry.iter().zip(states.iter()) {
            if !state.enabled {
                continue;
            }

            match entry.iterate(&window, cfg, derived) {
                Ok(results) => {
                    for (partition, (stat, p_value)) in results.into_iter().enumerate() {
                        state.record(iteration, partition, stat, p_value, cfg.alpha);
                    }
                }
                Err(err) => {
                    tracing::warn!(test = %entry.test(), iteration, error = %err, "iteration failed, recording NON_P_VALUE");
                    state.record_failed_iteration(iteration);
                }
            }
        }
    });

    states
}
