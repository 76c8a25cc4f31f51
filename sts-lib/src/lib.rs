//! An implementation of the NIST SP 800-22 statistical test suite.
//!
//! This crate is the core engine: it takes a bit stream, partitions it into
//! fixed-size iterations, runs all fifteen tests on each iteration and
//! aggregates the resulting p-values into per-test verdicts. It does not
//! itself provide a command-line front-end or a distributed launcher -
//! see the `sts-cmd` crate for those.
//!
//! The five-operation per-test contract is [`test_interface::StatTest`].
//! Iterating a whole run is [`iteration::run_iterations`]. Turning the
//! resulting p-values into verdicts is [`metrics::aggregate`].

pub mod bitvec;
pub mod config;
pub mod dynarray;
pub mod internals;
pub mod iteration;
pub mod metrics;
pub mod pvalue;
pub mod reports;
pub mod run;
pub mod test_interface;
pub mod tests;

use strum::{EnumIter, EnumString};

/// Number of bits in a byte. Used throughout instead of a bare `8` so that
/// bit-index arithmetic reads the same way the spec states it.
pub const BYTE_SIZE: usize = 8;

/// Default significance level alpha, per NIST's own recommendation.
pub const DEFAULT_ALPHA: f64 = 0.01;

/// Default number of uniformity bins for the metrics aggregator.
pub const DEFAULT_UNIFORMITY_BINS: usize = 10;

/// Default uniformity threshold below which a test's uniformity p-value is
/// considered a failure report-worthy enough to flag in the final report.
pub const DEFAULT_UNIFORMITY_LEVEL: f64 = 0.0001;

/// Default iteration length: 2^20 bits = 131072 bytes.
pub const DEFAULT_ITERATION_BITS: usize = 1 << 20;

/// Minimum input size, in bytes, the distributed coordinator requires to
/// hand even a single worker a full iteration block.
pub const MIN_DISTRIBUTED_BYTES: usize = DEFAULT_ITERATION_BITS / BYTE_SIZE;

/// Maximum number of worker processes the distributed coordinator will ever
/// spawn for one job, regardless of input size.
pub const MAX_WORKER_PROCS: usize = 32;

/// The fifteen NIST SP 800-22 tests this crate implements.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, EnumIter, EnumString, strum::Display)]
#[strum(serialize_all = "PascalCase")]
pub enum Test {
    Frequency,
    BlockFrequency,
    Runs,
    LongestRunOfOnes,
    Rank,
    Fft,
    NonOverlappingTemplateMatching,
    OverlappingTemplateMatching,
    Universal,
    LinearComplexity,
    Serial,
    ApproximateEntropy,
    CumulativeSums,
    RandomExcursions,
    RandomExcursionsVariant,
}

impl Test {
    /// Number of p-values this test emits per iteration. Most tests emit
    /// exactly one; a few emit a fixed small number (Cumulative Sums: 2,
    /// Serial: 2); the two excursion tests emit a variable number bounded
    /// by a fixed maximum (one partition per state that actually occurs).
    pub fn max_partition_count(self) -> usize {
        match self {
            Test::CumulativeSums | Test::Serial => 2,
            Test::NonOverlappingTemplateMatching => tests::non_overlapping_template_matching::DEFAULT_TEMPLATE_COUNT,
            Test::RandomExcursions => 8,
            Test::RandomExcursionsVariant => 18,
            _ => 1,
        }
    }
}

/// Errors that can arise while preparing or running a test. These map to
/// the "fatal" severity of the error handling design: an `Err` here aborts
/// the run for the originating component rather than being swallowed.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("arithmetic overflow: {0}")]
    Overflow(String),
    #[error("computed value was NaN")]
    NaN,
    #[error("computed value was infinite")]
    Infinite,
    #[error("gamma function evaluation failed: {0}")]
    GammaFunctionFailed(#[from] statrs::StatsError),
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("corrupt p-value file: {0}")]
    CorruptPValueFile(String),
}
