//! The Run Configuration and its Derived Constants. A [`RunConfig`] is
//! immutable once built; [`RunConfig::derive`] computes the
//! once-per-run numerical constants every test shares.

use crate::Test;
use std::collections::HashSet;

/// Which stage(s) a run performs. See §4.6 of the design: the three modes
/// share the same underlying components, just sequenced differently.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RunMode {
    /// Iterate all tests, write human reports, then aggregate metrics.
    IterateAndAssess,
    /// Iterate all tests, write binary p-value files, skip aggregation.
    IterateOnly,
    /// Read binary p-value files from a directory, aggregate metrics, emit
    /// the final report.
    AssessOnly,
}

/// The immutable-after-parse Run Configuration.
#[derive(Clone, Debug)]
pub struct RunConfig {
    /// Iteration bit length, `n`.
    pub iteration_bits: usize,
    /// Number of iterations, `numOfBitStreams`.
    pub num_iterations: usize,
    /// Significance level, `alpha`.
    pub alpha: f64,
    /// Number of uniformity bins.
    pub uniformity_bins: usize,
    /// Uniformity threshold below which a test is flagged in the final
    /// report even though it may still count as PASSED_BOTH.
    pub uniformity_level: f64,
    pub run_mode: RunMode,
    pub legacy_output: bool,
    pub results_file: bool,
    /// Which tests are enabled. A test absent from this set is skipped
    /// entirely (distinct from a test that disables itself in `init`
    /// because `n` is too small for it).
    pub enabled_tests: HashSet<Test>,
}

impl RunConfig {
    pub fn is_enabled(&self, test: Test) -> bool {
        self.enabled_tests.contains(&test)
    }

    /// Computes the constants every test shares: `sqrt(n)`, `sqrt(2n)`,
    /// `ln(2)`. Per-test precomputed tables live on the test itself, not
    /// here, since they depend on test-specific arguments as well as `n`.
    pub fn derive(&self) -> DerivedConstants {
        let n = self.iteration_bits as f64;
        DerivedConstants {
            sqrt_n: n.sqrt(),
            sqrt_2n: (2.0 * n).sqrt(),
            ln_2: std::f64::consts::LN_2,
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        use strum::IntoEnumIterator;
        Self {
            iteration_bits: crate::DEFAULT_ITERATION_BITS,
            num_iterations: 1,
            alpha: crate::DEFAULT_ALPHA,
            uniformity_bins: crate::DEFAULT_UNIFORMITY_BINS,
            uniformity_level: crate::DEFAULT_UNIFORMITY_LEVEL,
            run_mode: RunMode::IterateAndAssess,
            legacy_output: false,
            results_file: false,
            enabled_tests: Test::iter().collect(),
        }
    }
}

/// Constants computed once per run from the [`RunConfig`]; the Rust
/// realization of the `cSetup`-guarded derived-constants block (§3.1): the
/// type only exists once the values are valid, so there is nothing to
/// assert before a test reads them.
#[derive(Copy, Clone, Debug)]
pub struct DerivedConstants {
    pub sqrt_n: f64,
    pub sqrt_2n: f64,
    pub ln_2: f64,
}
