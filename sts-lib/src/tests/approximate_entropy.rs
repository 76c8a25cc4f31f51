//! Approximate Entropy test: compares the frequency of every overlapping
//! `m`-bit and `m+1`-bit pattern (read circularly) to the frequency expected
//! of a random sequence; large deviations mean the sequence is more
//! predictable than chance.

use crate::bitvec::BitVec;
use crate::config::{DerivedConstants, RunConfig};
use crate::internals::{check_f64, igamc};
use crate::test_interface::StatTest;
use crate::{Error, Test};

const DEFAULT_BLOCK_LENGTH: usize = 10;

#[derive(Copy, Clone, Debug)]
pub enum ApproximateEntropyArgs {
    Manual(usize),
    ChooseAutomatically,
}

impl Default for ApproximateEntropyArgs {
    fn default() -> Self {
        ApproximateEntropyArgs::ChooseAutomatically
    }
}

fn block_length(args: ApproximateEntropyArgs) -> usize {
    match args {
        ApproximateEntropyArgs::Manual(m) => m,
        ApproximateEntropyArgs::ChooseAutomatically => DEFAULT_BLOCK_LENGTH,
    }
}

/// `phi(m)`: reads every `m`-bit pattern starting at each of the `n`
/// positions, wrapping around the end of the sequence (the "circular"
/// extension NIST 2.2.12 specifies), tallies pattern frequencies, and folds
/// them into the single entropy-like statistic the test needs.
fn phi(data: &BitVec, m: usize) -> f64 {
    if m == 0 {
        return 0.0;
    }

    let n = data.len_bit();
    let mut counts = vec![0u64; 1 << m];

    for start in 0..n {
        let mut pattern = 0usize;
        for bit in 0..m {
            let idx = (start + bit) % n;
            pattern = (pattern << 1) | data.bit(idx) as usize;
        }
        counts[pattern] += 1;
    }

    let n_f = n as f64;
    counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let freq = c as f64 / n_f;
            freq * freq.ln()
        })
        .sum()
}

pub struct ApproximateEntropy;

impl StatTest for ApproximateEntropy {
    type Args = ApproximateEntropyArgs;

    const TEST: Test = Test::ApproximateEntropy;

    fn min_length(args: Self::Args) -> usize {
        // NIST 2.2.12 recommends `m < floor(log2(n)) - 5`; inverted, that
        // puts a floor under `n` of roughly `2^(m+5)`.
        1usize << (block_length(args) + 5)
    }

    fn partition_count(_args: Self::Args) -> usize {
        1
    }

    fn iterate(
        data: &BitVec,
        _cfg: &RunConfig,
        _derived: &DerivedConstants,
        args: Self::Args,
    ) -> Result<Vec<(f64, f64)>, Error> {
        let m = block_length(args);
        let n = data.len_bit() as f64;

        let ap_en = phi(data, m) - phi(data, m + 1);
        check_f64(ap_en)?;

        let chi_sq = 2.0 * n * (std::f64::consts::LN_2 - ap_en);
        check_f64(chi_sq)?;

        let p_value = igamc(2f64.powi(m as i32 - 1), chi_sq / 2.0)?;
        check_f64(p_value)?;

        Ok(vec![(ap_en, p_value)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alternating_bits_have_low_entropy_and_fail() {
        let m = 2;
        let n = 1usize << (m + 5);
        let cfg = RunConfig {
            iteration_bits: n,
            ..RunConfig::default()
        };
        let derived = cfg.derive();
        let bits: Vec<bool> = (0..n).map(|i| i % 2 == 0).collect();
        let data = BitVec::from(bits.as_slice());
        let result =
            ApproximateEntropy::iterate(&data, &cfg, &derived, ApproximateEntropyArgs::Manual(m))
                .unwrap();
        assert!(result[0].1 < 0.01);
    }

    #[test]
    fn min_length_grows_with_block_length() {
        assert!(
            ApproximateEntropy::min_length(ApproximateEntropyArgs::Manual(3))
                > ApproximateEntropy::min_length(ApproximateEntropyArgs::Manual(2))
        );
    }
}
