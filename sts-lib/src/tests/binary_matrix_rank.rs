//! Binary Matrix Rank test: carves the iteration into 32x32-bit matrices
//! and checks the distribution of their ranks (over GF(2)) against NIST's
//! closed-form probabilities for full rank, rank-1-deficient, and
//! everything else.

use crate::bitvec::BitVec;
use crate::config::{DerivedConstants, RunConfig};
use crate::internals::{check_f64, igamc};
use crate::test_interface::StatTest;
use crate::{Error, Test};

const M: usize = 32;
pub const MIN_INPUT_LENGTH: usize = 38_912;

const PROBABILITIES: [f64; 3] = [
    0.288_788_095_153_841_1,
    0.577_576_190_173_204_6,
    0.128_350_264_423_166_7,
];

pub struct Rank;

impl StatTest for Rank {
    type Args = ();

    const TEST: Test = Test::Rank;

    fn min_length(_args: ()) -> usize {
        MIN_INPUT_LENGTH
    }

    fn partition_count(_args: ()) -> usize {
        1
    }

    fn iterate(
        data: &BitVec,
        _cfg: &RunConfig,
        _derived: &DerivedConstants,
        _args: (),
    ) -> Result<Vec<(f64, f64)>, Error> {
        let n = data.len_bit();
        let block_bits = M * M;
        let block_count = n / block_bits;

        let mut full_rank = 0u64;
        let mut rank_minus_one = 0u64;
        let mut other = 0u64;

        for block in 0..block_count {
            let base = block * block_bits;
            let mut rows = [0u32; M];
            for row in 0..M {
                let mut value = 0u32;
                for col in 0..M {
                    if data.bit(base + row * M + col) {
                        value |= 1 << (M - col - 1);
                    }
                }
                rows[row] = value;
            }

            match matrix_rank(rows) {
                32 => full_rank += 1,
                31 => rank_minus_one += 1,
                _ => other += 1,
            }
        }

        let n_blocks = block_count as f64;
        let chi_sq = (full_rank as f64 - n_blocks * PROBABILITIES[0]).powi(2) / (n_blocks * PROBABILITIES[0])
            + (rank_minus_one as f64 - n_blocks * PROBABILITIES[1]).powi(2) / (n_blocks * PROBABILITIES[1])
            + (other as f64 - n_blocks * PROBABILITIES[2]).powi(2) / (n_blocks * PROBABILITIES[2]);
        check_f64(chi_sq)?;

        let p_value = igamc(1.0, chi_sq / 2.0)?;
        check_f64(p_value)?;

        Ok(vec![(chi_sq, p_value)])
    }
}

/// Rank of a 32x32 matrix over GF(2), via full Gauss-Jordan elimination.
/// `rows[r]` is row `r`, bit 0 (MSB of the `u32`) is the leftmost column.
fn matrix_rank(mut rows: [u32; M]) -> usize {
    let mut rank = 0;

    for col in 0..M {
        let mask = 1u32 << (M - col - 1);

        if let Some(pivot) = (rank..M).find(|&r| rows[r] & mask != 0) {
            rows.swap(rank, pivot);
            for r in 0..M {
                if r != rank && rows[r] & mask != 0 {
                    rows[r] ^= rows[rank];
                }
            }
            rank += 1;
        }
    }

    rank
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_blocks_have_full_rank() {
        // 32 blocks of the identity matrix: full rank every time.
        let mut bits = Vec::new();
        for _ in 0..4 {
            for row in 0..M {
                for col in 0..M {
                    bits.push(row == col);
                }
            }
        }
        let data = BitVec::from(bits.as_slice());
        assert_eq!(data.len_bit(), 4 * M * M);

        let mut rows = [0u32; M];
        for (i, row) in rows.iter_mut().enumerate() {
            *row = 1 << (M - i - 1);
        }
        assert_eq!(matrix_rank(rows), 32);
    }

    #[test]
    fn all_zero_matrix_has_rank_zero() {
        assert_eq!(matrix_rank([0u32; M]), 0);
    }
}
