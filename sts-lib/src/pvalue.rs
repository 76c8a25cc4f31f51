//! The P-Value Sentinel and P-Value Persistence component: writing the
//! iteration-only binary output and reading it back in assess-only mode.

use crate::Error;
use std::io::{Read, Write};
use std::path::Path;

/// Payload bits set on top of the quiet-NaN exponent/mantissa-high-bit
/// pattern to make `NON_P_VALUE` distinguishable from any arithmetic NaN
/// this crate itself might produce (arithmetic NaNs from this crate's own
/// computations are rejected before reaching a p-value slot, via
/// `internals::check_f64`, but the sentinel still needs to survive an
/// identity check across a write/read round trip, which bare `f64::NAN`
/// does not: NaN != NaN under IEEE equality).
const NON_P_VALUE_PAYLOAD: u64 = 0x000D_EAD0_0000_0000;

/// Bit pattern: positive sign, all-ones exponent (NaN), quiet bit set, plus
/// the payload above.
const NON_P_VALUE_BITS: u64 = 0x7FF8_0000_0000_0000 | NON_P_VALUE_PAYLOAD;

/// The distinguished "no result possible" marker. Not a failure - an
/// absence. Compare against it with [`is_non_p_value`], never with `==`.
pub const NON_P_VALUE: f64 = f64::from_bits(NON_P_VALUE_BITS);

/// `true` iff `value` is bit-identical to [`NON_P_VALUE`].
#[inline]
pub fn is_non_p_value(value: f64) -> bool {
    value.to_bits() == NON_P_VALUE_BITS
}

/// Writes a sequence of p-values (iteration-major order, stride =
/// partition count) as IEEE-754 doubles in host byte order.
pub fn write_p_values(path: impl AsRef<Path>, values: &[f64]) -> Result<(), Error> {
    let mut file = std::fs::File::create(path)?;
    let mut buf = Vec::with_capacity(values.len() * 8);
    for v in values {
        buf.extend_from_slice(&v.to_ne_bytes());
    }
    file.write_all(&buf)?;
    Ok(())
}

/// Reads back a sequence of p-values previously written by
/// [`write_p_values`].
pub fn read_p_values(path: impl AsRef<Path>) -> Result<Vec<f64>, Error> {
    let mut file = std::fs::File::open(path)?;
    let mut buf = Vec::new();
    file.read_to_end(&mut buf)?;

    if buf.len() % 8 != 0 {
        return Err(Error::CorruptPValueFile(format!(
            "file length {} is not a multiple of 8",
            buf.len()
        )));
    }

    Ok(buf
        .chunks_exact(8)
        .map(|chunk| f64::from_ne_bytes(chunk.try_into().unwrap()))
        .collect())
}
