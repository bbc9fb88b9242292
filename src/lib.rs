//! # huffcodec
//!
//! Lossless Huffman coding in two flavours:
//! * `traditional` writes a self-describing header of (symbol, count) pairs and
//!   rebuilds the tree on decode from those counts.
//! * `canonical` writes only per-symbol code lengths and reconstructs codes
//!   deterministically from lengths alone.
//!
//! Both variants share the same tree builder (`tools::tree`) and the same
//! bit-granular I/O layer (`tools::bit_stream`), and both use `tools::bit_array`
//! as the fixed-width accumulator for left-justified codes.
//!
//! ## Buffer Example
//!
//! ```rs
//! use huffcodec::traditional;
//! let data = b"the quick brown fox jumps over the lazy dog";
//! let compressed = traditional::compress_slice(data).expect("encode failed");
//! let restored = traditional::expand_slice(&compressed).expect("decode failed");
//! assert_eq!(data.to_vec(), restored);
//! ```

mod tools;
pub mod traditional;
pub mod canonical;

pub(crate) use tools::bit_array;
pub(crate) use tools::bit_stream;
pub(crate) use tools::tree;

/// Number of real byte symbols (0..=255).
pub(crate) const NUM_BYTE_SYMBOLS: usize = 256;
/// Total symbol count including the end-of-stream sentinel.
pub(crate) const NUM_SYMBOLS: usize = 257;
/// Symbol index used to mark end-of-stream in the encoded payload.
pub(crate) const EOF_CHAR: u16 = 256;
/// Width in bits of the fixed accumulator codes are left-justified into.
pub(crate) const CODE_WIDTH: usize = 256;

/// Library errors.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed input: {0}")]
    MalformedInput(String),
    #[error("symbol count overflowed u32")]
    CountOverflow,
    #[error("domain error: {0}")]
    Domain(String),
    #[error("allocation failure")]
    Alloc,
}

pub(crate) type Result<T> = std::result::Result<T, Error>;

/// Builds the 257-entry count table for one encode call: tallies every byte
/// in `data`, then pre-seeds `EOF_CHAR` with 1 as §4.3 requires.
pub(crate) fn counts_from_bytes(data: &[u8]) -> Result<[u32; NUM_SYMBOLS]> {
    let mut counts = [0u32; NUM_SYMBOLS];
    for &b in data {
        let slot = &mut counts[b as usize];
        *slot = slot.checked_add(1).ok_or(Error::CountOverflow)?;
    }
    counts[EOF_CHAR as usize] = 1;
    Ok(counts)
}

/// An `UnexpectedEof` while reading a header or length table is malformed
/// input, not an I/O failure; any other I/O error passes through unchanged.
pub(crate) fn io_to_malformed(e: std::io::Error, what: &str) -> Error {
    if e.kind() == std::io::ErrorKind::UnexpectedEof {
        Error::MalformedInput(format!("truncated {what}"))
    } else {
        Error::Io(e)
    }
}
