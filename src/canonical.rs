//! Canonical Huffman coding: the header carries only each symbol's code
//! length, and both encoder and decoder reconstruct identical codes from
//! those lengths via the same sort-then-accumulate pass. No codes are ever
//! written to disk.
//!
//! File layout:
//! ```text
//! [ code length per symbol: 257 bytes, in symbol order ]
//! [ bit payload: one code per input byte, MSB-first, then EOF_CHAR's code ]
//! [ zero padding to the next byte boundary ]
//! ```

use crate::bit_array::BitArray;
use crate::bit_stream::{BitReader, BitWriter};
use crate::tree::HuffmanTree;
use crate::{counts_from_bytes, io_to_malformed, Error, Result, CODE_WIDTH, EOF_CHAR, NUM_SYMBOLS};
use std::cmp::Ordering;
use std::io::{Read, Write};

/// One entry of the canonical code table: a symbol, its assigned length,
/// and its left-justified code.
struct CanonicalEntry {
    symbol: u16,
    code_len: u8,
    code: BitArray,
}

/// Derives each symbol's code length by walking its leaf's parent chain;
/// unreachable (unused) symbols keep length 0.
fn derive_lengths(tree: &HuffmanTree) -> [u8; NUM_SYMBOLS] {
    let mut lengths = [0u8; NUM_SYMBOLS];
    for idx in tree.leaves_left_to_right() {
        let node = tree.node(idx);
        let sym = node.value.expect("leaf always carries a symbol") as usize;
        lengths[sym] = tree.code_len(idx) as u8;
    }
    lengths
}

/// Rejects a codeLen vector that cannot describe a valid prefix code, i.e.
/// one whose Kraft sum `Σ 2^-len` (over used symbols) exceeds 1. Uses the
/// standard integer doubling-and-subtract form of the Kraft inequality
/// (track the number of codes still available at each length, doubling it
/// going one level deeper and subtracting the codes actually used there)
/// rather than a floating-point sum, so the check is exact even though
/// lengths run up to 255. `left` is clamped once it comfortably exceeds the
/// total number of symbols still to place, since no further doubling can
/// make an already-sufficient budget run out.
fn validate_prefix_code(lengths: &[u8; NUM_SYMBOLS]) -> Result<()> {
    let max_len = lengths.iter().copied().max().unwrap_or(0) as usize;
    if max_len == 0 {
        return Ok(());
    }
    let mut count_per_len = vec![0u32; max_len + 1];
    for &l in lengths.iter() {
        if l > 0 {
            count_per_len[l as usize] += 1;
        }
    }
    let mut left: i64 = 1;
    for len in 1..=max_len {
        left = left * 2 - count_per_len[len] as i64;
        if left < 0 {
            return Err(Error::MalformedInput(
                "codeLen vector implies a non-prefix code (over-subscribed)".into(),
            ));
        }
        if left > NUM_SYMBOLS as i64 {
            left = NUM_SYMBOLS as i64;
        }
    }
    Ok(())
}

/// Sorts the 257 symbols by `(codeLen asc, symbol asc)` and assigns codes
/// per §4.5's accumulator pass. Returns entries in that same sorted order,
/// which is exactly the order the decoder's linear scan needs; encoders
/// re-key the result by symbol for O(1) lookup.
fn assign_canonical_codes(lengths: &[u8; NUM_SYMBOLS]) -> Result<Vec<CanonicalEntry>> {
    validate_prefix_code(lengths)?;
    let mut order: Vec<u16> = (0..NUM_SYMBOLS as u16).collect();
    order.sort_by(|&a, &b| {
        lengths[a as usize]
            .cmp(&lengths[b as usize])
            .then(a.cmp(&b))
    });
    let mut entries: Vec<CanonicalEntry> = Vec::with_capacity(order.len());
    for s in order {
        entries.push(CanonicalEntry {
            symbol: s,
            code_len: lengths[s as usize],
            code: BitArray::new(CODE_WIDTH)?,
        });
    }

    let mut code = BitArray::new(CODE_WIDTH)?;
    let mut length = entries.last().map(|e| e.code_len as usize).unwrap_or(0);
    for i in (0..entries.len()).rev() {
        let cl = entries[i].code_len as usize;
        if cl == 0 {
            break;
        }
        if cl < length {
            code.shift_right(length - cl);
            length = cl;
        }
        let mut justified = code.duplicate();
        justified.shift_left(CODE_WIDTH - length);
        entries[i].code = justified;
        code.increment();
    }
    Ok(entries)
}

/// Encodes `input` into `output` using the canonical code-length header.
pub fn encode<R: Read, W: Write>(input: &mut R, output: &mut W) -> Result<()> {
    log::debug!("canonical encode: reading input");
    let mut data = Vec::new();
    input.read_to_end(&mut data)?;
    let counts = counts_from_bytes(&data)?;
    let tree = HuffmanTree::build(&counts);
    log::debug!("tree built over {} bytes, deriving code lengths", data.len());
    let lengths = derive_lengths(&tree);
    output.write_all(&lengths)?;

    let entries = assign_canonical_codes(&lengths)?;
    log::debug!("canonical codes assigned, writing payload");
    let mut by_symbol: Vec<Option<(u8, BitArray)>> = (0..NUM_SYMBOLS).map(|_| None).collect();
    for entry in entries {
        by_symbol[entry.symbol as usize] = Some((entry.code_len, entry.code));
    }
    let mut writer = BitWriter::new(&mut *output);
    for &b in &data {
        let (len, code) = by_symbol[b as usize]
            .as_ref()
            .expect("every symbol in data has a code by construction");
        writer.put_bits(code, *len as usize)?;
        log::trace!("wrote code for byte {:#04x}", b);
    }
    let (eof_len, eof_code) = by_symbol[EOF_CHAR as usize]
        .as_ref()
        .expect("EOF_CHAR is always active");
    writer.put_bits(eof_code, *eof_len as usize)?;
    writer.finish()?;
    Ok(())
}

/// Decodes a canonical-format archive from `input` into `output`.
pub fn decode<R: Read, W: Write>(input: &mut R, output: &mut W) -> Result<()> {
    let mut lengths = [0u8; NUM_SYMBOLS];
    input
        .read_exact(&mut lengths)
        .map_err(|e| io_to_malformed(e, "code-length header"))?;
    log::debug!("read canonical code-length header");
    let sorted = assign_canonical_codes(&lengths)?;

    // lenIndex[L] = first index in `sorted` with code_len == L, or
    // sorted.len() (the sentinel "not present") otherwise.
    let mut len_index = vec![sorted.len(); CODE_WIDTH + 1];
    for (i, e) in sorted.iter().enumerate() {
        let l = e.code_len as usize;
        if l > 0 && len_index[l] == sorted.len() {
            len_index[l] = i;
        }
    }

    let mut reader = BitReader::new(input);
    let mut code = BitArray::new(CODE_WIDTH)?;
    let mut length = 0usize;
    loop {
        let bit = match reader.get_bit()? {
            Some(bit) => bit,
            None => {
                return Err(Error::MalformedInput(
                    "truncated payload before EOF_CHAR decoded".into(),
                ))
            }
        };
        if bit {
            code.set_bit(length)?;
        }
        length += 1;

        let li = len_index[length];
        let mut matched = None;
        if li != sorted.len() {
            let mut j = li;
            while j < sorted.len() && sorted[j].code_len as usize == length {
                if sorted[j].code.compare(&code)? == Ordering::Equal {
                    matched = Some(j);
                    break;
                }
                j += 1;
            }
        }
        if let Some(j) = matched {
            let sym = sorted[j].symbol;
            if sym == EOF_CHAR {
                break;
            }
            output.write_all(&[sym as u8])?;
            log::trace!("decoded byte {:#04x}", sym);
            code = BitArray::new(CODE_WIDTH)?;
            length = 0;
        }
    }
    Ok(())
}

/// Builds the canonical table exactly as `encode` does and writes a
/// textual dump sorted by symbol value, the canonical counterpart to
/// `traditional::show_tree`.
pub fn show_tree<R: Read, W: Write>(input: &mut R, output: &mut W) -> Result<()> {
    let mut data = Vec::new();
    input.read_to_end(&mut data)?;
    let counts = counts_from_bytes(&data)?;
    let tree = HuffmanTree::build(&counts);
    let lengths = derive_lengths(&tree);
    let mut entries = assign_canonical_codes(&lengths)?;
    entries.sort_by_key(|e| e.symbol);
    for e in &entries {
        if e.code_len == 0 {
            continue;
        }
        let label = if e.symbol == EOF_CHAR {
            "EOF".to_string()
        } else {
            format!("0x{:02X}", e.symbol)
        };
        let bits: String = e
            .code
            .bits(e.code_len as usize)
            .map(|b| if b { '1' } else { '0' })
            .collect();
        writeln!(output, "{label:<5} {:>3} {bits}", e.code_len)?;
    }
    Ok(())
}

/// Convenience wrapper: encode an in-memory buffer.
pub fn compress_slice(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    encode(&mut std::io::Cursor::new(data), &mut out)?;
    Ok(out)
}

/// Convenience wrapper: decode an in-memory buffer.
pub fn expand_slice(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    decode(&mut std::io::Cursor::new(data), &mut out)?;
    Ok(out)
}
