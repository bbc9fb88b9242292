//! Self-describing Huffman coding: the header carries a `(symbol, count)`
//! pair per used byte value, so the decoder rebuilds the same tree the
//! encoder built and never needs the codes themselves on disk.
//!
//! File layout:
//! ```text
//! [ symbol: u8 ][ count: u32 little-endian ]   repeated, left-priority DFS order
//! [ 0x00 ][ 0x00000000 ]                       terminator
//! [ bit payload: one code per input byte, MSB-first, then EOF_CHAR's code ]
//! [ zero padding to the next byte boundary ]
//! ```

use crate::bit_array::BitArray;
use crate::bit_stream::{BitReader, BitWriter};
use crate::tree::HuffmanTree;
use crate::{counts_from_bytes, io_to_malformed, Error, Result, CODE_WIDTH, EOF_CHAR, NUM_SYMBOLS};
use std::io::{Read, Write};

fn write_header<W: Write>(tree: &HuffmanTree, output: &mut W) -> Result<()> {
    for idx in tree.leaves_left_to_right() {
        let node = tree.node(idx);
        let sym = node.value.expect("leaf always carries a symbol");
        if sym == EOF_CHAR {
            continue;
        }
        output.write_all(&[sym as u8])?;
        output.write_all(&node.count.to_le_bytes())?;
    }
    output.write_all(&[0u8])?;
    output.write_all(&0u32.to_le_bytes())?;
    Ok(())
}

/// Reads the `(symbol, count)` header up to its terminator, returning the
/// 257-entry count table with `EOF_CHAR` pre-seeded to 1.
fn read_header<R: Read>(input: &mut R) -> Result<[u32; NUM_SYMBOLS]> {
    let mut counts = [0u32; NUM_SYMBOLS];
    loop {
        let mut sym_buf = [0u8; 1];
        input
            .read_exact(&mut sym_buf)
            .map_err(|e| io_to_malformed(e, "header"))?;
        let mut count_buf = [0u8; 4];
        input
            .read_exact(&mut count_buf)
            .map_err(|e| io_to_malformed(e, "header"))?;
        let count = u32::from_le_bytes(count_buf);
        if sym_buf[0] == 0 && count == 0 {
            break;
        }
        counts[sym_buf[0] as usize] = count;
    }
    counts[EOF_CHAR as usize] = 1;
    Ok(counts)
}

/// Per-symbol `(code length, left-justified code)`, derived by walking each
/// reachable leaf's parent chain back to the root.
fn build_code_table(tree: &HuffmanTree) -> Vec<Option<(u32, BitArray)>> {
    let mut table: Vec<Option<(u32, BitArray)>> = (0..NUM_SYMBOLS).map(|_| None).collect();
    for idx in tree.leaves_left_to_right() {
        let node = tree.node(idx);
        let sym = node.value.expect("leaf always carries a symbol") as usize;
        let len = tree.code_len(idx);
        let path = tree.path_to(idx);
        let code = BitArray::from_path(&path, CODE_WIDTH).expect("fixed-width alloc cannot fail");
        table[sym] = Some((len, code));
    }
    table
}

/// Encodes `input` into `output` using the traditional (symbol, count)
/// header format.
pub fn encode<R: Read, W: Write>(input: &mut R, output: &mut W) -> Result<()> {
    log::debug!("traditional encode: reading input");
    let mut data = Vec::new();
    input.read_to_end(&mut data)?;
    let counts = counts_from_bytes(&data)?;
    let tree = HuffmanTree::build(&counts);
    log::debug!("tree built over {} bytes, writing header", data.len());
    write_header(&tree, output)?;
    let table = build_code_table(&tree);
    log::debug!("code table built, writing payload");
    let mut writer = BitWriter::new(&mut *output);
    for &b in &data {
        let (len, code) = table[b as usize]
            .as_ref()
            .expect("every symbol in data has a leaf by construction");
        writer.put_bits(code, *len as usize)?;
        log::trace!("wrote code for byte {:#04x}", b);
    }
    let (eof_len, eof_code) = table[EOF_CHAR as usize]
        .as_ref()
        .expect("EOF_CHAR is always active");
    writer.put_bits(eof_code, *eof_len as usize)?;
    writer.finish()?;
    Ok(())
}

/// Decodes a traditional-format archive from `input` into `output`.
pub fn decode<R: Read, W: Write>(input: &mut R, output: &mut W) -> Result<()> {
    let counts = read_header(&mut *input)?;
    log::debug!("header read, rebuilding tree");
    let tree = HuffmanTree::build(&counts);
    let mut reader = BitReader::new(input);
    if tree.is_degenerate() {
        // only EOF_CHAR was active: empty input. Consume its promoted 1-bit
        // code and stop; there is nothing to emit.
        match reader.get_bit()? {
            Some(_) => {}
            None => {
                return Err(Error::MalformedInput(
                    "truncated payload before EOF_CHAR decoded".into(),
                ))
            }
        }
        return Ok(());
    }
    let mut cur = tree.root;
    loop {
        let node = tree.node(cur);
        if let Some(sym) = node.value {
            if sym == EOF_CHAR {
                break;
            }
            output.write_all(&[sym as u8])?;
            log::trace!("decoded byte {:#04x}", sym);
            cur = tree.root;
            continue;
        }
        match reader.get_bit()? {
            Some(false) => cur = node.left.expect("internal node has a left child"),
            Some(true) => cur = node.right.expect("internal node has a right child"),
            None => {
                return Err(Error::MalformedInput(
                    "truncated payload before EOF_CHAR decoded".into(),
                ))
            }
        }
    }
    Ok(())
}

/// Builds the tree exactly as `encode` does and writes a textual dump of
/// each leaf's symbol, count, and assigned code, one line per leaf in
/// left-priority depth-first order.
pub fn show_tree<R: Read, W: Write>(input: &mut R, output: &mut W) -> Result<()> {
    let mut data = Vec::new();
    input.read_to_end(&mut data)?;
    let counts = counts_from_bytes(&data)?;
    let tree = HuffmanTree::build(&counts);
    for idx in tree.leaves_left_to_right() {
        let node = tree.node(idx);
        let sym = node.value.expect("leaf always carries a symbol");
        let label = if sym == EOF_CHAR {
            "EOF".to_string()
        } else {
            format!("0x{sym:02X}")
        };
        let path = tree.path_to(idx);
        let bits: String = path.iter().map(|&b| if b { '1' } else { '0' }).collect();
        writeln!(output, "{label:<5} {:>10} {bits}", node.count)?;
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
