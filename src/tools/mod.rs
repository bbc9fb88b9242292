//! Internal building blocks shared by the `traditional` and `canonical`
//! codecs: the bit-array accumulator, bit-granular stream I/O, and the
//! Huffman tree builder.

pub(crate) mod bit_array;
pub(crate) mod bit_stream;
pub(crate) mod tree;
