//! Succinct bitmap with rank and select support, used to mark group boundaries in the
//! adjacency lists of the triples section and in the OPS index.
//! See <https://www.rdfhdt.org/hdt-binary-format/#Bitmap>.
use crate::containers::vbyte::{encode_vbyte, read_vbyte};
use bytesize::ByteSize;
use qwt::bitvector::rs_narrow::RSNarrow;
use qwt::{BitVector, BitVectorMut};
use std::fmt;
use std::io::{BufRead, Write};
use std::mem::size_of;
use std::thread::{self, JoinHandle};
use thiserror::Error;

/// Compact bitmap with O(1)-ish rank and select, backed by `qwt`'s narrow rank/select directory.
pub struct Bitmap {
    pub(crate) dict: RSNarrow,
}

impl Clone for Bitmap {
    fn clone(&self) -> Self {
        let bits: Vec<bool> = (0..self.len()).map(|i| self.get_bit(i)).collect();
        Bitmap::from_bits(&bits)
    }
}

impl fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} with {} bits, {} ones", ByteSize(self.size_in_bytes() as u64), self.len(), self.num_ones())
    }
}

/// The error type for [`Bitmap::read`].
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error")]
    Io(#[from] std::io::Error),
    #[error("unsupported bitmap type {0}, expected 1")]
    UnsupportedStreamType(u8),
    #[error("invalid CRC8-CCIT checksum {0}, expected {1}")]
    InvalidCrc8Checksum(u8, u8),
}

impl Bitmap {
    /// Builds a bitmap from plain booleans.
    pub fn from_bits(bits: &[bool]) -> Self {
        let mut bv = BitVectorMut::new();
        for &b in bits {
            bv.push(b);
        }
        Bitmap { dict: RSNarrow::from(BitVector::from(bv)) }
    }

    /// Number of bits stored.
    pub fn len(&self) -> usize {
        self.dict.len()
    }

    /// Whether the bitmap is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value of the bit at `pos`.
    pub fn get_bit(&self, pos: usize) -> bool {
        self.dict.get(pos).unwrap_or(false)
    }

    /// Whether the node at `word_index` is the last child of its parent, i.e. whether its bit is set.
    pub fn at_last_sibling(&self, word_index: usize) -> bool {
        self.get_bit(word_index)
    }

    /// Number of one bits up to but excluding `pos` (rank1).
    pub fn rank(&self, pos: usize) -> usize {
        self.dict.rank1(pos)
    }

    /// Position of the `pos`-th (0-indexed) one bit, or `None` if there is no such bit.
    pub fn select1(&self, pos: usize) -> Option<usize> {
        self.dict.select1(pos)
    }

    /// Total number of one bits.
    pub fn num_ones(&self) -> usize {
        self.dict.n_ones()
    }

    /// Size in bytes on the heap.
    pub fn size_in_bytes(&self) -> usize {
        self.dict.len().div_ceil(8)
    }

    /// Reads a bitmap, blocking until the body CRC32 checksum has been verified.
    pub fn read<R: BufRead>(reader: &mut R) -> Result<Self, Error> {
        let (bitmap, handle) = Self::read_async(reader)?;
        if !handle.join().unwrap_or(false) {
            log::warn!("bitmap CRC32 checksum mismatch");
        }
        Ok(bitmap)
    }

    /// Like [`Bitmap::read`] but returns the checksum join handle instead of blocking on it.
    pub fn read_async<R: BufRead>(reader: &mut R) -> Result<(Self, JoinHandle<bool>), Error> {
        use Error::*;
        let mut history: Vec<u8> = Vec::new();

        let mut bitmap_type = [0u8];
        reader.read_exact(&mut bitmap_type)?;
        history.extend_from_slice(&bitmap_type);
        if bitmap_type[0] != 1 {
            return Err(UnsupportedStreamType(bitmap_type[0]));
        }

        let (num_bits, bytes_read) = read_vbyte(reader)?;
        history.extend_from_slice(&bytes_read);

        let mut crc_code = [0_u8];
        reader.read_exact(&mut crc_code)?;
        let crc_code = crc_code[0];

        let crc8 = crc::Crc::<u8>::new(&crc::CRC_8_SMBUS);
        let mut digest = crc8.digest();
        digest.update(&history);
        let calculated = digest.finalize();
        if calculated != crc_code {
            return Err(InvalidCrc8Checksum(calculated, crc_code));
        }

        const USIZE_BITS: usize = usize::BITS as usize;
        let total_words = num_bits.div_ceil(USIZE_BITS);
        let full_byte_amount = total_words.saturating_sub(1) * size_of::<usize>();
        let mut full_words = vec![0_u8; full_byte_amount];
        reader.read_exact(&mut full_words)?;
        let mut words: Vec<usize> = Vec::with_capacity(total_words);
        for word in full_words.chunks_exact(size_of::<usize>()) {
            words.push(usize::from_le_bytes(word.try_into().unwrap()));
        }

        let mut history = full_words;
        let mut bits_read = 0;
        let mut last_value: usize = 0;
        let last_word_bits = if num_bits == 0 { 0 } else { ((num_bits - 1) % USIZE_BITS) + 1 };
        while bits_read < last_word_bits {
            let mut buffer = [0u8];
            reader.read_exact(&mut buffer)?;
            history.extend_from_slice(&buffer);
            last_value |= (buffer[0] as usize) << bits_read;
            bits_read += 8;
        }
        if total_words > 0 {
            words.push(last_value);
        }

        let mut crc_code = [0_u8; 4];
        reader.read_exact(&mut crc_code)?;
        let crc_handle = thread::spawn(move || {
            let crc32 = crc::Crc::<u32>::new(&crc::CRC_32_ISCSI);
            let mut digest = crc32.digest();
            digest.update(&history);
            digest.finalize() == u32::from_le_bytes(crc_code)
        });

        let mut bits = Vec::with_capacity(num_bits);
        'outer: for word in &words {
            for bit_offset in 0..USIZE_BITS {
                if bits.len() >= num_bits {
                    break 'outer;
                }
                bits.push((word >> bit_offset) & 1 == 1);
            }
        }
        Ok((Bitmap::from_bits(&bits), crc_handle))
    }

    /// Counterpart to [`Bitmap::read`].
    pub fn write(&self, dest_writer: &mut impl Write) -> std::io::Result<()> {
        const USIZE_BITS: usize = usize::BITS as usize;
        let num_bits = self.len();

        let crc8 = crc::Crc::<u8>::new(&crc::CRC_8_SMBUS);
        let mut digest8 = crc8.digest();

        let bitmap_type: [u8; 1] = [1];
        dest_writer.write_all(&bitmap_type)?;
        digest8.update(&bitmap_type);

        let num_bits_buf = encode_vbyte(num_bits);
        dest_writer.write_all(&num_bits_buf)?;
        digest8.update(&num_bits_buf);

        dest_writer.write_all(&[digest8.finalize()])?;

        let total_words = num_bits.div_ceil(USIZE_BITS);
        let mut words = vec![0usize; total_words];
        for i in 0..num_bits {
            if self.get_bit(i) {
                words[i / USIZE_BITS] |= 1 << (i % USIZE_BITS);
            }
        }

        let crc32 = crc::Crc::<u32>::new(&crc::CRC_32_ISCSI);
        let mut digest32 = crc32.digest();
        let mut body = Vec::with_capacity(total_words * size_of::<usize>());
        for &word in words.iter().take(total_words.saturating_sub(1)) {
            body.extend_from_slice(&word.to_le_bytes());
        }
        if total_words > 0 {
            let last_word_bits = if num_bits == 0 { 0 } else { ((num_bits - 1) % USIZE_BITS) + 1 };
            let last_bytes = last_word_bits.div_ceil(8);
            body.extend_from_slice(&words[total_words - 1].to_le_bytes()[..last_bytes]);
        }
        dest_writer.write_all(&body)?;
        digest32.update(&body);
        dest_writer.write_all(&digest32.finalize().to_le_bytes())?;
        dest_writer.flush()
    }
}

impl From<BitVector> for Bitmap {
    fn from(bv: BitVector) -> Self {
        Bitmap { dict: RSNarrow::from(bv) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_select_roundtrip() {
        let bits = vec![true, false, false, true, true, false, true, false, false, false, true];
        let bitmap = Bitmap::from_bits(&bits);
        assert_eq!(bitmap.len(), bits.len());
        assert_eq!(bitmap.num_ones(), bits.iter().filter(|&&b| b).count());

        let mut rank = 0;
        for (i, &b) in bits.iter().enumerate() {
            assert_eq!(bitmap.rank(i), rank);
            if b {
                rank += 1;
            }
        }

        let ones: Vec<usize> = bits.iter().enumerate().filter(|(_, &b)| b).map(|(i, _)| i).collect();
        for (k, &pos) in ones.iter().enumerate() {
            assert_eq!(bitmap.select1(k), Some(pos));
        }
        assert_eq!(bitmap.select1(ones.len()), None);
    }

    #[test]
    fn write_read_roundtrip() {
        let bits: Vec<bool> = (0..200).map(|i| i % 3 == 0).collect();
        let bitmap = Bitmap::from_bits(&bits);
        let mut buf = Vec::new();
        bitmap.write(&mut buf).unwrap();
        let mut cursor = std::io::Cursor::new(buf);
        let bitmap2 = Bitmap::read(&mut cursor).unwrap();
        assert_eq!(bitmap.len(), bitmap2.len());
        for i in 0..bitmap.len() {
            assert_eq!(bitmap.get_bit(i), bitmap2.get_bit(i));
        }
    }

    #[test]
    fn empty_bitmap() {
        let bitmap = Bitmap::from_bits(&[]);
        assert_eq!(bitmap.len(), 0);
        assert_eq!(bitmap.num_ones(), 0);
        assert_eq!(bitmap.select1(0), None);
    }
}
