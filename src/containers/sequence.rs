//! Packed fixed-width integer array ("LogArray"/`Log64` in the HDT terminology).
//!
//! Stores `entries` unsigned integers, each `bits_per_entry` wide, tightly packed into
//! little-endian `usize` words. See <https://www.rdfhdt.org/hdt-binary-format/#LogArray>.
use crate::containers::vbyte::{encode_vbyte, read_vbyte};
use bytesize::ByteSize;
use std::fmt;
use std::io::{BufRead, Write};
use std::mem::size_of;
use std::thread::{self, JoinHandle};
use thiserror::Error;

const USIZE_BITS: usize = usize::BITS as usize;

/// Packed integer array with CRC-framed on-disk layout matching `libhdt`'s `LogArray`.
#[derive(Clone, PartialEq, Eq)]
pub struct Sequence {
    /// number of logical entries
    pub entries: usize,
    /// bit width of every entry
    pub bits_per_entry: usize,
    /// packed storage, `ceil(entries * bits_per_entry / USIZE_BITS)` words
    pub data: Vec<usize>,
}

impl fmt::Debug for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} with {} entries, {} bits per entry", ByteSize(self.size_in_bytes() as u64), self.entries, self.bits_per_entry)
    }
}

/// The error type for [`Sequence::read`].
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error")]
    Io(#[from] std::io::Error),
    #[error("invalid LogArray type tag {0}, expected 1")]
    UnsupportedStreamType(u8),
    #[error("entry bit width {0} is larger than {} bits", USIZE_BITS)]
    EntryTooWide(usize),
    #[error("invalid CRC8-CCIT checksum {0}, expected {1}")]
    InvalidCrc8Checksum(u8, u8),
}

impl Sequence {
    /// Builds a packed sequence from plain values, choosing the minimal bit width that fits the
    /// largest value (minimum 1 bit, matching the convention used for offset/delimiter arrays).
    pub fn new(values: &[usize]) -> Self {
        let max = values.iter().copied().max().unwrap_or(0);
        let bits_per_entry = if max == 0 { 1 } else { (max.ilog2() + 1) as usize };
        Sequence { entries: values.len(), bits_per_entry, data: values.to_vec() }
    }

    /// Value at logical position `i`.
    pub fn get(&self, i: usize) -> usize {
        if self.bits_per_entry == 0 {
            return 0;
        }
        let bit_pos = i * self.bits_per_entry;
        let mut result: usize = 0;
        let mut bits_read = 0;
        while bits_read < self.bits_per_entry {
            let word_index = (bit_pos + bits_read) / USIZE_BITS;
            let word_offset = (bit_pos + bits_read) % USIZE_BITS;
            let available = USIZE_BITS - word_offset;
            let to_read = (self.bits_per_entry - bits_read).min(available);
            let mask = if to_read == USIZE_BITS { usize::MAX } else { (1usize << to_read) - 1 };
            let chunk = (self.data[word_index] >> word_offset) & mask;
            result |= chunk << bits_read;
            bits_read += to_read;
        }
        result
    }

    /// Size on the heap, in bytes.
    pub fn size_in_bytes(&self) -> usize {
        self.data.len() * size_of::<usize>()
    }

    /// Reads a packed sequence, blocking until the body CRC32 checksum has been verified.
    pub fn read<R: BufRead>(reader: &mut R) -> Result<Self, Error> {
        let (seq, handle) = Self::read_async(reader)?;
        if !handle.join().unwrap_or(false) {
            log::warn!("sequence CRC32 checksum mismatch");
        }
        Ok(seq)
    }

    /// Like [`Sequence::read`] but returns the checksum join handle instead of blocking on it,
    /// so the caller can keep parsing the rest of the file while validation runs in the background.
    pub fn read_async<R: BufRead>(reader: &mut R) -> Result<(Self, JoinHandle<bool>), Error> {
        use Error::*;
        let mut history: Vec<u8> = Vec::new();

        let mut buffer = [0_u8];
        reader.read_exact(&mut buffer)?;
        history.extend_from_slice(&buffer);
        if buffer[0] != 1 {
            return Err(UnsupportedStreamType(buffer[0]));
        }

        reader.read_exact(&mut buffer)?;
        history.extend_from_slice(&buffer);
        let bits_per_entry = buffer[0] as usize;
        if bits_per_entry > USIZE_BITS {
            return Err(EntryTooWide(bits_per_entry));
        }

        let (entries, bytes_read) = read_vbyte(reader)?;
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

        let total_bits = bits_per_entry * entries;
        let total_words = total_bits.div_ceil(USIZE_BITS);
        let full_byte_amount = total_words.saturating_sub(1) * size_of::<usize>();
        let mut full_words = vec![0_u8; full_byte_amount];
        reader.read_exact(&mut full_words)?;
        let mut data: Vec<usize> = Vec::with_capacity(total_words);
        for word in full_words.chunks_exact(size_of::<usize>()) {
            data.push(usize::from_le_bytes(word.try_into().unwrap()));
        }

        let mut history = full_words;
        let mut bits_read = 0;
        let mut last_value: usize = 0;
        let last_entry_bits = if total_bits == 0 { 0 } else { ((total_bits - 1) % USIZE_BITS) + 1 };
        while bits_read < last_entry_bits {
            let mut buffer = [0u8];
            reader.read_exact(&mut buffer)?;
            history.extend_from_slice(&buffer);
            last_value |= (buffer[0] as usize) << bits_read;
            bits_read += 8;
        }
        if total_words > 0 {
            data.push(last_value);
        }

        let mut crc_code = [0_u8; 4];
        reader.read_exact(&mut crc_code)?;
        let crc_handle = thread::spawn(move || {
            let crc32 = crc::Crc::<u32>::new(&crc::CRC_32_ISCSI);
            let mut digest = crc32.digest();
            digest.update(&history);
            digest.finalize() == u32::from_le_bytes(crc_code)
        });

        Ok((Sequence { entries, bits_per_entry, data }, crc_handle))
    }

    /// Counterpart to [`Sequence::read`].
    pub fn write(&self, dest_writer: &mut impl Write) -> std::io::Result<()> {
        let crc8 = crc::Crc::<u8>::new(&crc::CRC_8_SMBUS);
        let mut digest8 = crc8.digest();

        let seq_type: [u8; 1] = [1];
        dest_writer.write_all(&seq_type)?;
        digest8.update(&seq_type);

        let bits: [u8; 1] = [self.bits_per_entry as u8];
        dest_writer.write_all(&bits)?;
        digest8.update(&bits);

        let entries_buf = encode_vbyte(self.entries);
        dest_writer.write_all(&entries_buf)?;
        digest8.update(&entries_buf);

        dest_writer.write_all(&[digest8.finalize()])?;

        let crc32 = crc::Crc::<u32>::new(&crc::CRC_32_ISCSI);
        let mut digest32 = crc32.digest();
        let packed = pack(&self.data, self.bits_per_entry, self.entries);
        dest_writer.write_all(&packed)?;
        digest32.update(&packed);
        dest_writer.write_all(&digest32.finalize().to_le_bytes())?;
        dest_writer.flush()
    }
}

/// Packs `entries` values of `bits_per_entry` bits each, in the same byte layout
/// [`Sequence::read`] expects (all but the last word byte-aligned, last word truncated to its
/// used bits).
fn pack(data: &[usize], bits_per_entry: usize, entries: usize) -> Vec<u8> {
    let total_bits = bits_per_entry * entries;
    let total_words = total_bits.div_ceil(USIZE_BITS);
    let mut out = Vec::with_capacity(total_words * size_of::<usize>());
    for &word in data.iter().take(total_words.saturating_sub(1)) {
        out.extend_from_slice(&word.to_le_bytes());
    }
    if total_words > 0 {
        let last_entry_bits = if total_bits == 0 { 0 } else { ((total_bits - 1) % USIZE_BITS) + 1 };
        let last_bytes = last_entry_bits.div_ceil(8);
        let last_word = data[total_words - 1];
        out.extend_from_slice(&last_word.to_le_bytes()[..last_bytes]);
    }
    out
}

/// Iterator over the logical values of a borrowed [`Sequence`].
pub struct SequenceRefIter<'a> {
    seq: &'a Sequence,
    pos: usize,
}

impl Iterator for SequenceRefIter<'_> {
    type Item = usize;
    fn next(&mut self) -> Option<usize> {
        if self.pos >= self.seq.entries {
            return None;
        }
        let v = self.seq.get(self.pos);
        self.pos += 1;
        Some(v)
    }
}

impl<'a> IntoIterator for &'a Sequence {
    type Item = usize;
    type IntoIter = SequenceRefIter<'a>;
    fn into_iter(self) -> SequenceRefIter<'a> {
        SequenceRefIter { seq: self, pos: 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_roundtrips_packed_values() {
        let values: Vec<usize> = vec![0, 1, 7, 126, 200, 5000];
        let seq = Sequence::new(&values);
        for (i, v) in values.iter().enumerate() {
            assert_eq!(seq.get(i), *v);
        }
    }

    #[test]
    fn write_read_roundtrip() {
        let values: Vec<usize> = (0..300).map(|i| i * 7 % 97).collect();
        let seq = Sequence::new(&values);
        let mut buf = Vec::new();
        seq.write(&mut buf).unwrap();
        let mut cursor = std::io::Cursor::new(buf);
        let seq2 = Sequence::read(&mut cursor).unwrap();
        assert_eq!(seq.entries, seq2.entries);
        assert_eq!(seq.bits_per_entry, seq2.bits_per_entry);
        for i in 0..seq.entries {
            assert_eq!(seq.get(i), seq2.get(i));
        }
    }

    #[test]
    fn empty_sequence_roundtrip() {
        let seq = Sequence::new(&[]);
        let mut buf = Vec::new();
        seq.write(&mut buf).unwrap();
        let mut cursor = std::io::Cursor::new(buf);
        let seq2 = Sequence::read(&mut cursor).unwrap();
        assert_eq!(seq2.entries, 0);
    }
}
