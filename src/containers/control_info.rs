//! Preamble that describes a chunk of information.
//! See <https://www.rdfhdt.org/hdt-binary-format/#ControlInformation>.
use std::collections::HashMap;
use std::convert::TryFrom;
use std::io::{BufRead, Write};
use std::str;
use thiserror::Error;

/// Type of Control Information.
#[allow(missing_docs)]
#[repr(u8)]
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum ControlType {
    #[default]
    Unknown = 0,
    Global = 1,
    Header = 2,
    Dictionary = 3,
    Triples = 4,
    Index = 5,
}

impl TryFrom<u8> for ControlType {
    type Error = Error;

    fn try_from(original: u8) -> Result<Self, Self::Error> {
        match original {
            0 => Ok(ControlType::Unknown),
            1 => Ok(ControlType::Global),
            2 => Ok(ControlType::Header),
            3 => Ok(ControlType::Dictionary),
            4 => Ok(ControlType::Triples),
            5 => Ok(ControlType::Index),
            n => Err(Error::UnrecognizedControlType(n)),
        }
    }
}

/// <https://www.rdfhdt.org/hdt-binary-format/>: "preamble that describes a chunk of information".
#[derive(Debug, Default, Clone)]
pub struct ControlInfo {
    /// Type of control information.
    pub control_type: ControlType,
    /// "URI identifier of the implementation of the following section."
    pub format: String,
    /// Key-value entries, ASCII only.
    pub properties: HashMap<String, String>,
}

/// The error type for [`ControlInfo::read`].
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error")]
    Io(#[from] std::io::Error),
    #[error("chunk is not valid HDT Control Information, missing $HDT cookie")]
    InvalidCookie,
    #[error("unrecognized control type {0}")]
    UnrecognizedControlType(u8),
    #[error("format string is not valid UTF-8")]
    InvalidFormat(#[from] std::string::FromUtf8Error),
    #[error("invalid CRC16-ANSI checksum {0}, expected {1}")]
    InvalidCrc16Checksum(u16, u16),
}

impl ControlInfo {
    /// Read and verify control information.
    pub fn read<R: BufRead>(reader: &mut R) -> Result<Self, Error> {
        // Keep track of what we are reading for computing the CRC afterwards.
        let mut history: Vec<u8> = Vec::new();

        // 1. Read the HDT Cookie
        let mut hdt_cookie: [u8; 4] = [0; 4];
        reader.read_exact(&mut hdt_cookie)?;
        if &hdt_cookie != b"$HDT" {
            return Err(Error::InvalidCookie);
        }
        history.extend_from_slice(&hdt_cookie);

        // 2. Read the Control Type
        let mut control_type: [u8; 1] = [0; 1];
        reader.read_exact(&mut control_type)?;
        history.extend_from_slice(&control_type);
        let control_type = ControlType::try_from(control_type[0])?;

        // 3. Read the Format
        let mut format = Vec::new();
        reader.read_until(0x00, &mut format)?;
        history.extend_from_slice(&format);
        format.pop();
        let format = String::from_utf8(format)?;

        // 4. Read the Properties
        let mut prop_str = Vec::new();
        reader.read_until(0x00, &mut prop_str)?;
        history.extend_from_slice(&prop_str);
        prop_str.pop();
        let prop_str = String::from_utf8(prop_str)?;
        let mut properties = HashMap::new();
        for item in prop_str.split(';') {
            if let Some(index) = item.find('=') {
                let (key, val) = item.split_at(index);
                properties.insert(String::from(key), String::from(&val[1..]));
            }
        }

        // 5. Read the CRC
        let mut crc_code = [0_u8; 2];
        reader.read_exact(&mut crc_code)?;
        let crc_code: u16 = u16::from_le_bytes(crc_code);

        // 6. Check the CRC
        let crc16 = crc::Crc::<u16>::new(&crc::CRC_16_ARC);
        let mut digest = crc16.digest();
        digest.update(&history);
        let calculated = digest.finalize();
        if calculated != crc_code {
            return Err(Error::InvalidCrc16Checksum(calculated, crc_code));
        }

        Ok(ControlInfo { control_type, format, properties })
    }

    /// Get property value for the given key, if available.
    pub fn get(&self, key: &str) -> Option<String> {
        self.properties.get(key).cloned()
    }

    /// Counterpart to [`ControlInfo::read`].
    pub fn write(&self, dest_writer: &mut impl Write) -> Result<(), Error> {
        let crc16 = crc::Crc::<u16>::new(&crc::CRC_16_ARC);
        let mut digest = crc16.digest();

        dest_writer.write_all(b"$HDT")?;
        digest.update(b"$HDT");

        let control_type = [self.control_type as u8];
        dest_writer.write_all(&control_type)?;
        digest.update(&control_type);

        let mut format = self.format.clone().into_bytes();
        format.push(0x00);
        dest_writer.write_all(&format)?;
        digest.update(&format);

        let mut keys: Vec<&String> = self.properties.keys().collect();
        keys.sort();
        let prop_str = keys.iter().map(|k| format!("{k}={}", self.properties[*k])).collect::<Vec<_>>().join(";");
        let mut prop_buf = prop_str.into_bytes();
        prop_buf.push(0x00);
        dest_writer.write_all(&prop_buf)?;
        digest.update(&prop_buf);

        dest_writer.write_all(&digest.finalize().to_le_bytes())?;
        dest_writer.flush()?;
        Ok(())
    }

    /// Alias for [`ControlInfo::write`], matching the naming used by the build-side modules.
    pub fn save(&self, dest_writer: &mut impl Write) -> Result<(), Error> {
        self.write(dest_writer)
    }

    /// Control information for a `BitmapTriples` section, as written by [`crate::triples::TriplesBitmap::write`].
    pub fn bitmap_triples(order: u32, num_triples: u32) -> Self {
        let mut properties = HashMap::new();
        properties.insert("order".to_string(), order.to_string());
        properties.insert("numTriples".to_string(), num_triples.to_string());
        ControlInfo {
            control_type: ControlType::Triples,
            format: "<http://purl.org/HDT/hdt#triplesBitmap>".to_string(),
            properties,
        }
    }

    /// Control information preceding the four sections of a [`crate::four_sect_dict::FourSectDict`].
    pub fn four_sect_dict() -> Self {
        ControlInfo {
            control_type: ControlType::Dictionary,
            format: "<http://purl.org/HDT/hdt#dictionaryFour>".to_string(),
            properties: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufReader;

    #[test]
    fn read_info() {
        let info = b"$HDT\x01<http://purl.org/HDT/hdt#HDTv1>\x00\x00\x76\x35";
        let mut reader = BufReader::new(&info[..]);

        let info = ControlInfo::read(&mut reader).expect("failed to read control info");
        assert_eq!(info.control_type, ControlType::Global);
        assert_eq!(info.format, "<http://purl.org/HDT/hdt#HDTv1>");
        assert!(info.properties.is_empty());
    }

    #[test]
    fn write_read_roundtrip() {
        let mut properties = HashMap::new();
        properties.insert("order".to_string(), "1".to_string());
        let ci = ControlInfo {
            control_type: ControlType::Triples,
            format: "<http://purl.org/HDT/hdt#triplesBitmap>".to_string(),
            properties,
        };
        let mut buf = Vec::new();
        ci.save(&mut buf).unwrap();
        let mut reader = BufReader::new(&buf[..]);
        let ci2 = ControlInfo::read(&mut reader).unwrap();
        assert_eq!(ci.control_type, ci2.control_type);
        assert_eq!(ci.format, ci2.format);
        assert_eq!(ci.get("order"), ci2.get("order"));
    }
}
