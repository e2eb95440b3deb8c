//! The Header section holds free-form RDF metadata describing the dataset (VoID statistics,
//! publication info, dictionary/triples layout) as a plain set of [`Triple`]s.
//! See <https://www.rdfhdt.org/hdt-binary-format/#Header>.
use crate::containers::ControlType;
use crate::containers::rdf::{Id, Literal, Term, Triple};
use crate::containers::{self, control_info};
use std::collections::BTreeSet;
use std::io::{BufRead, Write};
use thiserror::Error;

/// The error type for [`Header::read`] and [`Header::write`].
#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to read header control info")]
    ControlInfo(#[from] control_info::Error),
    #[error("headers currently only support the ntriples format, got {0:?}")]
    UnsupportedFormat(String),
    #[error("header is missing the \"length\" property")]
    MissingLength,
    #[error("IO error")]
    Io(#[from] std::io::Error),
    #[error("malformed N-Triples header line: {0:?}")]
    MalformedLine(String),
}

pub type Result<T> = core::result::Result<T, Error>;

/// Dataset metadata stored as a set of RDF triples, framed like the other sections.
#[derive(Debug, Clone, Default)]
pub struct Header {
    /// URI identifier of the body format, currently always `"ntriples"`.
    pub format: String,
    /// Length in bytes of the serialized body.
    pub length: usize,
    /// Metadata triples.
    pub body: BTreeSet<Triple>,
}

impl Header {
    /// Read and verify a header section, including its control information.
    pub fn read<R: BufRead>(reader: &mut R) -> Result<Self> {
        let header_ci = containers::ControlInfo::read(reader)?;
        if header_ci.format != "ntriples" {
            return Err(Error::UnsupportedFormat(header_ci.format));
        }
        let length = header_ci.get("length").and_then(|v| v.parse::<usize>().ok()).ok_or(Error::MissingLength)?;

        let mut buf = vec![0_u8; length];
        reader.read_exact(&mut buf)?;
        let text = String::from_utf8_lossy(&buf);
        let mut body = BTreeSet::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            body.insert(parse_nt_line(line)?);
        }
        Ok(Header { format: header_ci.format, length, body })
    }

    /// Counterpart to [`Header::read`].
    pub fn write(&self, dest_writer: &mut impl Write) -> Result<()> {
        let mut buf = Vec::<u8>::new();
        for triple in &self.body {
            writeln!(buf, "{triple}")?;
        }
        let mut ci = containers::ControlInfo {
            control_type: ControlType::Header,
            format: "ntriples".to_string(),
            ..Default::default()
        };
        ci.properties.insert("length".to_string(), buf.len().to_string());
        ci.write(dest_writer)?;
        dest_writer.write_all(&buf)?;
        Ok(())
    }
}

/// Parses one line of the restricted N-Triples subset the header body is written in:
/// `<iri>|_:label <iri> <iri>|_:label|"literal"["@lang"|"^^<iri>"] .`
fn parse_nt_line(line: &str) -> Result<Triple> {
    let malformed = || Error::MalformedLine(line.to_string());
    let body = line.strip_suffix(" .").ok_or_else(malformed)?;

    let (subject, rest) = if let Some(r) = body.strip_prefix("_:") {
        let (label, rest) = split_first_token(r);
        (Id::Blank(label.to_string()), rest)
    } else if let Some(r) = body.strip_prefix('<') {
        let (iri, rest) = r.split_once('>').ok_or_else(malformed)?;
        (Id::Named(iri.to_string()), rest.trim_start())
    } else {
        return Err(malformed());
    };

    let rest = rest.strip_prefix('<').ok_or_else(malformed)?;
    let (predicate, rest) = rest.split_once('>').ok_or_else(malformed)?;
    let rest = rest.trim_start();

    let object = if let Some(r) = rest.strip_prefix('<') {
        let (iri, _) = r.split_once('>').ok_or_else(malformed)?;
        Term::Id(Id::Named(iri.to_string()))
    } else if let Some(r) = rest.strip_prefix("_:") {
        let (label, _) = split_first_token(r);
        Term::Id(Id::Blank(label.to_string()))
    } else if let Some(r) = rest.strip_prefix('"') {
        let end = r.rfind('"').ok_or_else(malformed)?;
        let form = r[..end].to_string();
        match &r[end + 1..] {
            s if s.is_empty() => Term::Literal(Literal::new(form)),
            s if s.starts_with("^^<") => {
                let datatype = s.strip_prefix("^^<").and_then(|s| s.strip_suffix('>')).ok_or_else(malformed)?;
                Term::Literal(Literal::new_typed(form, datatype.to_string()))
            }
            s if s.starts_with('@') => Term::Literal(Literal::new_lang(form, s[1..].to_string())),
            _ => return Err(malformed()),
        }
    } else {
        return Err(malformed());
    };

    Ok(Triple::new(subject, predicate.to_string(), object))
}

fn split_first_token(s: &str) -> (&str, &str) {
    match s.find(char::is_whitespace) {
        Some(i) => (&s[..i], s[i..].trim_start()),
        None => (s, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_header_body() {
        let mut body = BTreeSet::new();
        body.insert(Triple::new(
            Id::Named("http://example.org/s".to_string()),
            "http://example.org/p".to_string(),
            Term::Literal(Literal::new("hello".to_string())),
        ));
        body.insert(Triple::new(
            Id::Blank("b1".to_string()),
            "http://example.org/q".to_string(),
            Term::Id(Id::Named("http://example.org/o".to_string())),
        ));
        let header = Header { format: "ntriples".to_string(), length: 0, body };

        let mut buf = Vec::new();
        header.write(&mut buf).unwrap();
        let mut reader = std::io::BufReader::new(&buf[..]);
        let header2 = Header::read(&mut reader).unwrap();
        assert_eq!(header.body, header2.body);
    }

    #[test]
    fn empty_header_roundtrip() {
        let header = Header { format: "ntriples".to_string(), length: 0, body: BTreeSet::new() };
        let mut buf = Vec::new();
        header.write(&mut buf).unwrap();
        let mut reader = std::io::BufReader::new(&buf[..]);
        let header2 = Header::read(&mut reader).unwrap();
        assert!(header2.body.is_empty());
    }
}
