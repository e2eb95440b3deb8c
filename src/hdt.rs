//! Facade tying the [`Header`], [`FourSectDict`] and [`TriplesBitmap`] sections together into a
//! complete in-memory HDT dataset, read and written in the order described at
//! <https://www.rdfhdt.org/hdt-binary-format/>.
use crate::containers::{ControlInfo, ControlType};
use crate::four_sect_dict::{self, FourSectDict, IdKind};
use crate::header::{self, Header};
use crate::triples::{self, Id, ObjectIter, PredicateIter, PredicateObjectIter, SubjectIter, TriplesBitmap};
use std::io::{BufRead, Write};
use std::sync::Arc;
use thiserror::Error;

/// Subject, predicate and object of a triple as owned, reference-counted strings.
pub type StringTriple = (Arc<str>, Arc<str>, Arc<str>);

pub type Result<T> = core::result::Result<T, Error>;

/// The error type for [`Hdt::read`] and [`Hdt::write`].
#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to read global control info")]
    ControlInfo(#[from] crate::containers::control_info::Error),
    #[error("unsupported global HDT format {0:?}, this implementation only supports HDTv1")]
    UnsupportedGlobalFormat(String),
    #[error("failed to read header")]
    Header(#[from] header::Error),
    #[error("failed to read dictionary")]
    Dict(#[from] four_sect_dict::Error),
    #[error("failed to read triples")]
    Triples(#[from] triples::Error),
    #[error("IO error")]
    Io(#[from] std::io::Error),
}

/// URI identifier of the global control information, see <http://purl.org/HDT/hdt#HDTv1>.
const HDT_CONTAINER_FORMAT: &str = "<http://purl.org/HDT/hdt#HDTv1>";

/// An in-memory representation of a complete HDT (Header, Dictionary, Triples) RDF dataset.
pub struct Hdt {
    pub(crate) header: Header,
    pub(crate) dict: FourSectDict,
    pub(crate) triples: TriplesBitmap,
}

impl std::fmt::Debug for Hdt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "header with {} triples", self.header.body.len())?;
        writeln!(f, "dict {:#?}", self.dict)?;
        write!(f, "triples {:#?}", self.triples)
    }
}

impl Hdt {
    /// Read an HDT file, checking the checksums of all sections.
    pub fn new(reader: impl BufRead) -> Result<Self> {
        Self::read(reader)
    }

    /// Read an HDT file: global control info, header, dictionary, triples, in that order.
    /// Counterpart to [`Hdt::write`].
    pub fn read(mut reader: impl BufRead) -> Result<Self> {
        let global_ci = ControlInfo::read(&mut reader)?;
        if global_ci.format != HDT_CONTAINER_FORMAT {
            return Err(Error::UnsupportedGlobalFormat(global_ci.format));
        }
        let header = Header::read(&mut reader)?;
        let dict = FourSectDict::read(&mut reader)?.validate()?;
        let triples = TriplesBitmap::read_sect(&mut reader)?;
        Ok(Hdt { header, dict, triples })
    }

    /// Load an HDT file from a path, transparently caching the (expensive to build) triples index
    /// in a sidecar `<path>.index.v1-1` file for faster subsequent loads.
    /// *This function is available only if HDT is built with the `"cache"` feature.*
    #[cfg(feature = "cache")]
    pub fn new_from_path(path: &std::path::Path) -> Result<Self> {
        use std::fs::File;
        use std::io::BufReader;

        let mut reader = BufReader::new(File::open(path)?);
        let global_ci = ControlInfo::read(&mut reader)?;
        if global_ci.format != HDT_CONTAINER_FORMAT {
            return Err(Error::UnsupportedGlobalFormat(global_ci.format));
        }
        let header = Header::read(&mut reader)?;
        let dict = FourSectDict::read(&mut reader)?.validate()?;

        let mut cache_path = path.as_os_str().to_owned();
        cache_path.push(".index.v1-1");
        let cache_path = std::path::PathBuf::from(cache_path);
        let triples = match File::open(&cache_path) {
            Ok(f) => TriplesBitmap::load(&mut BufReader::new(f))?,
            Err(_) => {
                let triples = TriplesBitmap::read_sect(&mut reader)?;
                match File::create(&cache_path) {
                    Ok(f) => {
                        if let Err(e) = triples.store(&mut std::io::BufWriter::new(f)) {
                            log::warn!("failed to write triples cache to {}: {e}", cache_path.display());
                        }
                    }
                    Err(e) => log::warn!("failed to create triples cache at {}: {e}", cache_path.display()),
                }
                triples
            }
        };
        Ok(Hdt { header, dict, triples })
    }

    /// Write the HDT file, mirroring the section order of [`Hdt::read`].
    pub fn write(&self, writer: &mut impl Write) -> Result<()> {
        ControlInfo { control_type: ControlType::Global, format: HDT_CONTAINER_FORMAT.to_string(), ..Default::default() }
            .write(writer)?;
        self.header.write(writer)?;
        self.dict.write(writer)?;
        self.triples.write(writer)?;
        Ok(())
    }

    /// All triples in the dataset as owned strings.
    /// # Example
    /// ```no_run
    /// let file = std::fs::File::open("example.hdt")?;
    /// let hdt = hdt::Hdt::read(std::io::BufReader::new(file))?;
    /// for (s, p, o) in hdt.triples() {
    ///     println!("{s} {p} {o}");
    /// }
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn triples(&self) -> impl Iterator<Item = StringTriple> + '_ {
        self.triples_all().map(|[s, p, o]| (s, p, o))
    }

    /// All triples in the dataset, in the representation used by the Sophia [`Graph`](sophia::api::graph::Graph) impl.
    pub(crate) fn triples_all(&self) -> impl Iterator<Item = [Arc<str>; 3]> + '_ {
        (&self.triples).into_iter().map(move |[s, p, o]| {
            [
                Arc::from(self.dict.id_to_string(s, IdKind::Subject).unwrap()),
                Arc::from(self.dict.id_to_string(p, IdKind::Predicate).unwrap()),
                Arc::from(self.dict.id_to_string(o, IdKind::Object).unwrap()),
            ]
        })
    }

    /// Triples matching the given subject, predicate and/or object. `None` matches any value in that position.
    /// A constant that does not occur in the dictionary yields an empty iterator rather than an error.
    pub fn triples_with_pattern<'a>(
        &'a self, subject: Option<&str>, predicate: Option<&str>, object: Option<&str>,
    ) -> Box<dyn Iterator<Item = StringTriple> + 'a> {
        let s = subject.map(|s| self.dict.string_to_id(s, IdKind::Subject));
        let p = predicate.map(|p| self.dict.string_to_id(p, IdKind::Predicate));
        let o = object.map(|o| self.dict.string_to_id(o, IdKind::Object));
        if s == Some(0) || p == Some(0) || o == Some(0) {
            return Box::new(std::iter::empty());
        }
        let to_strings = move |[s, p, o]: [Id; 3]| -> StringTriple {
            (
                Arc::from(self.dict.id_to_string(s, IdKind::Subject).unwrap()),
                Arc::from(self.dict.id_to_string(p, IdKind::Predicate).unwrap()),
                Arc::from(self.dict.id_to_string(o, IdKind::Object).unwrap()),
            )
        };
        match (s, p, o) {
            (None, None, None) => Box::new(self.triples()),
            (Some(s), None, None) => Box::new(SubjectIter::with_pattern(&self.triples, [s, 0, 0]).map(to_strings)),
            (Some(s), Some(p), None) => {
                Box::new(SubjectIter::with_pattern(&self.triples, [s, p, 0]).map(to_strings))
            }
            (Some(s), None, Some(o)) => {
                Box::new(SubjectIter::with_pattern(&self.triples, [s, 0, o]).map(to_strings))
            }
            (Some(s), Some(p), Some(o)) => {
                Box::new(SubjectIter::with_pattern(&self.triples, [s, p, o]).map(to_strings))
            }
            (None, Some(p), None) => Box::new(PredicateIter::new(&self.triples, p).map(to_strings)),
            (None, Some(p), Some(o)) => {
                Box::new(PredicateObjectIter::new(&self.triples, p, o).map(move |s| to_strings([s, p, o])))
            }
            (None, None, Some(o)) => Box::new(ObjectIter::new(&self.triples, o).map(to_strings)),
        }
    }

    /// Size in bytes of the in-memory dictionary and triples index, not counting the header.
    pub fn size_in_bytes(&self) -> usize {
        self.dict.size_in_bytes() + self.triples.size_in_bytes()
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::containers::rdf::{Id as RdfId, Term as RdfTerm, Triple};
    use color_eyre::Result;
    use std::collections::BTreeSet;
    use std::io::Write as _;

    /// A small, hand-built HDT dataset used in place of a real-world fixture file.
    /// Reuses a handful of terms from the SNIK meta ontology (<https://github.com/IMISE/snik-ontology>)
    /// for a realistic flavor, but is not a faithful copy of it.
    pub fn snikmeta() -> Result<Hdt> {
        const BLOCK_SIZE: usize = 4;
        let nt = [
            r#"<http://www.snik.eu/ontology/meta/Top> <http://www.w3.org/2000/01/rdf-schema#label> "top class"@en ."#,
            r#"<http://www.snik.eu/ontology/meta/Top> <http://purl.org/dc/terms/modified> "2022-10-20"^^<http://www.w3.org/2001/XMLSchema#date> ."#,
            r#"<http://www.snik.eu/ontology/meta> <http://www.w3.org/2000/01/rdf-schema#label> "meta"@en ."#,
            r#"<http://www.snik.eu/ontology/meta> <http://purl.org/dc/terms/modified> "22.10" ."#,
            r#"<http://www.snik.eu/ontology/meta/Chapter> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://www.w3.org/2002/07/owl#Class> ."#,
            r#"_:b1 <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://www.w3.org/2002/07/owl#Restriction> ."#,
            r#"_:b1 <http://www.snik.eu/ontology/meta/uses> <http://www.snik.eu/ontology/meta/Chapter> ."#,
            r#"_:b1 <http://www.snik.eu/ontology/meta/uses> "22.10" ."#,
        ];
        let mut buf = Vec::new();
        for line in nt {
            writeln!(buf, "{line}")?;
        }
        let (dict, mut encoded) = FourSectDict::read_nt(&mut std::io::Cursor::new(buf), BLOCK_SIZE)?;
        encoded.sort_unstable();
        let triples = TriplesBitmap::from_triples(&encoded);

        let mut body = BTreeSet::new();
        body.insert(Triple::new(
            RdfId::Named("http://example.org/snikmeta".to_string()),
            "http://rdfs.org/ns/void#triples".to_string(),
            RdfTerm::Literal(crate::containers::rdf::Literal::new(encoded.len().to_string())),
        ));
        let header = Header { format: "ntriples".to_string(), length: 0, body };
        Ok(Hdt { header, dict, triples })
    }

    /// Sanity checks that should hold for any valid dataset built from [`snikmeta`], whether read
    /// directly or round-tripped through the binary format or another loader.
    pub fn snikmeta_check(hdt: &Hdt) -> Result<()> {
        let triples: Vec<StringTriple> = hdt.triples().collect();
        assert_eq!(8, triples.len());
        assert_eq!(
            1,
            hdt.triples_with_pattern(Some("_:b1"), Some("http://www.snik.eu/ontology/meta/uses"), None)
                .filter(|(_, _, o)| &**o == "http://www.snik.eu/ontology/meta/Chapter")
                .count()
        );
        assert_eq!(3, hdt.triples_with_pattern(Some("_:b1"), None, None).count());
        assert_eq!(
            2,
            hdt.triples_with_pattern(None, Some("http://www.w3.org/2000/01/rdf-schema#label"), None).count()
        );
        assert_eq!(2, hdt.triples_with_pattern(None, None, Some(r#""22.10""#)).count());
        Ok(())
    }

    #[test]
    fn write_read_roundtrip() -> Result<()> {
        crate::tests::init();
        let hdt = snikmeta()?;
        snikmeta_check(&hdt)?;
        let mut buf = Vec::new();
        hdt.write(&mut buf)?;
        let hdt2 = Hdt::read(std::io::Cursor::new(buf))?;
        snikmeta_check(&hdt2)?;
        let triples: Vec<StringTriple> = hdt.triples().collect();
        let triples2: Vec<StringTriple> = hdt2.triples().collect();
        assert_eq!(triples, triples2);
        Ok(())
    }

    #[test]
    fn rejects_non_hdt_input() {
        let garbage = b"not an hdt file at all".to_vec();
        assert!(Hdt::read(std::io::Cursor::new(garbage)).is_err());
    }
}
