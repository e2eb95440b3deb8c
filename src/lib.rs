//! # HDT
//!
//! [Header Dictionary Triples (HDT)](https://www.rdfhdt.org/) is a compressed format for large
//! [RDF](https://www.w3.org/RDF/) graphs that supports fast triple pattern lookups directly
//! on the compressed representation, without a separate decompression step.
//!
//! An HDT file consists of four sections:
//! * [`containers::ControlInfo`] framing, present once per section and once globally.
//! * [`header`], an RDF/N-Triples description of the dataset itself.
//! * [`four_sect_dict`], a four-section [`dict_sect_pfc`]-encoded dictionary mapping RDF terms to integer IDs.
//! * [`triples`], a `BitmapTriples` encoding of the ID-mapped triples with a forward (SPO) adjacency index
//!   and an `OPS`-ordered reverse index for efficient `?PO`/`??O` lookups.
//!
//! The [`Hdt`] struct ties these together and is the main entry point for reading an HDT file
//! and iterating over its triples, optionally restricted by a triple pattern.
#![allow(unused)]

// bitmaps, sequences, adjacency lists, the `ControlInfo` framing shared by every section
pub mod containers;
// four-section dictionary and its plain front coding-compressed sections
pub mod dict_sect_pfc;
pub mod four_sect_dict;
// RDF/N-Triples header section
pub mod header;
// the HDT facade tying header + dictionary + triples together
pub mod hdt;
// BitmapTriples and its triple pattern iterators
pub mod triples;
// IRI constants for the HDT and VoID vocabularies used in generated headers
pub mod vocab;
// multi-pattern join planner over triple IDs
pub mod join;

/// *This module is available only if HDT is built with the `"cli"` feature.*
#[cfg(feature = "cli")]
pub mod rdf2hdt;

/// Read-only [`sophia`] [`Graph`](sophia::api::graph::Graph) implementation over an [`Hdt`].
/// *This module is available only if HDT is built with the `"sophia"` feature, included by default.*
#[cfg(feature = "sophia")]
pub mod hdt_graph;

/// Conversion between HDT and N-Triples.
/// *This module is available only if HDT is built with the experimental `"nt"` feature.*
#[cfg(feature = "nt")]
pub mod nt;

/// [`spareval`] `QueryableDataset` implementation over one or more HDT files.
/// *This module is available only if HDT is built with the `"sparql"` feature.*
#[cfg(feature = "sparql")]
pub mod sparql;

#[cfg(target_arch = "wasm32")]
mod wasm_manual;

pub use dict_sect_pfc::DictSectPFC;
pub use four_sect_dict::{FourSectDict, IdKind};
pub use hdt::{Hdt, StringTriple};

#[cfg(feature = "sophia")]
pub use hdt_graph::HdtTerm;

use containers::ControlInfo;

#[cfg(test)]
pub(crate) mod tests {
    pub use crate::hdt::tests::{snikmeta, snikmeta_check};

    /// Initialize logging for tests, safe to call multiple times.
    pub fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }
}
