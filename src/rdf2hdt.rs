//! RDF -> HDT conversion pipeline.
//! *This module is available only if HDT is built with the `"cli"` feature.*
//!
//! Reads RDF (any format `oxrdfio` understands, via an intermediate N-Triples pass),
//! builds a four-section dictionary and a `SPO`-ordered `BitmapTriples` encoding, and
//! writes the resulting sections to a `.hdt` file. Mirrors `libhdt/src/hdt/BasicHDT.cpp`.

pub mod bitmap_triples;
pub mod builder;
pub mod dictionary;
pub mod rdf_reader;
pub mod vocab;
