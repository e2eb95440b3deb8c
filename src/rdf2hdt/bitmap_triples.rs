// Copyright (c) 2024-2025, Decisym, LLC

use crate::{
    containers::{self, Bitmap, ControlType, Sequence},
    rdf2hdt::{dictionary::EncodedTripleId, vocab::HDT_TYPE_BITMAP},
    triples::Order,
};
use log::debug;
use std::{
    cmp::Ordering,
    error::Error,
    fs::File,
    io::BufWriter,
};
use thiserror::Error as ThisError;

/// Invariants a sorted triple stream must hold for `BitmapTriples` encoding.
#[derive(ThisError, Debug)]
pub enum InvariantError {
    #[error("triple IDs should never be zero: ({0},{1},{2})")]
    ZeroComponent(u32, u32, u32),
    #[error("the subjects must be correlative: got {0} after {1}")]
    NonCorrelativeSubject(u32, u32),
    #[error("the predicates must be in increasing order within a subject: {0} < {1}")]
    PredicateOutOfOrder(u32, u32),
    #[error("the objects must be in increasing order within a subject/predicate pair: {0} < {1}")]
    ObjectOutOfOrder(u32, u32),
}

#[derive(Default, Debug)]
pub struct BitmapTriplesBuilder {
    y_vec: Vec<u32>,
    z_vec: Vec<u32>,
    bitmap_y: Vec<bool>,
    bitmap_z: Vec<bool>,
    pub order: Order,
    num_triples: usize,
}

impl BitmapTriplesBuilder {
    /// Creates a new BitmapTriples from a list of sorted RDF triples
    pub fn load(mut triples: Vec<EncodedTripleId>) -> Result<Self, Box<dyn Error>> {
        // libhdt/src/triples/BitmapTriples.cpp:load()
        let timer = std::time::Instant::now();

        sort_triples_spo(&mut triples);

        let mut y_bitmap = Vec::new();
        let mut z_bitmap = Vec::new();
        let mut array_y = Vec::new();
        let mut array_z = Vec::new();

        let mut last_x: u32 = 0;
        let mut last_y: u32 = 0;
        let mut last_z: u32 = 0;
        for (i, triple) in triples.iter().enumerate() {
            let x = triple.subject;
            let y = triple.predicate;
            let z = triple.object;

            if x == 0 || y == 0 || z == 0 {
                return Err(InvariantError::ZeroComponent(x, y, z).into());
            }

            if i == 0 {
                array_y.push(y);
                array_z.push(z);
            } else if x != last_x {
                if x != last_x + 1 {
                    return Err(InvariantError::NonCorrelativeSubject(x, last_x).into());
                }

                //x unchanged
                y_bitmap.push(true);
                array_y.push(y);

                z_bitmap.push(true);
                array_z.push(z);
            } else if y != last_y {
                if y < last_y {
                    return Err(InvariantError::PredicateOutOfOrder(y, last_y).into());
                }

                // y unchanged
                y_bitmap.push(false);
                array_y.push(y);

                z_bitmap.push(true);
                array_z.push(z);
            } else {
                if z < last_z {
                    return Err(InvariantError::ObjectOutOfOrder(z, last_z).into());
                }

                // z changed
                z_bitmap.push(false);
                array_z.push(z);
            }

            last_x = x;
            last_y = y;
            last_z = z;
        }

        y_bitmap.push(true);
        z_bitmap.push(true);
        debug!("BitmapTriples build time: {:?}", timer.elapsed());

        Ok(BitmapTriplesBuilder {
            bitmap_y: y_bitmap,
            bitmap_z: z_bitmap,
            y_vec: array_y,
            z_vec: array_z,
            order: Order::SPO,
            num_triples: triples.len(),
        })
    }

    pub fn save(&self, dest_writer: &mut BufWriter<File>) -> Result<(), Box<dyn Error>> {
        let mut ci = containers::ControlInfo {
            control_type: ControlType::Triples,
            format: HDT_TYPE_BITMAP.to_string(),
            ..Default::default()
        };
        ci.properties.insert("order".to_string(), (self.order.clone() as u8).to_string());
        ci.properties.insert("numTriples".to_string(), self.num_triples.to_string());
        ci.save(dest_writer)?;

        Bitmap::from_bits(&self.bitmap_y).write(dest_writer)?;
        Bitmap::from_bits(&self.bitmap_z).write(dest_writer)?;

        let y_vec: Vec<usize> = self.y_vec.iter().map(|v| *v as usize).collect();
        let z_vec: Vec<usize> = self.z_vec.iter().map(|v| *v as usize).collect();
        Sequence::new(&y_vec).write(dest_writer)?;
        Sequence::new(&z_vec).write(dest_writer)?;

        Ok(())
    }
}

/// Function to sort a vector of Triples in SPO order
fn sort_triples_spo(triples: &mut [EncodedTripleId]) {
    triples.sort_by(spo_comparator);
}

fn spo_comparator(a: &EncodedTripleId, b: &EncodedTripleId) -> Ordering {
    let subject_order = a.subject.cmp(&b.subject);
    if subject_order != Ordering::Equal {
        return subject_order;
    }

    let predicate_order = a.predicate.cmp(&b.predicate);
    if predicate_order != Ordering::Equal {
        return predicate_order;
    }

    a.object.cmp(&b.object)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triple(s: u32, p: u32, o: u32) -> EncodedTripleId {
        EncodedTripleId { subject: s, predicate: p, object: o }
    }

    #[test]
    fn load_rejects_zero_component() {
        let triples = vec![triple(1, 1, 0)];
        assert!(BitmapTriplesBuilder::load(triples).is_err());
    }

    #[test]
    fn load_rejects_non_correlative_subjects() {
        let triples = vec![triple(1, 1, 1), triple(3, 1, 1)];
        assert!(BitmapTriplesBuilder::load(triples).is_err());
    }

    #[test]
    fn load_accepts_sorted_triples() {
        let triples = vec![triple(1, 1, 1), triple(1, 1, 2), triple(1, 2, 1), triple(2, 1, 1)];
        let builder = BitmapTriplesBuilder::load(triples).expect("valid sorted triples");
        assert_eq!(builder.num_triples, 4);
        assert_eq!(builder.order, Order::SPO);
    }
}
