//! IRIs used in the HDT [`crate::header::Header`] body.
//! Mirrors `libhdt`'s `HDTVocabulary.hpp` and `rdf2hdt`'s own copy in [`crate::rdf2hdt::vocab`].

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
pub const HDT_CONTAINER: &str = "http://purl.org/HDT/hdt#HDTv1";
pub const VOID_DATASET: &str = "http://rdfs.org/ns/void#Dataset";
pub const VOID_TRIPLES: &str = "http://rdfs.org/ns/void#triples";
pub const VOID_PROPERTIES: &str = "http://rdfs.org/ns/void#properties";
pub const VOID_DISTINCT_SUBJECTS: &str = "http://rdfs.org/ns/void#distinctSubjects";
pub const VOID_DISTINCT_OBJECTS: &str = "http://rdfs.org/ns/void#distinctObjects";
pub const HDT_STATISTICAL_INFORMATION: &str = "http://purl.org/HDT/hdt#statisticalInformation";
pub const HDT_PUBLICATION_INFORMATION: &str = "http://purl.org/HDT/hdt#publicationInformation";
pub const HDT_FORMAT_INFORMATION: &str = "http://purl.org/HDT/hdt#formatInformation";
pub const HDT_DICTIONARY: &str = "http://purl.org/HDT/hdt#dictionary";
pub const HDT_TRIPLES: &str = "http://purl.org/HDT/hdt#triples";
pub const DC_TERMS_FORMAT: &str = "http://purl.org/dc/terms/format";
pub const HDT_TYPE_BITMAP: &str = "http://purl.org/HDT/hdt#triplesBitmap";
pub const HDT_NUM_TRIPLES: &str = "http://purl.org/HDT/hdt#triplesnumTriples";
pub const HDT_TRIPLES_ORDER: &str = "http://purl.org/HDT/hdt#triplesOrder";
pub const HDT_ORIGINAL_SIZE: &str = "http://purl.org/HDT/hdt#originalSize";
pub const HDT_SIZE: &str = "http://purl.org/HDT/hdt#hdtSize";
pub const DC_TERMS_ISSUED: &str = "http://purl.org/dc/terms/issued";
pub const HDT_DICT_SHARED_SO: &str = "http://purl.org/HDT/hdt#dictionarynumSharedSubjectObject";
pub const HDT_DICT_MAPPING: &str = "http://purl.org/HDT/hdt#dictionarymapping";
pub const HDT_DICT_SIZE_STRINGS: &str = "http://purl.org/HDT/hdt#dictionarysizeStrings";
pub const HDT_DICT_BLOCK_SIZE: &str = "http://purl.org/HDT/hdt#dictionaryblockSize";
