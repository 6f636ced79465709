//! Well-known dictionary codes and names.
//!
//! This module provides constants for the HL7 abbreviations of the standard
//! concept datatypes, the standard concept class names and the standard
//! concept map type names.
//!
//! # Examples
//!
//! ```
//! use dictionary_types::well_known;
//!
//! assert_eq!(well_known::DATATYPE_NUMERIC, "NM");
//! assert_eq!(well_known::CLASS_DRUG, "Drug");
//! ```

// =============================================================================
// Datatype HL7 abbreviations
// =============================================================================

/// Numeric values.
pub const DATATYPE_NUMERIC: &str = "NM";

/// Coded values (answers are concepts).
pub const DATATYPE_CODED: &str = "CWE";

/// Free text.
pub const DATATYPE_TEXT: &str = "ST";

/// Not applicable: the concept is never observed directly.
pub const DATATYPE_NOT_APPLICABLE: &str = "ZZ";

/// Boolean.
pub const DATATYPE_BOOLEAN: &str = "BIT";

/// Date.
pub const DATATYPE_DATE: &str = "DT";

/// Time of day.
pub const DATATYPE_TIME: &str = "TM";

/// Date and time.
pub const DATATYPE_DATETIME: &str = "TS";

/// Document or other complex value stored by reference.
pub const DATATYPE_COMPLEX: &str = "ED";

// =============================================================================
// Concept classes
// =============================================================================

/// Laboratory or diagnostic test.
pub const CLASS_TEST: &str = "Test";

/// Diagnosis.
pub const CLASS_DIAGNOSIS: &str = "Diagnosis";

/// Generic drug concept.
pub const CLASS_DRUG: &str = "Drug";

/// Question asked during an encounter.
pub const CLASS_QUESTION: &str = "Question";

/// Convenience set grouping other concepts.
pub const CLASS_CONV_SET: &str = "ConvSet";

/// Catch-all class.
pub const CLASS_MISC: &str = "Misc";

// =============================================================================
// Map types
// =============================================================================

/// The concept and the term mean the same thing.
pub const MAP_TYPE_SAME_AS: &str = "SAME-AS";

/// The concept is narrower than the term.
pub const MAP_TYPE_NARROWER_THAN: &str = "NARROWER-THAN";

/// The concept is broader than the term.
pub const MAP_TYPE_BROADER_THAN: &str = "BROADER-THAN";
