//! Static country/capital reference tables.

pub mod reference;

pub use reference::{CountryRecord, ReferenceData};
