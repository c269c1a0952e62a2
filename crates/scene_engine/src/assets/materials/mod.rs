//! Material library (`.mtl`) loading

pub mod mtl_parser;

pub use mtl_parser::{MaterialLibrary, MtlParser};
