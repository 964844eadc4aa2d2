//! Utility modules for leasescout-ai

pub mod json_extract;

pub use json_extract::{extract_json_object, extract_tagged_json, parse_json_object};
