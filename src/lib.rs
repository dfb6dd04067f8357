//! Hive schema inference for streams of JSON records.
//!
//! [`inference`] classifies each record into a lattice node and joins the
//! nodes into one schema; [`render`] prints it. The remaining modules are the
//! command-line plumbing around that core: record sources, jq preprocessing,
//! column shredding and dictionary encoding.
pub mod cli;
pub mod dict;
pub mod error;
pub mod inference;
pub mod jq_exec;
pub mod render;
pub mod shred;
pub mod source;

pub use error::{InferError, Result};
pub use inference::{join, join_opt, observe_value, Inference, Kind, Ty};
