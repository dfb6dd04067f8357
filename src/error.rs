//! Errors raised by the inference core.
//!
//! I/O, JSON syntax, glob and jq failures are application concerns and travel
//! as `anyhow::Error` through the CLI layer instead.
use thiserror::Error;

use crate::inference::Kind;

#[derive(Debug, Error)]
pub enum InferError {
    /// Integral literal (scale ≤ 0) whose value does not fit an `i64`.
    #[error("integer literal out of 64-bit range: {literal}")]
    IntegerOutOfRange { literal: String },

    /// Fractional literal whose closest double is infinite.
    #[error("floating-point literal overflows a double: {literal}")]
    FloatOutOfRange { literal: String },

    /// Literal the decimal reader could not make sense of.
    #[error("malformed numeric literal: {literal}")]
    MalformedNumber { literal: String },

    /// Table rendering asked for on a non-struct accumulator.
    #[error("table rendering needs a struct at the top level, found {found}")]
    NotAStruct { found: Kind },
}

pub type Result<T> = std::result::Result<T, InferError>;
