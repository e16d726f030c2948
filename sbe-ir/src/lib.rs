#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

#[macro_use]
mod tracing_macros;

mod encoding;
pub use encoding::*;

mod error;
pub use error::*;

mod header;
pub use header::*;

mod ir;
pub use ir::*;

mod primitive;
pub use primitive::*;

pub mod serial;
pub use serial::{decode_ir, encode_ir};

mod signal;
pub use signal::*;

mod token;
pub use token::*;

pub mod util;
