#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

mod decoder;
pub use decoder::decode;

mod error;
pub use error::*;

mod header;
pub use header::*;

mod listener;
pub use listener::*;

mod printer;
pub use printer::*;

pub mod types;

mod value;
pub use value::*;
