//! Output writers.

mod writer;

pub use writer::{Writer, WriterConfig};
