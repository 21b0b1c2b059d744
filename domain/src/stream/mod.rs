//! Answer stream protocol.
//!
//! - [`decoder::LineDecoder`]: chunked bytes to complete UTF-8 lines
//! - [`frame::Frame`]: classification of a `data:` payload
//! - [`assembler::StreamAssembler`]: running answer and [`assembler::StreamUpdate`]s

pub mod assembler;
pub mod decoder;
pub mod frame;
