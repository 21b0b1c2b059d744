//! Progress display while an answer streams in

pub mod stream_printer;
