pub mod sample_buffer;
pub mod sample_sink;
