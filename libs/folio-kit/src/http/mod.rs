pub mod client;
pub mod request_id;
pub mod text_stream;
pub mod trace_context;

pub use client::TracedClient;
pub use text_stream::text_stream_response;
