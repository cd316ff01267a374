pub mod client;
pub mod error;
pub mod http;
pub mod stub;

pub use client::MediaEngineClient;
pub use error::EngineError;
pub use http::HttpMediaEngineClient;
pub use stub::StubMediaEngineClient;
