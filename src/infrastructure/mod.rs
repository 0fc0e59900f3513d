// Infrastructure layer - Configuration, file formats and HTTP plumbing
pub mod config;
pub mod csv_codec;
pub mod http_response;
pub mod ndjson_stream;
