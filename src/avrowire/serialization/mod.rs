//! Message serialization
//!
//! Binary Avro encode/decode behind the schema-registry wire format. An
//! [`AvroCodec`] serves one model under one subject; [`TopicSerde`] pairs a
//! key and a value codec for a topic. Records move through the codec as
//! `HashMap<String, FieldValue>`.

pub mod avro_codec;
pub mod error;
pub mod types;
pub mod wire;

pub use avro_codec::{AvroCodec, CodecConfig, MessageCodec, TopicSerde};
pub use error::SerializationError;
pub use types::FieldValue;
pub use wire::{HEADER_LEN, MAGIC_BYTE};
