//! Schema-registry wire framing.
//!
//! Every message is `[magic byte][schema id: 4-byte big-endian][avro binary
//! body]`. The header makes messages self-describing: the reader resolves
//! the writer's schema from the embedded id before touching the body.

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use super::error::SerializationError;

/// Leading byte of every framed message.
pub const MAGIC_BYTE: u8 = 0;

/// Magic byte plus the 4-byte schema id.
pub const HEADER_LEN: usize = 5;

/// Prefix an Avro binary body with the wire header.
pub fn encode_frame(schema_id: u32, body: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(HEADER_LEN + body.len());
    frame.push(MAGIC_BYTE);
    // Writing a u32 into a Vec cannot fail.
    frame
        .write_u32::<BigEndian>(schema_id)
        .expect("write into Vec");
    frame.extend_from_slice(body);
    frame
}

/// Split a framed message into its schema id and Avro binary body.
///
/// Inputs shorter than the header or with a mismatched magic byte are
/// rejected as malformed, never truncated.
pub fn decode_frame(bytes: &[u8]) -> Result<(u32, &[u8]), SerializationError> {
    if bytes.len() < HEADER_LEN {
        return Err(SerializationError::WireFormat(format!(
            "message of {} bytes is shorter than the {}-byte header",
            bytes.len(),
            HEADER_LEN
        )));
    }
    if bytes[0] != MAGIC_BYTE {
        return Err(SerializationError::WireFormat(format!(
            "bad magic byte 0x{:02x}, expected 0x{:02x}",
            bytes[0], MAGIC_BYTE
        )));
    }
    let mut id_bytes = &bytes[1..HEADER_LEN];
    let schema_id = id_bytes
        .read_u32::<BigEndian>()
        .map_err(|e| SerializationError::WireFormat(format!("could not read schema id: {}", e)))?;
    Ok((schema_id, &bytes[HEADER_LEN..]))
}
