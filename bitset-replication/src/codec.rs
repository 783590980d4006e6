//! Tagged binary frame over the ASCII log payload.
//!
//! `[format_version:u8][op:u8][payload_len:u32 LE][payload:utf8]`
//!
//! The payload itself keeps the source's plain-text shape (`§3` of the
//! spec) so snapshots and committed logs stay interoperable with the
//! unframed text form; the length-prefixed frame only exists to let a
//! future binary payload variant share the wire without breaking readers
//! that check the format-version byte first.

use bitset_engine::OpCode;

use crate::error::ReplicationError;

/// Current (and, for now, only) frame format.
pub const FORMAT_VERSION: u8 = 0x01;

const HEADER_LEN: usize = 1 + 1 + 4;

fn op_to_byte(op: OpCode) -> u8 {
    match op {
        OpCode::Add => 0,
        OpCode::AddMany => 1,
        OpCode::Remove => 2,
        OpCode::Drop => 3,
        OpCode::Clear => 4,
    }
}

fn op_from_byte(byte: u8) -> Result<OpCode, ReplicationError> {
    match byte {
        0 => Ok(OpCode::Add),
        1 => Ok(OpCode::AddMany),
        2 => Ok(OpCode::Remove),
        3 => Ok(OpCode::Drop),
        4 => Ok(OpCode::Clear),
        other => Err(ReplicationError::UnrecognizedOpCode(other)),
    }
}

/// Encode `(op, payload)` into a length-prefixed binary frame suitable for
/// the proposal channel.
pub fn encode(op: OpCode, payload: &str) -> Vec<u8> {
    let payload_bytes = payload.as_bytes();
    let mut frame = Vec::with_capacity(HEADER_LEN + payload_bytes.len());
    frame.push(FORMAT_VERSION);
    frame.push(op_to_byte(op));
    frame.extend_from_slice(&(payload_bytes.len() as u32).to_le_bytes());
    frame.extend_from_slice(payload_bytes);
    frame
}

/// Decode a frame produced by [`encode`] back into `(op, payload)`.
pub fn decode(frame: &[u8]) -> Result<(OpCode, String), ReplicationError> {
    if frame.len() < HEADER_LEN {
        return Err(ReplicationError::Truncated);
    }
    if frame[0] != FORMAT_VERSION {
        return Err(ReplicationError::UnsupportedFormatVersion(frame[0]));
    }
    let op = op_from_byte(frame[1])?;
    let payload_len_bytes: [u8; 4] = [frame[2], frame[3], frame[4], frame[5]];
    let payload_len = u32::from_le_bytes(payload_len_bytes) as usize;
    let payload_bytes = frame
        .get(HEADER_LEN..HEADER_LEN + payload_len)
        .ok_or(ReplicationError::Truncated)?;
    if frame.len() != HEADER_LEN + payload_len {
        return Err(ReplicationError::Truncated);
    }
    let payload = std::str::from_utf8(payload_bytes)
        .map_err(|_| ReplicationError::MalformedPayload)?
        .to_string();
    Ok((op, payload))
}

/// A decoded, typed log entry, ready to be replayed onto a
/// [`bitset_engine::Namespace`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedOp {
    Add { name: String, value: u32 },
    AddMany { name: String, values: Vec<u32> },
    Remove { name: String, value: u32 },
    Drop { name: String },
    Clear { name: String },
}

/// Split `payload` into `(op, decoded fields)` per the "first comma only"
/// rule in the spec: ADD/REMOVE/ADDMANY split once on the first comma,
/// DROP/CLEAR take the whole payload as the name.
pub fn decode_payload(op: OpCode, payload: &str) -> Result<DecodedOp, ReplicationError> {
    match op {
        OpCode::Add => {
            let (name, value) = split_name_and_value(payload)?;
            Ok(DecodedOp::Add {
                name: name.to_string(),
                value,
            })
        }
        OpCode::Remove => {
            let (name, value) = split_name_and_value(payload)?;
            Ok(DecodedOp::Remove {
                name: name.to_string(),
                value,
            })
        }
        OpCode::AddMany => {
            let (name, rest) = payload
                .split_once(',')
                .ok_or(ReplicationError::MalformedPayload)?;
            let values = rest
                .split(',')
                .map(|v| v.parse::<u32>())
                .collect::<Result<Vec<u32>, _>>()
                .map_err(|_| ReplicationError::MalformedPayload)?;
            Ok(DecodedOp::AddMany {
                name: name.to_string(),
                values,
            })
        }
        OpCode::Drop => Ok(DecodedOp::Drop {
            name: payload.to_string(),
        }),
        OpCode::Clear => Ok(DecodedOp::Clear {
            name: payload.to_string(),
        }),
    }
}

fn split_name_and_value(payload: &str) -> Result<(&str, u32), ReplicationError> {
    let (name, value_str) = payload
        .split_once(',')
        .ok_or(ReplicationError::MalformedPayload)?;
    let value = value_str
        .parse::<u32>()
        .map_err(|_| ReplicationError::MalformedPayload)?;
    Ok((name, value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_add() {
        let frame = encode(OpCode::Add, "n,1");
        let (op, payload) = decode(&frame).unwrap();
        assert_eq!(op, OpCode::Add);
        assert_eq!(payload, "n,1");
    }

    #[test]
    fn rejects_truncated_frame() {
        let frame = encode(OpCode::Add, "n,1");
        assert!(decode(&frame[..frame.len() - 1]).is_err());
    }

    #[test]
    fn rejects_unsupported_version() {
        let mut frame = encode(OpCode::Add, "n,1");
        frame[0] = 0xFF;
        assert!(matches!(
            decode(&frame),
            Err(ReplicationError::UnsupportedFormatVersion(0xFF))
        ));
    }

    #[test]
    fn rejects_unknown_op_byte() {
        let mut frame = encode(OpCode::Add, "n,1");
        frame[1] = 0xFF;
        assert!(matches!(
            decode(&frame),
            Err(ReplicationError::UnrecognizedOpCode(0xFF))
        ));
    }

    #[test]
    fn decodes_add_payload() {
        let decoded = decode_payload(OpCode::Add, "n,42").unwrap();
        assert_eq!(
            decoded,
            DecodedOp::Add {
                name: "n".to_string(),
                value: 42
            }
        );
    }

    #[test]
    fn decodes_add_many_payload_with_first_comma_only_split() {
        let decoded = decode_payload(OpCode::AddMany, "n,1,2,3").unwrap();
        assert_eq!(
            decoded,
            DecodedOp::AddMany {
                name: "n".to_string(),
                values: vec![1, 2, 3]
            }
        );
    }

    #[test]
    fn decodes_drop_and_clear_as_bare_name() {
        assert_eq!(
            decode_payload(OpCode::Drop, "n").unwrap(),
            DecodedOp::Drop { name: "n".to_string() }
        );
        assert_eq!(
            decode_payload(OpCode::Clear, "n").unwrap(),
            DecodedOp::Clear { name: "n".to_string() }
        );
    }

    #[test]
    fn rejects_add_with_no_comma() {
        assert!(decode_payload(OpCode::Add, "justname").is_err());
    }

    #[test]
    fn rejects_add_with_non_numeric_value() {
        assert!(decode_payload(OpCode::Add, "n,notanumber").is_err());
    }
}
