//! Transport framing (§6): each frame is a 4-byte big-endian length prefix followed by
//! exactly that many payload bytes; zero-length payloads are legal. `send_frame`/
//! `recv_frame` operate over any `std::io::Write`/`Read`, so the same code path is
//! exercised by an in-memory `Cursor<Vec<u8>>` in tests and by a real stream in the
//! shell (the socket implementation itself is out of scope, §1).

use std::io::{self, Read, Write};

/// Writes `payload` as one frame: a 4-byte big-endian length prefix followed by the
/// payload bytes.
pub fn send_frame<W: Write>(writer: &mut W, payload: &[u8]) -> io::Result<()> {
    let len = u32::try_from(payload.len()).map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "frame too large"))?;
    writer.write_all(&len.to_be_bytes())?;
    writer.write_all(payload)?;
    Ok(())
}

/// Reads one frame. Returns `Ok(None)` when the stream is cleanly closed exactly at a
/// frame boundary (no partial length prefix pending); any other I/O failure -
/// including a stream that closes mid-frame - propagates as an error so earlier,
/// already-read frames are never silently dropped.
pub fn recv_frame<R: Read>(reader: &mut R) -> io::Result<Option<Vec<u8>>> {
    let mut len_bytes = [0u8; 4];
    match reader.read_exact(&mut len_bytes) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(err) => return Err(err),
    }
    let len = u32::from_be_bytes(len_bytes) as usize;
    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload)?;
    Ok(Some(payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn zero_length_payload_round_trips() {
        let mut buffer = Vec::new();
        send_frame(&mut buffer, &[]).unwrap();
        let mut cursor = Cursor::new(buffer);
        let frame = recv_frame(&mut cursor).unwrap();
        assert_eq!(frame, Some(Vec::new()));
    }

    #[test]
    fn multiple_frames_are_read_back_in_order() {
        let mut buffer = Vec::new();
        send_frame(&mut buffer, b"first").unwrap();
        send_frame(&mut buffer, b"second").unwrap();
        let mut cursor = Cursor::new(buffer);
        assert_eq!(recv_frame(&mut cursor).unwrap(), Some(b"first".to_vec()));
        assert_eq!(recv_frame(&mut cursor).unwrap(), Some(b"second".to_vec()));
        assert_eq!(recv_frame(&mut cursor).unwrap(), None);
    }

    #[test]
    fn closing_mid_frame_fails_without_losing_earlier_frames() {
        let mut buffer = Vec::new();
        send_frame(&mut buffer, b"complete").unwrap();
        // A truncated second frame: length prefix claims 10 bytes, only 2 are present.
        buffer.extend_from_slice(&10u32.to_be_bytes());
        buffer.extend_from_slice(b"ab");

        let mut cursor = Cursor::new(buffer);
        assert_eq!(recv_frame(&mut cursor).unwrap(), Some(b"complete".to_vec()));
        assert!(recv_frame(&mut cursor).is_err());
    }
}
