use anyhow::{bail, Context, Result};
use std::io::{ErrorKind, Read, Write};

/// Largest payload the 2-byte length header can carry. The player reads the
/// header as little-endian u16, so anything bigger is rejected outright
/// rather than silently truncated.
pub const MAX_PAYLOAD_BYTES: usize = u16::MAX as usize;

// Chunk format:
// len_lo u8
// len_hi u8
// payload [len]
pub fn write_chunk(out: &mut impl Write, payload: &[u8]) -> Result<()> {
    if payload.len() > MAX_PAYLOAD_BYTES {
        bail!(
            "chunk payload is {} bytes, larger than the 16-bit length header allows ({})",
            payload.len(),
            MAX_PAYLOAD_BYTES
        );
    }
    let len = payload.len() as u16;
    out.write_all(&len.to_le_bytes())?;
    out.write_all(payload)?;
    Ok(())
}

/// Reads one chunk back from the stream. Returns `None` on a clean end of
/// stream (no header bytes left).
pub fn read_chunk(input: &mut impl Read) -> Result<Option<Vec<u8>>> {
    let mut header = [0u8; 2];
    match input.read_exact(&mut header) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e).context("failed to read chunk header"),
    }
    let len = u16::from_le_bytes(header) as usize;
    let mut payload = vec![0u8; len];
    input
        .read_exact(&mut payload)
        .with_context(|| format!("chunk truncated: expected {} payload bytes", len))?;
    Ok(Some(payload))
}
