use anyhow::{Result, bail};
use bincode::config;
use serde::{Serialize, de::DeserializeOwned};
use std::io::{Read, Write};

/// Upper bound on a single frame. A full batch is 1 MiB of estimated record
/// size; the rest is headroom for keys and encoding overhead.
pub const MAX_FRAME_LEN: usize = 8 * 1024 * 1024;

/// Read a single length-prefixed bincode message from `reader`.
///
/// Wire format:
///   - 4-byte big-endian length (u32)
///   - that many bytes of bincode payload
pub fn read_message<R, T>(reader: &mut R) -> Result<T>
where
    R: Read,
    T: DeserializeOwned,
{
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf)?;
    let len = u32::from_be_bytes(len_buf) as usize;

    if len > MAX_FRAME_LEN {
        bail!("frame of {len} bytes exceeds limit of {MAX_FRAME_LEN} bytes");
    }

    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf)?;

    let (msg, _bytes_read): (T, usize) =
        bincode::serde::decode_from_slice(&buf, config::standard())?;
    Ok(msg)
}

/// Write a single length-prefixed bincode message to `writer`.
pub fn write_message<W, T>(writer: &mut W, msg: &T) -> Result<()>
where
    W: Write,
    T: Serialize,
{
    let bytes = bincode::serde::encode_to_vec(msg, config::standard())?;
    if bytes.len() > MAX_FRAME_LEN {
        bail!(
            "message of {} bytes exceeds frame limit of {MAX_FRAME_LEN} bytes",
            bytes.len()
        );
    }
    let len = bytes.len() as u32;

    writer.write_all(&len.to_be_bytes())?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
