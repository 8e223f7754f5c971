//! Little-endian length-prefixed primitives shared by the on-disk formats.
//!
//! `data.db`, `metadata.db`, and `chunks/chunk_metadata.db` are all flat
//! sequences of these fields; the layouts are part of the public contract,
//! so they are written by hand rather than through a serialization crate.

use std::io::{self, Read, Write};

pub fn write_u8<W: Write>(w: &mut W, v: u8) -> io::Result<()> {
    w.write_all(&[v])
}

pub fn write_u32<W: Write>(w: &mut W, v: u32) -> io::Result<()> {
    w.write_all(&v.to_le_bytes())
}

pub fn write_u64<W: Write>(w: &mut W, v: u64) -> io::Result<()> {
    w.write_all(&v.to_le_bytes())
}

pub fn write_f64<W: Write>(w: &mut W, v: f64) -> io::Result<()> {
    w.write_all(&v.to_le_bytes())
}

/// `<u32 len><bytes>`.
pub fn write_bytes<W: Write>(w: &mut W, v: &[u8]) -> io::Result<()> {
    write_u32(w, v.len() as u32)?;
    w.write_all(v)
}

/// `<u32 len><utf8 bytes>`.
pub fn write_str<W: Write>(w: &mut W, v: &str) -> io::Result<()> {
    write_bytes(w, v.as_bytes())
}

pub fn read_u8<R: Read>(r: &mut R) -> io::Result<u8> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)?;
    Ok(buf[0])
}

pub fn read_u32<R: Read>(r: &mut R) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

pub fn read_u64<R: Read>(r: &mut R) -> io::Result<u64> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

pub fn read_f64<R: Read>(r: &mut R) -> io::Result<f64> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(f64::from_le_bytes(buf))
}

/// Inverse of [`write_bytes`].
pub fn read_bytes<R: Read>(r: &mut R) -> io::Result<Vec<u8>> {
    let len = read_u32(r)? as usize;
    let mut buf = vec![0u8; len];
    r.read_exact(&mut buf)?;
    Ok(buf)
}

/// Inverse of [`write_str`]. Invalid UTF-8 is reported as `InvalidData`.
pub fn read_str<R: Read>(r: &mut R) -> io::Result<String> {
    let bytes = read_bytes(r)?;
    String::from_utf8(bytes)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("non-utf8 key: {e}")))
}
