//! Little-endian helpers for packing several values into one snapshot field.

use super::{SnapshotError, SnapshotResult};

#[derive(Debug, Default, Clone)]
pub struct Encoder {
    buf: Vec<u8>,
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn u8(mut self, v: u8) -> Self {
        self.buf.push(v);
        self
    }

    pub fn u16(mut self, v: u16) -> Self {
        self.buf.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn u32(mut self, v: u32) -> Self {
        self.buf.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn u64(mut self, v: u64) -> Self {
        self.buf.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn bool(self, v: bool) -> Self {
        self.u8(u8::from(v))
    }

    pub fn bytes(mut self, v: &[u8]) -> Self {
        self.buf.extend_from_slice(v);
        self
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn take<const N: usize>(&mut self) -> SnapshotResult<[u8; N]> {
        let end = self.pos + N;
        let slice = self.buf.get(self.pos..end).ok_or(SnapshotError::UnexpectedEof)?;
        self.pos = end;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        Ok(out)
    }

    pub fn u8(&mut self) -> SnapshotResult<u8> {
        Ok(self.take::<1>()?[0])
    }

    pub fn u16(&mut self) -> SnapshotResult<u16> {
        self.take::<2>().map(u16::from_le_bytes)
    }

    pub fn u32(&mut self) -> SnapshotResult<u32> {
        self.take::<4>().map(u32::from_le_bytes)
    }

    pub fn u64(&mut self) -> SnapshotResult<u64> {
        self.take::<8>().map(u64::from_le_bytes)
    }

    pub fn bool(&mut self) -> SnapshotResult<bool> {
        match self.u8()? {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(SnapshotError::InvalidFieldEncoding("bool")),
        }
    }

    pub fn array<const N: usize>(&mut self) -> SnapshotResult<[u8; N]> {
        self.take::<N>()
    }

    /// Fails if any bytes are left unconsumed.
    pub fn finish(self) -> SnapshotResult<()> {
        if self.pos != self.buf.len() {
            return Err(SnapshotError::InvalidFieldEncoding("trailing bytes"));
        }
        Ok(())
    }
}
