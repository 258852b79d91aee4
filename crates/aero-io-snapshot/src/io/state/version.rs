use std::collections::BTreeMap;

use thiserror::Error;

/// Leading magic of every device snapshot blob.
pub const SNAPSHOT_MAGIC: [u8; 4] = *b"AERO";

/// Version of the container format itself (not of any particular device).
pub const SNAPSHOT_FORMAT_VERSION: SnapshotVersion = SnapshotVersion::new(1, 0);

// magic + format version + device id + device version
const HEADER_LEN: usize = 4 + 4 + 4 + 4;
const FIELD_HEADER_LEN: usize = 2 + 4;

pub type SnapshotResult<T> = Result<T, SnapshotError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("snapshot truncated")]
    UnexpectedEof,

    #[error("invalid snapshot magic")]
    InvalidMagic,

    #[error("unsupported snapshot format version {0}.{1}")]
    UnsupportedFormatVersion(u16, u16),

    #[error("device id mismatch: expected {expected:?}, found {found:?}")]
    DeviceIdMismatch { expected: [u8; 4], found: [u8; 4] },

    #[error("unsupported device major version {found} (supported: {supported})")]
    UnsupportedDeviceMajorVersion { found: u16, supported: u16 },

    #[error("duplicate field tag {0}")]
    DuplicateFieldTag(u16),

    #[error("invalid field encoding: {0}")]
    InvalidFieldEncoding(&'static str),

    #[error("corrupt snapshot: {0}")]
    Corrupt(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SnapshotVersion {
    pub major: u16,
    pub minor: u16,
}

impl SnapshotVersion {
    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotHeader {
    pub format_version: SnapshotVersion,
    pub device_id: [u8; 4],
    pub device_version: SnapshotVersion,
}

/// Builds a snapshot blob. Fields may be added in any order; output is sorted by tag.
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    device_id: [u8; 4],
    device_version: SnapshotVersion,
    fields: BTreeMap<u16, Vec<u8>>,
}

impl SnapshotWriter {
    pub fn new(device_id: [u8; 4], device_version: SnapshotVersion) -> Self {
        Self {
            device_id,
            device_version,
            fields: BTreeMap::new(),
        }
    }

    /// Adds a raw field. Writing the same tag twice keeps the last value.
    pub fn field_bytes(&mut self, tag: u16, bytes: Vec<u8>) {
        self.fields.insert(tag, bytes);
    }

    pub fn field_u8(&mut self, tag: u16, v: u8) {
        self.field_bytes(tag, vec![v]);
    }

    pub fn field_u16(&mut self, tag: u16, v: u16) {
        self.field_bytes(tag, v.to_le_bytes().to_vec());
    }

    pub fn field_u32(&mut self, tag: u16, v: u32) {
        self.field_bytes(tag, v.to_le_bytes().to_vec());
    }

    pub fn field_u64(&mut self, tag: u16, v: u64) {
        self.field_bytes(tag, v.to_le_bytes().to_vec());
    }

    pub fn field_bool(&mut self, tag: u16, v: bool) {
        self.field_u8(tag, u8::from(v));
    }

    pub fn finish(self) -> Vec<u8> {
        let body: usize = self
            .fields
            .values()
            .map(|v| FIELD_HEADER_LEN + v.len())
            .sum();
        let mut out = Vec::with_capacity(HEADER_LEN + body);
        out.extend_from_slice(&SNAPSHOT_MAGIC);
        out.extend_from_slice(&SNAPSHOT_FORMAT_VERSION.major.to_le_bytes());
        out.extend_from_slice(&SNAPSHOT_FORMAT_VERSION.minor.to_le_bytes());
        out.extend_from_slice(&self.device_id);
        out.extend_from_slice(&self.device_version.major.to_le_bytes());
        out.extend_from_slice(&self.device_version.minor.to_le_bytes());
        for (tag, value) in self.fields {
            out.extend_from_slice(&tag.to_le_bytes());
            out.extend_from_slice(&(value.len() as u32).to_le_bytes());
            out.extend_from_slice(&value);
        }
        out
    }
}

/// Parsed view over a snapshot blob produced by [`SnapshotWriter`].
#[derive(Debug, Clone)]
pub struct SnapshotReader<'a> {
    header: SnapshotHeader,
    fields: BTreeMap<u16, &'a [u8]>,
}

fn le_u16(bytes: &[u8], at: usize) -> SnapshotResult<u16> {
    bytes
        .get(at..at + 2)
        .map(|b| u16::from_le_bytes([b[0], b[1]]))
        .ok_or(SnapshotError::UnexpectedEof)
}

fn le_u32(bytes: &[u8], at: usize) -> SnapshotResult<u32> {
    bytes
        .get(at..at + 4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .ok_or(SnapshotError::UnexpectedEof)
}

impl<'a> SnapshotReader<'a> {
    pub fn parse(bytes: &'a [u8], expected_device_id: [u8; 4]) -> SnapshotResult<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(SnapshotError::UnexpectedEof);
        }
        if bytes[0..4] != SNAPSHOT_MAGIC {
            return Err(SnapshotError::InvalidMagic);
        }
        let format_version = SnapshotVersion::new(le_u16(bytes, 4)?, le_u16(bytes, 6)?);
        if format_version.major != SNAPSHOT_FORMAT_VERSION.major {
            return Err(SnapshotError::UnsupportedFormatVersion(
                format_version.major,
                format_version.minor,
            ));
        }
        let mut device_id = [0u8; 4];
        device_id.copy_from_slice(&bytes[8..12]);
        if device_id != expected_device_id {
            return Err(SnapshotError::DeviceIdMismatch {
                expected: expected_device_id,
                found: device_id,
            });
        }
        let device_version = SnapshotVersion::new(le_u16(bytes, 12)?, le_u16(bytes, 14)?);

        let mut fields = BTreeMap::new();
        let mut off = HEADER_LEN;
        while off < bytes.len() {
            let tag = le_u16(bytes, off)?;
            let len = le_u32(bytes, off + 2)? as usize;
            let start = off + FIELD_HEADER_LEN;
            let end = start
                .checked_add(len)
                .ok_or(SnapshotError::Corrupt("field length overflow"))?;
            let value = bytes.get(start..end).ok_or(SnapshotError::UnexpectedEof)?;
            if fields.insert(tag, value).is_some() {
                return Err(SnapshotError::DuplicateFieldTag(tag));
            }
            off = end;
        }

        Ok(Self {
            header: SnapshotHeader {
                format_version,
                device_id,
                device_version,
            },
            fields,
        })
    }

    pub fn header(&self) -> SnapshotHeader {
        self.header
    }

    pub fn ensure_device_major(&self, supported: u16) -> SnapshotResult<()> {
        if self.header.device_version.major != supported {
            return Err(SnapshotError::UnsupportedDeviceMajorVersion {
                found: self.header.device_version.major,
                supported,
            });
        }
        Ok(())
    }

    pub fn bytes(&self, tag: u16) -> Option<&'a [u8]> {
        self.fields.get(&tag).copied()
    }

    fn fixed<const N: usize>(&self, tag: u16, what: &'static str) -> SnapshotResult<Option<[u8; N]>> {
        match self.bytes(tag) {
            None => Ok(None),
            Some(b) => b
                .try_into()
                .map(Some)
                .map_err(|_| SnapshotError::InvalidFieldEncoding(what)),
        }
    }

    pub fn u8(&self, tag: u16) -> SnapshotResult<Option<u8>> {
        Ok(self.fixed::<1>(tag, "u8")?.map(|b| b[0]))
    }

    pub fn u16(&self, tag: u16) -> SnapshotResult<Option<u16>> {
        Ok(self.fixed::<2>(tag, "u16")?.map(u16::from_le_bytes))
    }

    pub fn u32(&self, tag: u16) -> SnapshotResult<Option<u32>> {
        Ok(self.fixed::<4>(tag, "u32")?.map(u32::from_le_bytes))
    }

    pub fn u64(&self, tag: u16) -> SnapshotResult<Option<u64>> {
        Ok(self.fixed::<8>(tag, "u64")?.map(u64::from_le_bytes))
    }

    pub fn bool(&self, tag: u16) -> SnapshotResult<Option<bool>> {
        match self.u8(tag)? {
            None => Ok(None),
            Some(0) => Ok(Some(false)),
            Some(1) => Ok(Some(true)),
            Some(_) => Err(SnapshotError::InvalidFieldEncoding("bool")),
        }
    }
}
