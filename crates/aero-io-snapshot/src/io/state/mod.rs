//! Deterministic snapshot encoding for emulated chipset devices.
//!
//! The snapshot format uses a small tag-length-value (TLV) encoding to provide:
//! - deterministic byte output (fields are emitted in ascending tag order)
//! - forward compatibility (unknown tags are skipped on load)
//! - explicit versioning (major/minor) at both format and device level

pub mod codec;
mod version;

pub use version::{
    SnapshotError, SnapshotHeader, SnapshotReader, SnapshotResult, SnapshotVersion,
    SnapshotWriter, SNAPSHOT_FORMAT_VERSION, SNAPSHOT_MAGIC,
};

/// Snapshotting contract for emulated I/O devices.
///
/// `DEVICE_ID` must stay stable forever. Within a major version, only add new TLV fields.
pub trait IoSnapshot {
    const DEVICE_ID: [u8; 4];
    const DEVICE_VERSION: SnapshotVersion;

    fn save_state(&self) -> Vec<u8>;
    fn load_state(&mut self, bytes: &[u8]) -> SnapshotResult<()>;
}
