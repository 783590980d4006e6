//! Container-level structural summary of a [`crate::Set`].

use roaring::RoaringBitmap;

/// Per-set structural summary of how the underlying roaring container has
/// laid out its internal containers.
///
/// Mirrors the container library's own `statistics()` output field-for-field
/// so that a client never sees a number this crate invented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub cardinality: u64,
    pub containers: u64,
    pub array_containers: u64,
    pub array_container_bytes: u64,
    pub array_container_values: u64,
    pub bitmap_containers: u64,
    pub bitmap_container_bytes: u64,
    pub bitmap_container_values: u64,
    pub run_containers: u64,
    pub run_container_bytes: u64,
    pub run_container_values: u64,
}

impl Stats {
    pub(crate) fn from_bitmap(bitmap: &RoaringBitmap) -> Self {
        let s = bitmap.statistics();
        Self {
            cardinality: s.cardinality,
            containers: u64::from(s.n_containers),
            array_containers: u64::from(s.n_array_containers),
            array_container_bytes: s.n_bytes_array_containers,
            array_container_values: u64::from(s.n_values_array_containers),
            bitmap_containers: u64::from(s.n_bitset_containers),
            bitmap_container_bytes: s.n_bytes_bitset_containers,
            bitmap_container_values: u64::from(s.n_values_bitset_containers),
            run_containers: u64::from(s.n_run_containers),
            run_container_bytes: s.n_bytes_run_containers,
            run_container_values: u64::from(s.n_values_run_containers),
        }
    }
}
