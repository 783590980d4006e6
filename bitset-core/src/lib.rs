//! Compressed 32-bit integer set primitive.
//!
//! [`Set`] wraps a [`roaring::RoaringBitmap`] and exposes the narrow contract
//! the rest of the engine needs: point mutation, membership, cardinality, a
//! stable binary form, and the four binary set-algebra operations. The n-ary
//! reductions (`and_many`, `or_many`) run across their inputs with `rayon`
//! rather than folding sequentially, since a namespace's algebra engine calls
//! them on an arbitrary number of operands.

mod error;
mod stats;

pub use error::CoreError;
pub use stats::Stats;

use std::io::{self, Read, Write};

use rayon::prelude::*;
use roaring::RoaringBitmap;

/// A set of distinct 32-bit unsigned integers, backed by a roaring bitmap.
///
/// Iteration order (via [`Set::to_sorted_sequence`]) is always ascending;
/// no other ordering is guaranteed or meaningful.
#[derive(Debug, Clone, Default)]
pub struct Set {
    inner: RoaringBitmap,
}

impl Set {
    /// Create an empty set.
    pub fn new() -> Self {
        Self {
            inner: RoaringBitmap::new(),
        }
    }

    /// Insert a single value. Returns `true` if the value was not already present.
    pub fn add(&mut self, value: u32) -> bool {
        self.inner.insert(value)
    }

    /// Insert every value in `values`. Duplicates (within `values` or already
    /// present) do not increase cardinality.
    pub fn add_many(&mut self, values: &[u32]) {
        self.inner.extend(values.iter().copied());
    }

    /// Remove a single value. Returns `true` if the value was present.
    pub fn remove(&mut self, value: u32) -> bool {
        self.inner.remove(value)
    }

    /// Empty the set in place without destroying the binding that owns it.
    pub fn clear(&mut self) {
        self.inner.clear();
    }

    /// Test membership.
    pub fn contains(&self, value: u32) -> bool {
        self.inner.contains(value)
    }

    /// Number of distinct values currently in the set.
    pub fn cardinality(&self) -> u64 {
        self.inner.len()
    }

    /// `true` if the set holds no values.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Materialize the set's contents as an ascending sequence.
    pub fn to_sorted_sequence(&self) -> Vec<u32> {
        self.inner.iter().collect()
    }

    /// Container-category breakdown for diagnostics (`stats` surface op).
    pub fn stats(&self) -> Stats {
        Stats::from_bitmap(&self.inner)
    }

    /// Serialize the set to `sink` in the roaring bitmap's self-describing
    /// binary form. Returns the number of bytes written.
    pub fn write_to<W: Write>(&self, mut sink: W) -> Result<usize, CoreError> {
        let expected = self.inner.serialized_size();
        self.inner.serialize_into(&mut sink)?;
        Ok(expected)
    }

    /// Deserialize a set previously produced by [`Set::write_to`].
    ///
    /// An EOF before a complete, well-formed container stream has been read
    /// surfaces as [`CoreError::Io`] with [`io::ErrorKind::UnexpectedEof`].
    pub fn read_from<R: Read>(source: R) -> Result<Self, CoreError> {
        let inner = RoaringBitmap::deserialize_from(source)
            .map_err(|e| io::Error::new(io::ErrorKind::UnexpectedEof, e))?;
        Ok(Self { inner })
    }
}

/// Parallel n-ary intersection (AND) of `sets`.
///
/// Returns the empty set when `sets` is empty; callers that must treat an
/// empty operand list as an error (see the namespace-level `inter`) check
/// that before reaching this function.
pub fn and_many(sets: &[&Set]) -> Set {
    let bitmaps: Vec<RoaringBitmap> = sets.iter().map(|s| s.inner.clone()).collect();
    bitmaps
        .into_par_iter()
        .reduce_with(|a, b| a & b)
        .map(|inner| Set { inner })
        .unwrap_or_default()
}

/// Parallel n-ary union (OR) of `sets`.
pub fn or_many(sets: &[&Set]) -> Set {
    let bitmaps: Vec<RoaringBitmap> = sets.iter().map(|s| s.inner.clone()).collect();
    bitmaps
        .into_par_iter()
        .reduce_with(|a, b| a | b)
        .map(|inner| Set { inner })
        .unwrap_or_default()
}

/// Symmetric difference between `a` and `b`.
pub fn xor(a: &Set, b: &Set) -> Set {
    Set {
        inner: &a.inner ^ &b.inner,
    }
}

/// `a \ b`: values present in `a` but not in `b`.
pub fn and_not(a: &Set, b: &Set) -> Set {
    Set {
        inner: &a.inner - &b.inner,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn set_of(values: &[u32]) -> Set {
        let mut s = Set::new();
        s.add_many(values);
        s
    }

    #[test]
    fn add_contains_cardinality() {
        let mut s = Set::new();
        assert!(s.add(42));
        assert!(s.contains(42));
        assert_eq!(s.cardinality(), 1);
    }

    #[test]
    fn add_is_idempotent() {
        let mut s = Set::new();
        s.add(7);
        s.add(7);
        assert_eq!(s.cardinality(), 1);
    }

    #[test]
    fn remove_clears_membership() {
        let mut s = Set::new();
        s.add(7);
        assert!(s.remove(7));
        assert!(!s.contains(7));
        assert_eq!(s.cardinality(), 0);
    }

    #[test]
    fn clear_empties_without_removing_binding() {
        let mut s = set_of(&[1, 2, 3]);
        s.clear();
        assert_eq!(s.cardinality(), 0);
        assert!(s.is_empty());
    }

    #[test]
    fn sorted_sequence_is_ascending() {
        let s = set_of(&[5, 1, 3, 2, 4]);
        assert_eq!(s.to_sorted_sequence(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn inter_of_two() {
        let a = set_of(&[1, 2, 3, 10, 11]);
        let b = set_of(&[1, 2, 3, 20, 21]);
        let got = and_many(&[&a, &b]).to_sorted_sequence();
        assert_eq!(got, vec![1, 2, 3]);
    }

    #[test]
    fn union_of_two() {
        let a = set_of(&[1, 2, 3, 10, 11]);
        let b = set_of(&[1, 2, 3, 20, 21]);
        let got = or_many(&[&a, &b]).to_sorted_sequence();
        assert_eq!(got, vec![1, 2, 3, 10, 11, 20, 21]);
    }

    #[test]
    fn xor_of_two() {
        let a = set_of(&[1, 2, 3, 10, 11]);
        let b = set_of(&[1, 2, 3, 20, 21]);
        assert_eq!(xor(&a, &b).to_sorted_sequence(), vec![10, 11, 20, 21]);
    }

    #[test]
    fn diff_is_asymmetric() {
        let a = set_of(&[1, 2, 3, 10, 11]);
        let b = set_of(&[1, 2, 3, 20, 21]);
        assert_eq!(and_not(&a, &b).to_sorted_sequence(), vec![10, 11]);
        assert_eq!(and_not(&b, &a).to_sorted_sequence(), vec![20, 21]);
    }

    #[test]
    fn xor_self_is_empty() {
        let a = set_of(&[1, 2, 3]);
        assert!(xor(&a, &a).is_empty());
    }

    #[test]
    fn diff_self_is_empty() {
        let a = set_of(&[1, 2, 3]);
        assert!(and_not(&a, &a).is_empty());
    }

    #[test]
    fn and_many_empty_input_is_empty() {
        assert!(and_many(&[]).is_empty());
    }

    #[test]
    fn or_many_empty_input_is_empty() {
        assert!(or_many(&[]).is_empty());
    }

    #[test]
    fn inter_is_commutative() {
        let a = set_of(&[1, 2, 3, 4]);
        let b = set_of(&[2, 3, 4, 5]);
        assert_eq!(
            and_many(&[&a, &b]).to_sorted_sequence(),
            and_many(&[&b, &a]).to_sorted_sequence()
        );
    }

    #[test]
    fn union_is_associative() {
        let a = set_of(&[1, 2]);
        let b = set_of(&[2, 3]);
        let c = set_of(&[3, 4]);
        let left = or_many(&[&or_many(&[&a, &b]), &c]).to_sorted_sequence();
        let right = or_many(&[&a, &b, &c]).to_sorted_sequence();
        assert_eq!(left, right);
    }

    #[test]
    fn round_trip_preserves_contents() {
        let a = set_of(&[1, 2, 3, 1000, 70000, u32::MAX]);
        let mut buf = Vec::new();
        let written = a.write_to(&mut buf).expect("write");
        assert_eq!(written, buf.len());

        let restored = Set::read_from(&buf[..]).expect("read");
        assert_eq!(restored.to_sorted_sequence(), a.to_sorted_sequence());
    }

    #[test]
    fn clone_is_isolated_from_original() {
        let mut a = set_of(&[1, 2, 3]);
        let clone = a.clone();
        a.add(4);
        a.remove(1);
        assert_eq!(clone.to_sorted_sequence(), vec![1, 2, 3]);
        assert_eq!(a.to_sorted_sequence(), vec![2, 3, 4]);
    }

    #[test]
    fn stats_reports_nonzero_cardinality() {
        let s = set_of(&[1, 2, 3]);
        let stats = s.stats();
        assert_eq!(stats.cardinality, 3);
    }

    #[test]
    fn truncated_stream_is_an_error() {
        let a = set_of(&[1, 2, 3, 70000]);
        let mut buf = Vec::new();
        a.write_to(&mut buf).expect("write");
        buf.truncate(buf.len() / 2);
        assert!(Set::read_from(&buf[..]).is_err());
    }
}
