//! N-ary and pairwise set algebra over a [`Namespace`].
//!
//! Every operation gathers its operand handles under one registry read-lock
//! acquisition, releases the lock, then does the actual computation against
//! per-set read locks (see `bitset-core`'s parallel `and_many`/`or_many`).
//! `*_store` variants compute the result before taking the registry write
//! lock to publish it, so a destination that aliases a source observes the
//! sources as they were before the store, per the spec's aliasing rule.

use bitset_core::Set;

use crate::error::EngineError;
use crate::registry::Namespace;

impl Namespace {
    /// Parallel intersection of every named set. Returns an empty sequence,
    /// without touching any state, if any name is unbound.
    pub fn inter(&self, names: &[&str]) -> Result<Vec<u32>, EngineError> {
        if names.is_empty() {
            return Err(EngineError::EmptyOperandList);
        }
        match self.resolve_all_or_none(names) {
            None => Ok(Vec::new()),
            Some(handles) => {
                let guards: Vec<_> = handles.iter().map(|h| h.read()).collect();
                let refs: Vec<&Set> = guards.iter().map(|g| &**g).collect();
                Ok(bitset_core::and_many(&refs).to_sorted_sequence())
            }
        }
    }

    /// Intersection of every named set, bound to `dst`. Returns `0` without
    /// touching `dst` if any source name is unbound.
    pub fn inter_store(&self, dst: &str, names: &[&str]) -> Result<u64, EngineError> {
        if names.is_empty() {
            return Err(EngineError::EmptyOperandList);
        }
        match self.resolve_all_or_none(names) {
            None => Ok(0),
            Some(handles) => {
                let result = {
                    let guards: Vec<_> = handles.iter().map(|h| h.read()).collect();
                    let refs: Vec<&Set> = guards.iter().map(|g| &**g).collect();
                    bitset_core::and_many(&refs)
                };
                let card = result.cardinality();
                self.publish(dst, result);
                Ok(card)
            }
        }
    }

    /// Parallel union of every named set; unbound names contribute nothing.
    pub fn union(&self, names: &[&str]) -> Vec<u32> {
        let handles = self.resolve_present(names);
        let guards: Vec<_> = handles.iter().map(|h| h.read()).collect();
        let refs: Vec<&Set> = guards.iter().map(|g| &**g).collect();
        bitset_core::or_many(&refs).to_sorted_sequence()
    }

    /// Union of every named set, bound to `dst`.
    pub fn union_store(&self, dst: &str, names: &[&str]) -> u64 {
        let handles = self.resolve_present(names);
        let result = {
            let guards: Vec<_> = handles.iter().map(|h| h.read()).collect();
            let refs: Vec<&Set> = guards.iter().map(|g| &**g).collect();
            bitset_core::or_many(&refs)
        };
        let card = result.cardinality();
        self.publish(dst, result);
        card
    }

    /// Symmetric difference of the two named sets; an unbound name is
    /// treated as empty.
    pub fn xor(&self, a: &str, b: &str) -> Vec<u32> {
        let sa = self.get_or_empty(a);
        let sb = self.get_or_empty(b);
        bitset_core::xor(&sa, &sb).to_sorted_sequence()
    }

    /// Symmetric difference of the two named sets, bound to `dst`.
    pub fn xor_store(&self, dst: &str, a: &str, b: &str) -> u64 {
        let sa = self.get_or_empty(a);
        let sb = self.get_or_empty(b);
        let result = bitset_core::xor(&sa, &sb);
        let card = result.cardinality();
        self.publish(dst, result);
        card
    }

    /// `a \ b`. A missing `a` yields empty; a missing `b` yields `a` as-is.
    pub fn diff(&self, a: &str, b: &str) -> Vec<u32> {
        let sa = self.get_or_empty(a);
        let sb = self.get_or_empty(b);
        bitset_core::and_not(&sa, &sb).to_sorted_sequence()
    }

    /// `a \ b`, bound to `dst`.
    pub fn diff_store(&self, dst: &str, a: &str, b: &str) -> u64 {
        let sa = self.get_or_empty(a);
        let sb = self.get_or_empty(b);
        let result = bitset_core::and_not(&sa, &sb);
        let card = result.cardinality();
        self.publish(dst, result);
        card
    }
}
