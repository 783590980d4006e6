//! Namespace registry: the name-to-set mapping and its mutation entry points.
//!
//! Two locks are in play, never held across each other's critical section:
//! the registry lock below guards the `HashMap` itself (creating, dropping,
//! or overwriting a binding); each set's own lock (inside the `Arc<RwLock<Set>>`
//! handle) guards that one set's contents. A caller crosses from the first to
//! the second only after releasing the first.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;

use bitset_core::Set;

/// The mutating operations a [`Namespace`] can apply, as seen by a write
/// interceptor. Mirrors the log entry tag in the replication wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpCode {
    Add,
    AddMany,
    Remove,
    Drop,
    Clear,
}

/// The single interposition point for replicated writes.
///
/// When installed on a [`Namespace`], every mutation invoked with
/// `via_log = true` is routed here instead of being applied locally. The
/// sink is expected to eventually cause the same operation to be re-applied
/// with `via_log = false` once it has been totally ordered (see
/// `bitset-replication`'s `ApplyLoop`).
pub trait WriteSink: Send + Sync {
    /// Hand an encoded mutation to the sink instead of applying it locally.
    fn propose(&self, op: OpCode, payload: &str);
}

/// A thread-safe mapping from name to compressed set.
///
/// Cloning a `Namespace` is cheap: all clones share the same underlying
/// registry and sink (this mirrors `airssys-rt`'s `ActorRegistry::clone`,
/// which shares its routing table via `Arc` rather than deep-copying it).
#[derive(Clone)]
pub struct Namespace {
    inner: Arc<NamespaceInner>,
}

struct NamespaceInner {
    sets: RwLock<HashMap<String, Arc<RwLock<Set>>>>,
    sink: RwLock<Option<Arc<dyn WriteSink>>>,
    snapshot_path: RwLock<Option<PathBuf>>,
}

impl Default for Namespace {
    fn default() -> Self {
        Self::new()
    }
}

impl Namespace {
    /// Create an empty namespace with no write sink and no snapshot path
    /// configured.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(NamespaceInner {
                sets: RwLock::new(HashMap::new()),
                sink: RwLock::new(None),
                snapshot_path: RwLock::new(None),
            }),
        }
    }

    /// Configure the file path `save`/`restore` use when called with no
    /// explicit stream. Overwrites whatever path was previously configured.
    pub fn configure_snapshot_path(&self, path: impl Into<PathBuf>) {
        *self.inner.snapshot_path.write() = Some(path.into());
    }

    pub(crate) fn snapshot_path(&self) -> Option<PathBuf> {
        self.inner.snapshot_path.read().clone()
    }

    /// Install the replication interception point.
    ///
    /// Must be called before the first mutation; installing a second sink,
    /// or installing one concurrently with in-flight mutations, is a caller
    /// bug caught only in debug builds (matching the source, which never
    /// validated this either).
    pub fn install_sink(&self, sink: Arc<dyn WriteSink>) {
        let mut guard = self.inner.sink.write();
        debug_assert!(guard.is_none(), "install_sink called more than once");
        *guard = Some(sink);
    }

    fn sink(&self) -> Option<Arc<dyn WriteSink>> {
        self.inner.sink.read().clone()
    }

    /// Look up an existing binding without creating one.
    pub(crate) fn get(&self, name: &str) -> Option<Arc<RwLock<Set>>> {
        self.inner.sets.read().get(name).cloned()
    }

    /// Look up a binding, cloning its current contents, or the empty set if
    /// the name is unbound. Used by algebra operations that treat a missing
    /// operand as empty.
    pub(crate) fn get_or_empty(&self, name: &str) -> Set {
        self.get(name)
            .map(|handle| handle.read().clone())
            .unwrap_or_default()
    }

    /// Resolve every present name in `names`, silently skipping names that
    /// are not bound (the "missing is empty" contract for union/xor/diff).
    pub(crate) fn resolve_present(&self, names: &[&str]) -> Vec<Arc<RwLock<Set>>> {
        let sets = self.inner.sets.read();
        names.iter().filter_map(|n| sets.get(*n).cloned()).collect()
    }

    /// Resolve every name in `names`, returning `None` as soon as one is
    /// missing (the "missing aborts" contract for intersection).
    pub(crate) fn resolve_all_or_none(&self, names: &[&str]) -> Option<Vec<Arc<RwLock<Set>>>> {
        let sets = self.inner.sets.read();
        let mut handles = Vec::with_capacity(names.len());
        for name in names {
            handles.push(sets.get(*name)?.clone());
        }
        Some(handles)
    }

    /// Bind `name` to `set`, overwriting whatever was previously bound.
    pub(crate) fn publish(&self, name: &str, set: Set) {
        self.inner
            .sets
            .write()
            .insert(name.to_string(), Arc::new(RwLock::new(set)));
    }

    /// Replace the entire name-to-set mapping in one write-lock acquisition.
    /// Used by snapshot restore, which must be all-or-nothing from the
    /// registry's point of view even though entries are decoded one at a
    /// time from the stream.
    pub(crate) fn replace_all(&self, sets: HashMap<String, Arc<RwLock<Set>>>) {
        *self.inner.sets.write() = sets;
    }

    fn get_or_create(&self, name: &str) -> Arc<RwLock<Set>> {
        if let Some(existing) = self.get(name) {
            return existing;
        }
        let mut sets = self.inner.sets.write();
        Arc::clone(
            sets.entry(name.to_string())
                .or_insert_with(|| Arc::new(RwLock::new(Set::new()))),
        )
    }

    /// All currently-bound names, in unspecified order. Diagnostic surface;
    /// also used as the key list for a snapshot write.
    pub fn keys(&self) -> Vec<String> {
        self.inner.sets.read().keys().cloned().collect()
    }

    /// Insert `value` into the set named `name`, creating it if absent.
    pub fn add(&self, name: &str, value: u32, via_log: bool) {
        if via_log {
            if let Some(sink) = self.sink() {
                sink.propose(OpCode::Add, &format!("{name},{value}"));
                return;
            }
        }
        self.get_or_create(name).write().add(value);
    }

    /// Insert every value in `values` into the set named `name`, creating it
    /// if absent.
    pub fn add_many(&self, name: &str, values: &[u32], via_log: bool) {
        if via_log {
            if let Some(sink) = self.sink() {
                let mut payload = String::from(name);
                for v in values {
                    payload.push(',');
                    payload.push_str(&v.to_string());
                }
                sink.propose(OpCode::AddMany, &payload);
                return;
            }
        }
        self.get_or_create(name).write().add_many(values);
    }

    /// Remove `value` from the set named `name`, creating it (empty, still
    /// lacking `value`) if absent.
    pub fn remove(&self, name: &str, value: u32, via_log: bool) {
        if via_log {
            if let Some(sink) = self.sink() {
                sink.propose(OpCode::Remove, &format!("{name},{value}"));
                return;
            }
        }
        self.get_or_create(name).write().remove(value);
    }

    /// Remove the name-to-set binding entirely. No-op if `name` is unbound.
    pub fn drop(&self, name: &str, via_log: bool) {
        if via_log {
            if let Some(sink) = self.sink() {
                sink.propose(OpCode::Drop, name);
                return;
            }
        }
        self.inner.sets.write().remove(name);
    }

    /// Empty the set named `name` in place. No-op (does not create) if
    /// `name` is unbound.
    pub fn clear(&self, name: &str, via_log: bool) {
        if via_log {
            if let Some(sink) = self.sink() {
                sink.propose(OpCode::Clear, name);
                return;
            }
        }
        if let Some(set) = self.get(name) {
            set.write().clear();
        }
    }

    /// `true` if `value` is a member of the set named `name`; `false` if
    /// `name` is unbound.
    pub fn contains(&self, name: &str, value: u32) -> bool {
        self.get(name)
            .map(|set| set.read().contains(value))
            .unwrap_or(false)
    }

    /// Cardinality of the set named `name`; `0` if `name` is unbound.
    pub fn cardinality(&self, name: &str) -> u64 {
        self.get(name).map(|set| set.read().cardinality()).unwrap_or(0)
    }

    /// Container-level stats for the set named `name`; a zero record if
    /// `name` is unbound.
    pub fn stats(&self, name: &str) -> bitset_core::Stats {
        self.get(name)
            .map(|set| set.read().stats())
            .unwrap_or_default()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[test]
    fn auto_vivifies_on_add() {
        let ns = Namespace::new();
        ns.add("a", 1, false);
        assert!(ns.contains("a", 1));
        assert_eq!(ns.cardinality("a"), 1);
    }

    #[test]
    fn add_then_remove_clears_membership() {
        let ns = Namespace::new();
        ns.add("a", 1, false);
        ns.remove("a", 1, false);
        assert!(!ns.contains("a", 1));
    }

    #[test]
    fn add_is_idempotent() {
        let ns = Namespace::new();
        ns.add("a", 1, false);
        ns.add("a", 1, false);
        assert_eq!(ns.cardinality("a"), 1);
    }

    #[test]
    fn clear_on_missing_name_is_noop_and_does_not_create() {
        let ns = Namespace::new();
        ns.clear("ghost", false);
        assert!(!ns.keys().contains(&"ghost".to_string()));
    }

    #[test]
    fn drop_on_missing_name_is_noop() {
        let ns = Namespace::new();
        ns.drop("ghost", false);
        assert_eq!(ns.keys().len(), 0);
    }

    #[test]
    fn drop_removes_binding() {
        let ns = Namespace::new();
        ns.add("a", 1, false);
        ns.drop("a", false);
        assert_eq!(ns.cardinality("a"), 0);
        assert!(!ns.keys().contains(&"a".to_string()));
    }

    #[test]
    fn contains_on_missing_name_is_false() {
        let ns = Namespace::new();
        assert!(!ns.contains("ghost", 1));
    }

    #[test]
    fn stats_on_missing_name_is_zero_record() {
        let ns = Namespace::new();
        assert_eq!(ns.stats("ghost"), bitset_core::Stats::default());
    }

    struct RecordingSink {
        calls: Mutex<Vec<(OpCode, String)>>,
        count: AtomicUsize,
    }

    impl WriteSink for RecordingSink {
        fn propose(&self, op: OpCode, payload: &str) {
            self.count.fetch_add(1, Ordering::SeqCst);
            self.calls.lock().unwrap().push((op, payload.to_string()));
        }
    }

    #[test]
    fn via_log_true_with_sink_does_not_mutate_locally() {
        let ns = Namespace::new();
        let sink = Arc::new(RecordingSink {
            calls: Mutex::new(Vec::new()),
            count: AtomicUsize::new(0),
        });
        ns.install_sink(sink.clone());

        ns.add("a", 1, true);

        assert_eq!(sink.count.load(Ordering::SeqCst), 1);
        assert!(!ns.contains("a", 1));
        assert_eq!(
            sink.calls.lock().unwrap()[0],
            (OpCode::Add, "a,1".to_string())
        );
    }

    #[test]
    fn via_log_false_bypasses_sink_even_when_installed() {
        let ns = Namespace::new();
        let sink = Arc::new(RecordingSink {
            calls: Mutex::new(Vec::new()),
            count: AtomicUsize::new(0),
        });
        ns.install_sink(sink.clone());

        ns.add("a", 1, false);

        assert_eq!(sink.count.load(Ordering::SeqCst), 0);
        assert!(ns.contains("a", 1));
    }

    #[test]
    fn add_many_payload_packs_values_after_name() {
        let ns = Namespace::new();
        let sink = Arc::new(RecordingSink {
            calls: Mutex::new(Vec::new()),
            count: AtomicUsize::new(0),
        });
        ns.install_sink(sink.clone());

        ns.add_many("a", &[1, 2, 3], true);

        assert_eq!(
            sink.calls.lock().unwrap()[0],
            (OpCode::AddMany, "a,1,2,3".to_string())
        );
    }

    #[test]
    fn namespace_clone_shares_state() {
        let ns = Namespace::new();
        let ns2 = ns.clone();
        ns.add("a", 1, false);
        assert!(ns2.contains("a", 1));
    }
}
