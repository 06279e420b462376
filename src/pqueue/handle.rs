//! Identity and liveness machinery shared by the binary and binomial heaps.
//!
//! A node's [`Identity`] is bound at insertion and stays with its logical
//! element across every structural change the owning queue makes to itself,
//! until the element is extracted or the queue is cleared. A [`Handle`]
//! carries its identity alongside a clone of the queue's *live set* — the
//! set of identities currently present in the queue. Checking membership in
//! that shared set answers both "is the owning queue still alive" (clear
//! and destruction empty it) and "was this particular node extracted"
//! (extraction removes just its identity) with one mechanism. Because
//! identities are never reused, a live set can simply be cleared in place
//! on `clear()` rather than replaced: no handle can ever observe a stale
//! identity that has since been reassigned to a different element.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{Error, Result};

pub(crate) type Identity = u64;

/// Hands out strictly increasing node identities for one queue instance.
pub(crate) struct IdentityGenerator(AtomicU64);

impl IdentityGenerator {
    pub(crate) fn new() -> Self {
        IdentityGenerator(AtomicU64::new(0))
    }

    pub(crate) fn next(&self) -> Identity {
        self.0.fetch_add(1, Ordering::Relaxed)
    }
}

/// The set of identities currently live in one queue instance, shared with
/// every handle that queue has issued.
#[derive(Clone)]
pub(crate) struct LiveSet(Arc<Mutex<HashSet<Identity>>>);

impl LiveSet {
    pub(crate) fn new() -> Self {
        LiveSet(Arc::new(Mutex::new(HashSet::new())))
    }

    pub(crate) fn insert(&self, id: Identity) {
        self.0.lock().unwrap().insert(id);
    }

    pub(crate) fn remove(&self, id: Identity) {
        self.0.lock().unwrap().remove(&id);
    }

    pub(crate) fn contains(&self, id: Identity) -> bool {
        self.0.lock().unwrap().contains(&id)
    }

    /// Invalidates every handle issued so far, for `clear()` and `Drop`.
    pub(crate) fn clear(&self) {
        self.0.lock().unwrap().clear();
    }

    fn is_same_queue_as(&self, other: &LiveSet) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn handle_for(&self, id: Identity) -> Handle {
        Handle {
            identity: id,
            live: self.clone(),
        }
    }

    pub(crate) fn check(&self, handle: &Handle) -> Result<()> {
        if !handle.live.is_same_queue_as(self) {
            return Err(Error::InvalidHandle);
        }
        if !self.contains(handle.identity) {
            return Err(Error::InvalidHandle);
        }
        Ok(())
    }
}

/// A detachable reference to a node in a priority queue.
///
/// A handle is never an owner: dropping it does not remove the node, and
/// removing the node does not make the handle itself unsafe to hold or
/// query — only [`Handle::is_valid`] and queue operations that dereference
/// it start reporting/returning [`Error::InvalidHandle`].
#[derive(Clone)]
pub struct Handle {
    pub(crate) identity: Identity,
    live: LiveSet,
}

impl Handle {
    /// True iff the owning queue is still alive (has not been cleared or
    /// dropped) and this handle's node has not itself been extracted.
    pub fn is_valid(&self) -> bool {
        self.live.contains(self.identity)
    }
}
