//! # IDs
//! Strokes and layers need identities that survive being cloned into history snapshots and restored again.
//! This is implemented in this module via the `Id<T>` type, which generates unique IDs namespaced by the type T.
//! Order of IDs is not guaranteed.
//!
//! To get a process unique ID, simply use `Id<YourNamespaceTy>`'s `Default` impl.

// Collection of pending IDs by type.
// A RWLock'd BTreeMap from typeID to next available Id
static ID_SERVER: parking_lot::RwLock<
    std::collections::BTreeMap<std::any::TypeId, std::sync::atomic::AtomicU64>,
> = parking_lot::const_rwlock(std::collections::BTreeMap::new());

/// ID that is guarunteed unique within this execution of the program.
/// IDs with different types may share a value but should not be considered equal.
pub struct Id<T: std::any::Any> {
    id: std::num::NonZeroU64,
    // Namespace marker
    _phantom: std::marker::PhantomData<fn() -> T>,
}
impl<T: std::any::Any> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T: std::any::Any> Copy for Id<T> {}
impl<T: std::any::Any> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        // Namespace already checked at compile time.
        self.id == other.id
    }
}
impl<T: std::any::Any> Eq for Id<T> {}
impl<T: std::any::Any> std::hash::Hash for Id<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T: std::any::Any> Id<T> {
    /// Get the raw numeric value of this ID.
    /// IDs from differing namespaces may share the same numeric ID!
    #[must_use]
    pub fn get(&self) -> u64 {
        self.id.get()
    }
    /// Allocate a fresh ID from the namespace of `T`.
    ///
    /// Exhausting all `u64::MAX - 1` IDs of a namespace terminates the process, as uniqueness
    /// could no longer be upheld.
    #[must_use]
    pub fn next() -> Self {
        let ty = std::any::TypeId::of::<T>();
        // ID of zero is invalid, start at one and go up.
        let id = {
            let read = ID_SERVER.upgradable_read();
            if let Some(atomic) = read.get(&ty) {
                atomic.fetch_add(1, std::sync::atomic::Ordering::Relaxed)
            } else {
                // First allocation of this namespace, transition to exclusive access.
                let mut write = parking_lot::RwLockUpgradableReadGuard::upgrade(read);
                write.insert(ty, 2.into());
                1
            }
        };

        let Some(id) = std::num::NonZeroU64::new(id) else {
            #[cfg(not(test))]
            {
                log::error!("{} ID overflow! Aborting!", std::any::type_name::<T>());
                log::logger().flush();
                std::process::abort();
            }
            #[cfg(test)]
            {
                panic!("{} ID overflow! Aborting!", std::any::type_name::<T>())
            }
        };
        Self {
            id,
            _phantom: std::marker::PhantomData,
        }
    }
}
impl<T: std::any::Any> Default for Id<T> {
    fn default() -> Self {
        Self::next()
    }
}
impl<T: std::any::Any> std::fmt::Display for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Strip generics and module path. Both splits yield at least one element, even for empty strings.
        let name = std::any::type_name::<T>()
            .split('<')
            .next()
            .unwrap_or_default()
            .rsplit("::")
            .next()
            .unwrap_or_default();
        write!(f, "{name}#{}", self.id)
    }
}
impl<T: std::any::Any> std::fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        <Self as std::fmt::Display>::fmt(self, f)
    }
}

#[cfg(test)]
mod test {
    use super::Id;
    // Tests share the global server, so each uses its own namespace.

    #[test]
    fn first_id_is_one() {
        struct Namespace;
        let id = Id::<Namespace>::default();
        // Not a stable guarantee! Dont rely on this outside of tests.
        assert_eq!(id.get(), 1);
    }
    #[test]
    fn ids_unique() {
        struct Namespace;
        let mut v: Vec<_> = (0..1024).map(|_| Id::<Namespace>::next().get()).collect();
        let length_before = v.len();
        v.sort_unstable();
        v.dedup();
        assert_eq!(length_before, v.len(), "had duplicate ids");
    }
    #[test]
    fn display_is_namespaced() {
        struct Marker;
        let id = Id::<Marker>::next();
        assert_eq!(id.to_string(), "Marker#1");
    }
}
