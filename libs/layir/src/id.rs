use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

/// A typed identifier, allocated in increasing order by the owning collection.
///
/// The type parameter only tags what the identifier refers to, so an
/// instance ID can never be passed where a cell ID is expected.
#[derive(Serialize, Deserialize)]
pub struct Id<T>(u64, PhantomData<fn() -> T>);

impl<T> Id<T> {
    pub(crate) fn new() -> Self {
        Self(0, PhantomData)
    }

    /// Advances the counter and returns the new identifier.
    pub(crate) fn alloc(&mut self) -> Self {
        self.0 += 1;
        *self
    }

    /// The raw allocation index.
    #[inline]
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Id<T> {}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T> Eq for Id<T> {}

impl<T> PartialOrd for Id<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Id<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl<T> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.0)
    }
}
