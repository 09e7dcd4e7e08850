use std::cmp::Ordering;
use std::fmt::{Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use uuid::Uuid;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AssetId(Uuid);

impl AssetId {
    pub fn new() -> Self {
        AssetId(Uuid::new_v4())
    }

    pub const fn from_uuid(uuid: Uuid) -> Self {
        AssetId(uuid)
    }

    pub const fn uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for AssetId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for AssetId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// Typed handle into the [`AssetDatabase`](crate::AssetDatabase).
///
/// A handle is only an id; it never keeps the asset alive and has to be resolved
/// through the database every time the asset is needed.
pub struct H<T> {
    id: AssetId,
    _marker: PhantomData<fn() -> T>,
}

impl<T> H<T> {
    pub const fn new(id: AssetId) -> Self {
        H {
            id,
            _marker: PhantomData,
        }
    }

    pub const fn id(&self) -> AssetId {
        self.id
    }
}

impl<T> Clone for H<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for H<T> {}

impl<T> PartialEq for H<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for H<T> {}

impl<T> PartialOrd for H<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for H<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl<T> Hash for H<T> {
    fn hash<S: Hasher>(&self, state: &mut S) {
        self.id.hash(state);
    }
}

impl<T> Debug for H<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = std::any::type_name::<T>().rsplit("::").next().unwrap_or("?");
        write!(f, "H<{name}>({})", self.id)
    }
}

impl<T> From<H<T>> for AssetId {
    fn from(handle: H<T>) -> Self {
        handle.id
    }
}
