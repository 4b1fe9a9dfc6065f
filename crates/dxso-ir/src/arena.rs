//! Append-only interned storage with typed handles.
//!
//! Subobjects never hold borrowed strings or byte buffers. Every piece of
//! variable-length data is copied into one of the stores below, and the
//! subobject keeps a [`Handle`] to it. Stores have no removal operation, so
//! a handle stays valid for as long as the store that produced it.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ops::Index;

use crate::error::SubobjectError;

/// A typed handle into a [`StringInterner`] or [`BlobStore`].
///
/// Handles are only meaningful for the store that produced them.
pub struct Handle<T: ?Sized> {
    index: u32,
    _phantom: PhantomData<T>,
}

/// Handle to an interned string.
pub type Symbol = Handle<str>;

/// Handle to a stored byte buffer.
pub type BlobHandle = Handle<[u8]>;

impl<T: ?Sized> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for Handle<T> {}

impl<T: ?Sized> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<T: ?Sized> Eq for Handle<T> {}

impl<T: ?Sized> PartialOrd for Handle<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: ?Sized> Ord for Handle<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.index.cmp(&other.index)
    }
}

impl<T: ?Sized> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl<T: ?Sized> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.index)
    }
}

impl<T: ?Sized> Handle<T> {
    pub(crate) fn new(index: u32) -> Self {
        Self {
            index,
            _phantom: PhantomData,
        }
    }

    /// Returns the zero-based index of this handle.
    pub fn index(self) -> usize {
        self.index as usize
    }
}

fn next_index(len: usize) -> u32 {
    u32::try_from(len)
        .unwrap_or_else(|_| panic!("store overflow: {len} items exceeds u32::MAX"))
}

/// Deduplicating string storage.
///
/// Interning equal content twice returns the same [`Symbol`].
#[derive(Clone, Debug, Default)]
pub struct StringInterner {
    data: Vec<Box<str>>,
    map: HashMap<Box<str>, u32>,
}

impl StringInterner {
    /// Creates an empty interner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of distinct strings stored.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if nothing has been interned yet.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Interns `value`, copying it only if equal content was never seen.
    pub fn intern(&mut self, value: &str) -> Symbol {
        if let Some(&index) = self.map.get(value) {
            return Handle::new(index);
        }
        let index = next_index(self.data.len());
        self.map.insert(Box::from(value), index);
        self.data.push(Box::from(value));
        Handle::new(index)
    }

    /// Looks up `value` without interning it.
    pub fn get(&self, value: &str) -> Option<Symbol> {
        self.map.get(value).map(|&index| Handle::new(index))
    }

    /// Returns the string for `handle` if it belongs to this interner.
    pub fn try_resolve(&self, handle: Symbol) -> Option<&str> {
        self.data.get(handle.index()).map(|s| &**s)
    }
}

impl Index<Symbol> for StringInterner {
    type Output = str;

    fn index(&self, handle: Symbol) -> &str {
        &self.data[handle.index()]
    }
}

/// Owned copies of caller-supplied byte buffers, keyed by source address.
///
/// Deduplication is by the address of the caller's buffer, never by its
/// content. Interning the same address again returns the earlier copy even
/// if the bytes behind it changed in between, and two distinct buffers with
/// identical bytes are stored twice. Callers must not recycle a buffer
/// address for different content while the store is alive.
///
/// All empty slices share one dangling address, so every empty buffer maps
/// to the same (empty) copy.
///
/// Copies made with [`BlobStore::insert_copy`] are never registered under a
/// source address and are never returned by [`BlobStore::intern`].
#[derive(Clone, Debug)]
pub struct BlobStore {
    data: Vec<Box<[u8]>>,
    by_source: HashMap<usize, u32>,
    limit: usize,
}

impl Default for BlobStore {
    fn default() -> Self {
        Self::with_limit(crate::registry::MAX_BLOB_LEN)
    }
}

impl BlobStore {
    /// Creates an empty store using the default size ceiling.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store that rejects buffers of `limit` bytes or more.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            data: Vec::new(),
            by_source: HashMap::new(),
            limit,
        }
    }

    /// Returns the exclusive size ceiling.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Returns the number of stored buffers.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if nothing has been stored yet.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the handle previously stored for `bytes`' address, if any.
    pub fn get(&self, bytes: &[u8]) -> Option<BlobHandle> {
        self.by_source
            .get(&source_address(bytes))
            .map(|&index| Handle::new(index))
    }

    /// Checks that `bytes` could be stored, without storing it.
    pub fn check(&self, bytes: &[u8]) -> Result<(), SubobjectError> {
        if self.get(bytes).is_some() {
            Ok(())
        } else {
            self.check_len(bytes.len())
        }
    }

    /// Checks `len` against the size ceiling.
    pub fn check_len(&self, len: usize) -> Result<(), SubobjectError> {
        if len < self.limit {
            Ok(())
        } else {
            Err(SubobjectError::SizeExceeded {
                len,
                limit: self.limit,
            })
        }
    }

    /// Stores a copy of `bytes`, or returns the copy made for the same
    /// source address earlier.
    pub fn intern(&mut self, bytes: &[u8]) -> Result<BlobHandle, SubobjectError> {
        let source = source_address(bytes);
        if let Some(&index) = self.by_source.get(&source) {
            log::trace!("blob at {source:#x} already stored as [{index}]");
            return Ok(Handle::new(index));
        }
        self.check(bytes)?;
        let index = next_index(self.data.len());
        self.data.push(Box::from(bytes));
        self.by_source.insert(source, index);
        Ok(Handle::new(index))
    }

    /// Stores a fresh copy of `bytes` without keying it by address.
    ///
    /// Used for buffers owned by another store, whose addresses may be
    /// reused once that store is dropped.
    pub fn insert_copy(&mut self, bytes: &[u8]) -> Result<BlobHandle, SubobjectError> {
        self.check_len(bytes.len())?;
        let index = next_index(self.data.len());
        self.data.push(Box::from(bytes));
        Ok(Handle::new(index))
    }

    /// Returns the stored bytes for `handle` if it belongs to this store.
    pub fn try_resolve(&self, handle: BlobHandle) -> Option<&[u8]> {
        self.data.get(handle.index()).map(|b| &**b)
    }
}

impl Index<BlobHandle> for BlobStore {
    type Output = [u8];

    fn index(&self, handle: BlobHandle) -> &[u8] {
        &self.data[handle.index()]
    }
}

fn source_address(bytes: &[u8]) -> usize {
    bytes.as_ptr() as usize
}
