//! Contracts between the consensus crates and their collaborators

use crate::errors::StoreResult;
use crate::header::StoredHeader;
use crate::Hash;
use std::sync::Arc;

/// Read access to accepted headers.
///
/// Implementations return owned snapshots and must tolerate concurrent
/// readers. A missing header is reported as `StoreError::NotFound`.
pub trait HeaderStoreReader: Send + Sync {
    fn get_header(&self, hash: &Hash) -> StoreResult<StoredHeader>;

    fn has_header(&self, hash: &Hash) -> StoreResult<bool> {
        match self.get_header(hash) {
            Ok(_) => Ok(true),
            Err(crate::errors::StoreError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

impl<T: HeaderStoreReader + ?Sized> HeaderStoreReader for Arc<T> {
    fn get_header(&self, hash: &Hash) -> StoreResult<StoredHeader> {
        (**self).get_header(hash)
    }

    fn has_header(&self, hash: &Hash) -> StoreResult<bool> {
        (**self).has_header(hash)
    }
}

impl<T: HeaderStoreReader + ?Sized> HeaderStoreReader for &T {
    fn get_header(&self, hash: &Hash) -> StoreResult<StoredHeader> {
        (**self).get_header(hash)
    }

    fn has_header(&self, hash: &Hash) -> StoreResult<bool> {
        (**self).has_header(hash)
    }
}
