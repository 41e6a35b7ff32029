use std::sync::Arc;

use super::operation::Operation;
use crate::auth::{Slot, TokenStore};

/// Stamps the current access token onto outgoing operations.
#[derive(Clone)]
pub struct RequestAugmenter {
    store: Arc<dyn TokenStore>,
}

impl RequestAugmenter {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self { store }
    }

    pub fn augment(&self, mut op: Operation) -> Operation {
        if let Some(token) = self.store.get(Slot::Access) {
            op.set_bearer(&token);
        }
        op
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryTokenStore;

    #[test]
    fn test_adds_bearer_when_token_present() {
        let store = Arc::new(MemoryTokenStore::new());
        store.set(Slot::Access, "tok".to_string()).unwrap();
        let augmenter = RequestAugmenter::new(store);

        let op = augmenter.augment(Operation::get("/draft"));
        assert_eq!(op.bearer(), Some("tok"));
    }

    #[test]
    fn test_leaves_operation_untouched_without_token() {
        let augmenter = RequestAugmenter::new(Arc::new(MemoryTokenStore::new()));

        let op = augmenter.augment(Operation::get("/ideas").with_header("Accept", "application/json"));
        assert_eq!(op.bearer(), None);
        assert_eq!(op.headers.len(), 1);
        assert!(!op.is_retried());
    }
}
