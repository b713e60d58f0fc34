//! Operation context threaded through every catalog call.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{CatalogError, CatalogResult};

/// Carries cancellation for one logical operation.
///
/// Clones share the same flag: cancelling any clone cancels them all.
/// Backends call [`OpContext::check`] on entry and, for long streaming calls,
/// between items.
#[derive(Clone, Debug, Default)]
pub struct OpContext {
    cancelled: Arc<AtomicBool>,
}

impl OpContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. In-flight and future calls fail with
    /// [`CatalogError::Cancelled`].
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Fail with [`CatalogError::Cancelled`] if cancellation was requested.
    pub fn check(&self) -> CatalogResult<()> {
        if self.is_cancelled() {
            return Err(CatalogError::Cancelled);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_cancellation() {
        let ctx = OpContext::new();
        let other = ctx.clone();
        assert!(ctx.check().is_ok());
        other.cancel();
        assert!(ctx.is_cancelled());
        assert!(matches!(ctx.check(), Err(CatalogError::Cancelled)));
    }
}
