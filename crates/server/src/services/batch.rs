//! Partial-success bookkeeping for id-list operations.
//!
//! Batches run item by item. Items that pass are committed immediately and
//! are never rolled back; refused items are remembered by their 1-based
//! position in the request and reported together at the end.

use crate::authz::AuthzError;
use crate::services::ServiceError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    label: &'static str,
    failed: Vec<usize>,
}

impl BatchOutcome {
    #[must_use]
    pub const fn new(label: &'static str) -> Self {
        Self {
            label,
            failed: Vec::new(),
        }
    }

    /// Record that the item at 1-based `position` was refused.
    pub fn record_failure(&mut self, position: usize) {
        self.failed.push(position);
    }

    /// 1-based positions of refused items, in request order.
    #[must_use]
    pub fn failed(&self) -> &[usize] {
        &self.failed
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// `"<Label> Deleted Except entry no. 1, 3"`.
    #[must_use]
    pub fn message(&self) -> String {
        let positions = self
            .failed
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        format!("{} Deleted Except entry no. {positions}", self.label)
    }

    /// `Ok` when every item went through, otherwise `PartialFailure`.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::PartialFailure` carrying this outcome if any
    /// item was refused.
    pub fn into_result(self) -> Result<(), ServiceError> {
        combine([self])
    }
}

/// Report several batches run by one request together.
///
/// # Errors
///
/// Returns `ServiceError::PartialFailure` listing every outcome that had a
/// refused item.
pub fn combine(outcomes: impl IntoIterator<Item = BatchOutcome>) -> Result<(), ServiceError> {
    let failed: Vec<_> = outcomes
        .into_iter()
        .filter(|outcome| !outcome.is_complete())
        .collect();
    if failed.is_empty() {
        Ok(())
    } else {
        Err(ServiceError::PartialFailure(failed))
    }
}

/// Classify one item's authorization result: `Ok(true)` if it was refused,
/// `Ok(false)` if allowed. Storage errors abort the whole batch.
pub(crate) fn refused(result: Result<(), AuthzError>) -> Result<bool, ServiceError> {
    match result {
        Ok(()) => Ok(false),
        Err(AuthzError::Denied(denial)) => {
            tracing::debug!(%denial, "Batch item refused");
            Ok(true)
        }
        Err(AuthzError::Store(e)) => Err(e.into()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_batch_is_ok() {
        let outcome = BatchOutcome::new("Admins");
        assert!(outcome.is_complete());
        assert!(outcome.into_result().is_ok());
    }

    #[test]
    fn test_message_lists_positions_in_order() {
        let mut outcome = BatchOutcome::new("Restaurants");
        outcome.record_failure(1);
        outcome.record_failure(3);
        assert_eq!(outcome.failed(), &[1, 3]);
        assert_eq!(
            outcome.message(),
            "Restaurants Deleted Except entry no. 1, 3"
        );
        assert!(matches!(
            outcome.into_result(),
            Err(ServiceError::PartialFailure(_))
        ));
    }

    #[test]
    fn test_combine_keeps_only_failed_batches() {
        let assigned = BatchOutcome::new("Restaurants");
        let mut unassigned = BatchOutcome::new("Restaurants");
        unassigned.record_failure(2);

        let err = combine([assigned, unassigned]).unwrap_err();
        assert_eq!(err.to_string(), "Restaurants Deleted Except entry no. 2");
        assert!(combine([BatchOutcome::new("Owners")]).is_ok());
    }
}
