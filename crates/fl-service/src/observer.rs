//! Transaction observer trait for auditing and progress reporting.

use fl_core::{NodeId, TransactionId};

use crate::TransactionOutcome;

/// Callbacks invoked by [`JobScheduler`][crate::JobScheduler] as
/// transactions move through their lifecycle.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example — audit log
///
/// ```rust,ignore
/// struct Audit(Vec<String>);
///
/// impl TransactionObserver for Audit {
///     fn on_committed(&mut self, id: TransactionId, node: Option<NodeId>) {
///         self.0.push(format!("{id} committed ({node:?})"));
///     }
/// }
/// ```
pub trait TransactionObserver {
    /// Called once a plan has been accepted by the schedule and its locks
    /// taken, before the outcome is returned to the caller.
    fn on_proposed(&mut self, _outcome: &TransactionOutcome) {}

    /// Called after a commit.  `node` is `Some` for a single-node commit.
    fn on_committed(&mut self, _id: TransactionId, _node: Option<NodeId>) {}

    /// Called after an abort.  `node` is `Some` for a single-node abort.
    fn on_aborted(&mut self, _id: TransactionId, _node: Option<NodeId>) {}
}

/// A [`TransactionObserver`] that does nothing.
pub struct NoopObserver;

impl TransactionObserver for NoopObserver {}
