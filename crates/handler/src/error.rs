//! Errors that abort a whole execution.

/// Failure of [`Evm::transact_call`](crate::Evm::transact_call) or
/// [`Evm::transact_create`](crate::Evm::transact_create).
///
/// Frame-level failures are not errors; they are reported through
/// [`ExecutionResult`](crate::ExecutionResult).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvmError<DBError> {
    /// The database behind the journal failed. The execution's state changes are discarded.
    #[error("database error: {0}")]
    Database(DBError),
}
