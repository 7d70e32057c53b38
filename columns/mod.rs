//! Concrete [`ColumnSet`](crate::ColumnSet) enumerations for the domain
//! partitions that actually need more than one column.

mod blob_transactions;
mod receipts;

pub use blob_transactions::BlobTransactionsColumn;
pub use receipts::ReceiptsColumn;
