use crate::column::ColumnSet;

/// Columns of the `receipts` partition: the receipt payload itself, plus two
/// secondary-lookup columns keyed differently (by owning transaction, by
/// owning block) so callers can find a receipt without re-deriving its
/// primary key from scratch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReceiptsColumn {
    Default,
    Transactions,
    Blocks,
}

impl ColumnSet for ReceiptsColumn {
    const COUNT: usize = 3;

    fn index(self) -> usize {
        match self {
            ReceiptsColumn::Default => 0,
            ReceiptsColumn::Transactions => 1,
            ReceiptsColumn::Blocks => 2,
        }
    }
}
