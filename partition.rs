//! Logical partition names.
//!
//! A closed table-name enumeration, except each partition carries its own
//! wire string rather than sharing a single `snake_case` spelling
//! convention: this enum's wire form is a compatibility surface with
//! external storage/tooling and mixes `snake_case` and `camelCase`
//! spellings on purpose. Keep them bit-exact.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The closed set of well-known logical partitions this storage core knows
/// how to name. Domain layers are free to register additional handles with a
/// [`Provider`](crate::Provider) under any of these names; the core itself
/// does not interpret the bytes stored under any partition.
///
/// `Serialize`/`Deserialize` go through the same wire strings as
/// [`PartitionName::wire_name`] (config files naming a partition should see
/// the identical spelling other tooling does), not the derived variant name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PartitionName {
    #[serde(rename = "state")]
    State,
    #[serde(rename = "storage")]
    Storage,
    #[serde(rename = "code")]
    Code,
    #[serde(rename = "blocks")]
    Blocks,
    #[serde(rename = "headers")]
    Headers,
    #[serde(rename = "blockNumbers")]
    BlockNumbers,
    #[serde(rename = "receipts")]
    Receipts,
    #[serde(rename = "blockInfos")]
    BlockInfos,
    #[serde(rename = "badBlocks")]
    BadBlocks,
    #[serde(rename = "bloom")]
    Bloom,
    #[serde(rename = "metadata")]
    Metadata,
    #[serde(rename = "blobTransactions")]
    BlobTransactions,
    #[serde(rename = "discoveryNodes")]
    DiscoveryNodes,
    #[serde(rename = "discoveryV5Nodes")]
    DiscoveryV5Nodes,
    #[serde(rename = "peers")]
    Peers,
}

impl PartitionName {
    pub const ALL: [PartitionName; 15] = [
        PartitionName::State,
        PartitionName::Storage,
        PartitionName::Code,
        PartitionName::Blocks,
        PartitionName::Headers,
        PartitionName::BlockNumbers,
        PartitionName::Receipts,
        PartitionName::BlockInfos,
        PartitionName::BadBlocks,
        PartitionName::Bloom,
        PartitionName::Metadata,
        PartitionName::BlobTransactions,
        PartitionName::DiscoveryNodes,
        PartitionName::DiscoveryV5Nodes,
        PartitionName::Peers,
    ];

    /// The canonical wire string for this partition. Bit-exact external
    /// compatibility surface — do not change spellings.
    pub const fn wire_name(self) -> &'static str {
        match self {
            PartitionName::State => "state",
            PartitionName::Storage => "storage",
            PartitionName::Code => "code",
            PartitionName::Blocks => "blocks",
            PartitionName::Headers => "headers",
            PartitionName::BlockNumbers => "blockNumbers",
            PartitionName::Receipts => "receipts",
            PartitionName::BlockInfos => "blockInfos",
            PartitionName::BadBlocks => "badBlocks",
            PartitionName::Bloom => "bloom",
            PartitionName::Metadata => "metadata",
            PartitionName::BlobTransactions => "blobTransactions",
            PartitionName::DiscoveryNodes => "discoveryNodes",
            PartitionName::DiscoveryV5Nodes => "discoveryV5Nodes",
            PartitionName::Peers => "peers",
        }
    }

    /// The ordinal used to index enum-indexed-array structures such as
    /// [`Provider`](crate::Provider).
    pub const fn ordinal(self) -> usize {
        self as usize
    }
}

impl fmt::Display for PartitionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl TryFrom<&str> for PartitionName {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        PartitionName::ALL
            .into_iter()
            .find(|p| p.wire_name() == value)
            .ok_or_else(|| format!("unknown partition wire name: {value}"))
    }
}
