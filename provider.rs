//! Registry from logical partition name to a database handle.

use crate::error::StoreError;
use crate::partition::PartitionName;

/// An allocation-free-at-lookup map keyed by [`PartitionName`], backed by a
/// fixed-size array indexed by the partition's ordinal.
#[derive(Debug)]
pub struct Provider<D> {
    slots: [Option<D>; PartitionName::ALL.len()],
}

impl<D> Provider<D> {
    pub fn new() -> Self {
        Provider {
            slots: std::array::from_fn(|_| None),
        }
    }

    pub fn register(&mut self, name: PartitionName, db: D) {
        self.slots[name.ordinal()] = Some(db);
    }

    pub fn get(&self, name: PartitionName) -> Result<&D, StoreError> {
        self.get_opt(name).ok_or(StoreError::NotRegistered(name))
    }

    pub fn get_opt(&self, name: PartitionName) -> Option<&D> {
        self.slots[name.ordinal()].as_ref()
    }

    pub fn contains(&self, name: PartitionName) -> bool {
        self.slots[name.ordinal()].is_some()
    }
}

impl<D> Default for Provider<D> {
    fn default() -> Self {
        Provider::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_then_get_round_trips() {
        let mut provider: Provider<u32> = Provider::new();
        provider.register(PartitionName::Code, 42);
        assert_eq!(*provider.get(PartitionName::Code).unwrap(), 42);
        assert!(provider.contains(PartitionName::Code));
    }

    #[test]
    fn unregistered_partition_errors() {
        let provider: Provider<u32> = Provider::new();
        assert!(matches!(
            provider.get(PartitionName::Peers),
            Err(StoreError::NotRegistered(PartitionName::Peers))
        ));
        assert!(provider.get_opt(PartitionName::Peers).is_none());
        assert!(!provider.contains(PartitionName::Peers));
    }

    #[test]
    fn re_registering_replaces_the_previous_handle() {
        let mut provider: Provider<u32> = Provider::new();
        provider.register(PartitionName::Code, 1);
        provider.register(PartitionName::Code, 2);
        assert_eq!(*provider.get(PartitionName::Code).unwrap(), 2);
    }
}
