//! Backend hint bit sets.
//!
//! Flags are advisory: a backend that ignores every bit must still behave
//! identically to one that honors all of them. The bit layout below is a
//! wire compatibility surface and must not be renumbered.

use std::ops::BitOr;

/// Hints passed to read operations (`Database::get`, `multi_get`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReadFlags(u32);

impl ReadFlags {
    pub const NONE: ReadFlags = ReadFlags(0);
    pub const CACHE_MISS_HINT: ReadFlags = ReadFlags(1);
    pub const READ_AHEAD: ReadFlags = ReadFlags(2);
    pub const READ_AHEAD_STRONGER: ReadFlags = ReadFlags(4);
    pub const READ_AHEAD_STRONGEST: ReadFlags = ReadFlags(8);
    pub const SKIP_DUPLICATE_READ: ReadFlags = ReadFlags(16);

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn from_bits(bits: u32) -> Self {
        ReadFlags(bits)
    }

    /// Subset test: `self` contains every bit set in `other`.
    pub const fn contains(self, other: ReadFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for ReadFlags {
    type Output = ReadFlags;

    fn bitor(self, rhs: ReadFlags) -> ReadFlags {
        ReadFlags(self.0 | rhs.0)
    }
}

/// Hints passed to write operations (`Database::put`, `delete`, `merge`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriteFlags(u32);

impl WriteFlags {
    pub const NONE: WriteFlags = WriteFlags(0);
    pub const LOW_PRIORITY: WriteFlags = WriteFlags(1);
    pub const DISABLE_WAL: WriteFlags = WriteFlags(2);

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn from_bits(bits: u32) -> Self {
        WriteFlags(bits)
    }

    pub const fn contains(self, other: WriteFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for WriteFlags {
    type Output = WriteFlags;

    fn bitor(self, rhs: WriteFlags) -> WriteFlags {
        WriteFlags(self.0 | rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_flags_or_is_union() {
        let combo = ReadFlags::READ_AHEAD | ReadFlags::SKIP_DUPLICATE_READ;
        assert_eq!(combo.bits(), 2 | 16);
        assert!(combo.contains(ReadFlags::READ_AHEAD));
        assert!(combo.contains(ReadFlags::SKIP_DUPLICATE_READ));
        assert!(!combo.contains(ReadFlags::READ_AHEAD_STRONGER));
    }

    #[test]
    fn write_flags_subset() {
        let both = WriteFlags::LOW_PRIORITY | WriteFlags::DISABLE_WAL;
        assert!(both.contains(WriteFlags::LOW_PRIORITY));
        assert!(!WriteFlags::LOW_PRIORITY.contains(WriteFlags::DISABLE_WAL));
    }
}
