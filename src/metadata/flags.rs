use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Sub};

/// Set of metadata kinds to copy, or that were copied.
///
/// Individual flags combine with `|`. The composite constants [`OWNER`],
/// [`TIMES`], [`STAT`] and [`ALL`] cover the usual groupings.
///
/// [`OWNER`]: MetadataFlags::OWNER
/// [`TIMES`]: MetadataFlags::TIMES
/// [`STAT`]: MetadataFlags::STAT
/// [`ALL`]: MetadataFlags::ALL
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct MetadataFlags {
    bits: u32,
}

impl MetadataFlags {
    const fn new(bits: u32) -> Self {
        Self { bits }
    }

    /// No metadata.
    pub const EMPTY: Self = Self::new(0);
    /// Owning user.
    pub const USER: Self = Self::new(0x01);
    /// Owning group.
    pub const GROUP: Self = Self::new(0x02);
    /// Permission bits.
    pub const MODE: Self = Self::new(0x04);
    /// Modification time.
    pub const MTIME: Self = Self::new(0x08);
    /// Access time.
    pub const ATIME: Self = Self::new(0x10);
    /// Extended attributes.
    pub const XATTR: Self = Self::new(0x20);
    /// Access control lists.
    pub const ACL: Self = Self::new(0x40);
    /// File capabilities.
    pub const CAP: Self = Self::new(0x80);

    /// User and group.
    pub const OWNER: Self = Self::USER.union(Self::GROUP);
    /// Both timestamps.
    pub const TIMES: Self = Self::MTIME.union(Self::ATIME);
    /// Everything stored in the inode: owner, mode and timestamps.
    pub const STAT: Self = Self::OWNER.union(Self::MODE).union(Self::TIMES);
    /// Every kind of metadata.
    pub const ALL: Self = Self::STAT
        .union(Self::XATTR)
        .union(Self::ACL)
        .union(Self::CAP);

    const NAMES: [(Self, &'static str); 8] = [
        (Self::USER, "user"),
        (Self::GROUP, "group"),
        (Self::MODE, "mode"),
        (Self::MTIME, "mtime"),
        (Self::ATIME, "atime"),
        (Self::XATTR, "xattr"),
        (Self::ACL, "acl"),
        (Self::CAP, "cap"),
    ];

    /// Flags from raw bits; unknown bits are dropped.
    #[must_use]
    pub const fn from_bits_truncate(bits: u32) -> Self {
        Self::new(bits & Self::ALL.bits)
    }

    /// The raw bit representation.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.bits
    }

    /// Returns `true` when no flag is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.bits == 0
    }

    /// Checks whether all flags in `other` are set in `self`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        (self.bits & other.bits) == other.bits
    }

    /// Checks whether any flag in `other` is set in `self`.
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        (self.bits & other.bits) != 0
    }

    /// Union of both operands.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self::new(self.bits | other.bits)
    }

    /// Flags common to both operands.
    #[must_use]
    pub const fn intersection(self, other: Self) -> Self {
        Self::new(self.bits & other.bits)
    }

    /// Flags in `self` but not in `other`.
    #[must_use]
    pub const fn difference(self, other: Self) -> Self {
        Self::new(self.bits & !other.bits)
    }

    /// Add the flags in `other`.
    pub fn insert(&mut self, other: Self) {
        self.bits |= other.bits;
    }

    /// Remove the flags in `other`.
    pub fn remove(&mut self, other: Self) {
        self.bits &= !other.bits;
    }

    /// `self`, or `default` when `self` is empty.
    pub(crate) const fn or_default(self, default: Self) -> Self {
        if self.is_empty() { default } else { self }
    }

    /// Names of the individual flags that are set, in bit order.
    pub fn names(self) -> impl Iterator<Item = &'static str> {
        Self::NAMES
            .into_iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .map(|(_, name)| name)
    }
}

impl BitOr for MetadataFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for MetadataFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.insert(rhs);
    }
}

impl BitAnd for MetadataFlags {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        self.intersection(rhs)
    }
}

impl BitAndAssign for MetadataFlags {
    fn bitand_assign(&mut self, rhs: Self) {
        self.bits &= rhs.bits;
    }
}

impl Sub for MetadataFlags {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self.difference(rhs)
    }
}

impl fmt::Debug for MetadataFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MetadataFlags({self})")
    }
}

impl fmt::Display for MetadataFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        for (i, name) in self.names().enumerate() {
            if i > 0 {
                f.write_str("|")?;
            }
            f.write_str(name)?;
        }
        Ok(())
    }
}
