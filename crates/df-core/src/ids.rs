//! Store-issued identifiers.

use core::fmt;
use core::num::NonZeroU32;

/// Untyped id shared by every entity kind.
///
/// Holds `index + 1`, so `Option<Id>` costs nothing extra.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Id(NonZeroU32);

impl Id {
    pub fn from_index(index: u32) -> Self {
        Self(NonZeroU32::MIN.saturating_add(index))
    }

    pub fn index(self) -> u32 {
        self.0.get() - 1
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

macro_rules! typed_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(Id);

        impl $name {
            pub fn from_index(index: u32) -> Self {
                Self(Id::from_index(index))
            }

            pub fn index(self) -> u32 {
                self.0.index()
            }

            pub fn raw(self) -> Id {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.index())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.index())
            }
        }
    };
}

typed_id!(
    /// Identifies a node (an expression operator).
    NodeId,
    "node#"
);
typed_id!(
    /// Identifies an inlet port.
    InletId,
    "inlet#"
);
typed_id!(
    /// Identifies an outlet port.
    OutletId,
    "outlet#"
);
typed_id!(
    /// Identifies a link between an outlet and an inlet.
    LinkId,
    "link#"
);

/// Monotonic id allocator. Ids are never reused.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out the next 0-based index.
    pub fn next_index(&mut self) -> u32 {
        let index = self.next;
        self.next += 1;
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_round_trip_index() {
        for i in [0_u32, 1, 2, 42, 10_000] {
            let id = Id::from_index(i);
            assert_eq!(id.index(), i);
        }
    }

    #[test]
    fn option_id_is_small() {
        assert_eq!(
            core::mem::size_of::<Id>(),
            core::mem::size_of::<Option<Id>>()
        );
        assert_eq!(
            core::mem::size_of::<LinkId>(),
            core::mem::size_of::<Option<LinkId>>()
        );
    }

    #[test]
    fn typed_ids_display_with_prefix() {
        assert_eq!(NodeId::from_index(3).to_string(), "node#3");
        assert_eq!(format!("{:?}", InletId::from_index(0)), "inlet#0");
        assert_eq!(OutletId::from_index(7).raw(), Id::from_index(7));
    }

    #[test]
    fn allocator_is_monotonic() {
        let mut alloc = IdAllocator::new();
        assert_eq!(alloc.next_index(), 0);
        assert_eq!(alloc.next_index(), 1);
        assert_eq!(alloc.next_index(), 2);
    }
}
