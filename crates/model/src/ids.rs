//! Index handles into the [`crate::Model`] arenas.

use serde::Serialize;
use std::fmt;

/// Common behaviour of arena handles, used by the generic [`crate::Lattice`].
pub trait Handle: Copy + Eq + fmt::Debug + From<usize> {
    fn index(self) -> usize;
}

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(pub(crate) usize);

        impl Handle for $name {
            fn index(self) -> usize {
                self.0
            }
        }

        impl From<usize> for $name {
            fn from(index: usize) -> Self {
                $name(index)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $prefix, self.0)
            }
        }
    };
}

handle!(
    /// A graph (top-level or descriptor).
    GraphId,
    "g"
);
handle!(
    /// A concept node.
    ConceptId,
    "c"
);
handle!(
    /// A relation or actor node.
    RelationId,
    "r"
);
handle!(
    /// A coreference set.
    CorefSetId,
    "s"
);
handle!(
    /// A native marker identity.
    MarkerId,
    "m"
);
handle!(
    /// A concept type in the concept-type lattice.
    TypeId,
    "t"
);
handle!(
    /// A relation type in the relation-type lattice.
    RelationTypeId,
    "rt"
);
