//! Strongly typed, zero-cost identifier wrappers.
//!
//! `NodeId` and `JobId` are `Copy + Ord + Hash` so they can be used as map
//! keys and sorted collection elements without ceremony.  Node and job ids
//! are chosen by the caller (they come from specifications), so unlike
//! storage indices they are not required to be dense.
//!
//! `TransactionId` is minted by the scheduler facade and wraps a random
//! UUID; callers only ever echo it back.

use std::fmt;

use uuid::Uuid;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Raw integer value.
            #[inline(always)]
            pub fn get(self) -> $inner {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$inner> for $name {
            #[inline(always)]
            fn from(n: $inner) -> $name {
                $name(n)
            }
        }
    };
}

typed_id! {
    /// Identifier of a mobile agent ("node").
    pub struct NodeId(u32);
}

typed_id! {
    /// Identifier of a job.  Assigned by the caller in the job specification.
    pub struct JobId(u64);
}

/// Externally visible handle pairing a caller with one outstanding
/// alternative.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransactionId(pub Uuid);

impl TransactionId {
    /// Mint a fresh random id.
    pub fn new_random() -> Self {
        TransactionId(Uuid::new_v4())
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tx-{}", self.0.simple())
    }
}
