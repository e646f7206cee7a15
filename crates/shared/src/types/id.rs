//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `LoanId` where an `AccountId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

typed_id!(MemberId, "Unique identifier for a member (borrower).");
typed_id!(LoanId, "Unique identifier for a loan.");
typed_id!(LoanProductId, "Unique identifier for a loan product.");
typed_id!(
    InterestProductId,
    "Unique identifier for an interest product (rate + period type)."
);
typed_id!(AccountId, "Unique identifier for a funding account.");
typed_id!(DisbursementId, "Unique identifier for a loan disbursement.");
typed_id!(RepaymentId, "Unique identifier for a loan repayment.");
typed_id!(
    TransactionId,
    "Unique identifier for an account ledger transaction."
);
typed_id!(UserId, "Opaque identifier for the user performing an action.");
