//! Typed identifier newtypes backed by unsigned integers.
//!
//! The head unit hands out small numeric ids. Zero is never assigned and
//! stands for "absent" when a message lacks the field.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[doc = $doc:expr])* $name:ident($repr:ty)) => {
        $(#[doc = $doc])*
        #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name($repr);

        impl $name {
            /// Wrap a raw value.
            #[must_use]
            pub const fn new(raw: $repr) -> Self {
                Self(raw)
            }

            /// Access the raw value.
            #[must_use]
            pub const fn get(self) -> $repr {
                self.0
            }

            /// `true` for the zero value, which never identifies anything.
            #[must_use]
            pub const fn is_unset(self) -> bool {
                self.0 == 0
            }
        }

        impl From<$repr> for $name {
            fn from(raw: $repr) -> Self {
                Self(raw)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse().map(Self)
            }
        }
    };
}

define_id!(
    /// Stable identifier of a registered [`Application`](crate::application::Application).
    AppId(u32)
);

define_id!(
    /// Identifier the HMI uses for an application, assigned before registration.
    HmiAppId(u32)
);

define_id!(
    /// Opaque token tying an activation request to its single response.
    CorrelationId(u32)
);

define_id!(
    /// Handle of the companion device an application runs on.
    DeviceHandle(u64)
);
