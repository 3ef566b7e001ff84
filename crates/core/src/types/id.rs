//! Newtype IDs for type-safe Discord snowflake references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types (a role ID passed where
//! a message ID is expected is a compile error, not a silent 404).
//!
//! Discord transmits snowflakes as JSON strings, so every ID serializes as a
//! string and deserializes from either a string or an integer.

use core::fmt;

use serde::de::{self, Visitor};
use serde::{Deserializer, Serializer};

/// Macro to define a type-safe snowflake ID wrapper.
///
/// Creates a newtype wrapper around `u64` with:
/// - `Serialize` as a decimal string, `Deserialize` from a string or integer
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `get()`
/// - `From<u64>`, `Into<u64>`, `Display` and `FromStr` implementations
///
/// # Example
///
/// ```rust
/// # use rolebutton_core::define_id;
/// define_id!(RoleId);
/// define_id!(MessageId);
///
/// let role_id = RoleId::new(1);
/// let message_id = MessageId::new(1);
///
/// // These are different types, so this won't compile:
/// // let _: RoleId = message_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u64);

        impl $name {
            /// Create a new ID from a raw snowflake.
            #[must_use]
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// Get the underlying snowflake value.
            #[must_use]
            pub const fn get(&self) -> u64 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::core::num::ParseIntError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                s.trim().parse::<u64>().map(Self)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> ::core::result::Result<S::Ok, S::Error>
            where
                S: ::serde::Serializer,
            {
                $crate::types::id::serialize_snowflake(self.0, serializer)
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::core::result::Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                $crate::types::id::deserialize_snowflake(deserializer).map(Self)
            }
        }
    };
}

// Define standard Discord entity IDs
define_id!(GuildId);
define_id!(ChannelId);
define_id!(MessageId);
define_id!(UserId);
define_id!(RoleId);
define_id!(ApplicationId);
define_id!(InteractionId);
define_id!(EmojiId);

/// Serialize a snowflake as a decimal string.
///
/// # Errors
///
/// Propagates serializer errors.
#[doc(hidden)]
pub fn serialize_snowflake<S: Serializer>(value: u64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&value)
}

/// Deserialize a snowflake from either a decimal string or an integer.
///
/// # Errors
///
/// Returns an error if the value is neither a non-negative integer nor a
/// string containing one.
#[doc(hidden)]
pub fn deserialize_snowflake<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    struct SnowflakeVisitor;

    impl Visitor<'_> for SnowflakeVisitor {
        type Value = u64;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a snowflake as a string or integer")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<u64, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<u64, E> {
            u64::try_from(v).map_err(|_| E::custom("snowflake cannot be negative"))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<u64, E> {
            v.parse::<u64>().map_err(E::custom)
        }
    }

    deserializer.deserialize_any(SnowflakeVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snowflake_serializes_as_string() {
        let id = RoleId::new(800_091_021_852_803_072);
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"800091021852803072\"");
    }

    #[test]
    fn test_snowflake_deserializes_from_string_and_number() {
        let from_str: MessageId = serde_json::from_str("\"42\"").expect("string form");
        let from_num: MessageId = serde_json::from_str("42").expect("number form");
        assert_eq!(from_str, MessageId::new(42));
        assert_eq!(from_num, MessageId::new(42));
    }

    #[test]
    fn test_snowflake_rejects_garbage() {
        assert!(serde_json::from_str::<UserId>("\"abc\"").is_err());
        assert!(serde_json::from_str::<UserId>("-5").is_err());
    }

    #[test]
    fn test_from_str_trims_whitespace() {
        let id: RoleId = " 1234 ".parse().expect("parse");
        assert_eq!(id.get(), 1234);
    }
}
