//! Opaque identifiers for voters, submissions (vote targets) and competitions.
//!
//! Identifiers are issued by the host platform; the engine only compares,
//! hashes and orders them. Ordering is lexicographic so that reports built
//! from `BTreeMap`s come out in a stable order.

use crate::error::NestfestError;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a raw identifier without validation.
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            /// Wrap a raw identifier, rejecting empty or whitespace-bearing input.
            pub fn parse(raw: impl Into<String>) -> Result<Self, NestfestError> {
                let id = Self(raw.into());
                if id.is_valid() {
                    Ok(id)
                } else {
                    Err(NestfestError::InvalidId(id.0))
                }
            }

            /// Return the raw identifier string.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Whether this identifier is non-empty and free of whitespace.
            pub fn is_valid(&self) -> bool {
                !self.0.is_empty() && !self.0.chars().any(char::is_whitespace)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::new(s)
            }
        }
    };
}

string_id!(
    /// The user casting votes.
    VoterId
);

string_id!(
    /// A competition entry that votes are cast on.
    SubmissionId
);

string_id!(
    /// The competition a budget and its votes belong to.
    CompetitionId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rejects_empty_and_whitespace() {
        assert!(VoterId::parse("").is_err());
        assert!(VoterId::parse("voter 1").is_err());
        assert!(matches!(
            SubmissionId::parse("\t"),
            Err(NestfestError::InvalidId(_))
        ));
        assert_eq!(VoterId::parse("voter-1").unwrap().as_str(), "voter-1");
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let id = SubmissionId::new("sub_42");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"sub_42\"");
        let back: SubmissionId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn ordering_is_lexicographic() {
        let mut ids = vec![VoterId::new("b"), VoterId::new("a"), VoterId::new("c")];
        ids.sort();
        assert_eq!(ids, vec![VoterId::new("a"), VoterId::new("b"), VoterId::new("c")]);
    }
}
