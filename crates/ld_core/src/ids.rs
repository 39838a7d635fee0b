//! Newtypes and parsers for entry identifiers and region tags.
//!
//! Both are trimmed on construction. Entry ids are printable, 1..=64 chars,
//! without inner whitespace; region tags are free text (place names carry
//! diacritics and spaces), 1..=64 chars, no control characters.

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{de::Error as DeError, Deserialize, Deserializer, Serialize};

use crate::errors::CoreError;

const MAX_LEN: usize = 64;

fn is_entry_id(s: &str) -> bool {
    let n = s.chars().count();
    (1..=MAX_LEN).contains(&n) && s.chars().all(|c| !c.is_whitespace() && !c.is_control())
}

fn is_region_tag(s: &str) -> bool {
    let n = s.chars().count();
    (1..=MAX_LEN).contains(&n) && s.chars().all(|c| !c.is_control())
}

macro_rules! def_text_id {
    ($(#[$meta:meta])* $name:ident, $check:ident, $err:ident) => {
        $(#[$meta])*
        #[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
        #[cfg_attr(feature = "serde", derive(Serialize))]
        pub struct $name(String);

        impl $name {
            pub fn new(s: impl AsRef<str>) -> Result<Self, CoreError> {
                let t = s.as_ref().trim();
                if $check(t) { Ok(Self(t.to_string())) } else { Err(CoreError::$err(s.as_ref().to_string())) }
            }
            pub fn as_str(&self) -> &str { &self.0 }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
        }

        impl FromStr for $name {
            type Err = CoreError;
            fn from_str(s: &str) -> Result<Self, Self::Err> { Self::new(s) }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str { &self.0 }
        }

        #[cfg(feature = "serde")]
        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
                let s = String::deserialize(d)?;
                Self::new(&s).map_err(D::Error::custom)
            }
        }
    };
}

def_text_id!(
    /// Unique identifier of an eligible entry (invoice/ticket number).
    EntryId, is_entry_id, InvalidId
);
def_text_id!(
    /// Region an entry belongs to; drives per-region allocation.
    RegionTag, is_region_tag, InvalidRegion
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_id_trims_and_validates() {
        let id = EntryId::new("  RC2640100518 ").unwrap();
        assert_eq!(id.as_str(), "RC2640100518");
        assert!(EntryId::new("").is_err());
        assert!(EntryId::new("   ").is_err());
        assert!(EntryId::new("RC 26").is_err());
        assert!(EntryId::new("x".repeat(65)).is_err());
    }

    #[test]
    fn region_tag_allows_spaces_and_diacritics() {
        let r: RegionTag = "Hà Nội".parse().unwrap();
        assert_eq!(r.to_string(), "Hà Nội");
        assert_eq!(
            RegionTag::new("\t").unwrap_err(),
            CoreError::InvalidRegion("\t".into())
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialize_rejects_invalid_id() {
        let ok: EntryId = serde_json::from_str("\"INV001\"").unwrap();
        assert_eq!(ok.as_str(), "INV001");
        assert!(serde_json::from_str::<EntryId>("\"\"").is_err());
    }
}
