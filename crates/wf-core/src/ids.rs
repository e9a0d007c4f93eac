use core::fmt;
use std::borrow::Borrow;

/// Well identifier such as `MPB-28`.
///
/// Ordering is lexical so per-well maps iterate deterministically.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct WellId(String);

impl WellId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Canonical form used for joins across data sources.
    ///
    /// Trims, upper-cases and drops zero padding after the pad separator, so
    /// `mpb-028` and `MPB-28` name the same well.
    pub fn normalized(raw: &str) -> Self {
        let upper = raw.trim().to_ascii_uppercase();
        match upper.split_once('-') {
            Some((pad, number)) if !number.is_empty() && number.bytes().all(|b| b.is_ascii_digit()) => {
                let trimmed = number.trim_start_matches('0');
                let number = if trimmed.is_empty() { "0" } else { trimmed };
                Self(format!("{pad}-{number}"))
            }
            _ => Self(upper),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for WellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WellId({})", self.0)
    }
}

impl fmt::Display for WellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WellId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for WellId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for WellId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn normalized_strips_zero_padding() {
        assert_eq!(WellId::normalized(" mpb-028 ").as_str(), "MPB-28");
        assert_eq!(WellId::normalized("MPI-06").as_str(), "MPI-6");
        assert_eq!(WellId::normalized("MPJ-00").as_str(), "MPJ-0");
    }

    #[test]
    fn normalized_leaves_unpadded_names_alone() {
        assert_eq!(WellId::normalized("MPB-28").as_str(), "MPB-28");
        assert_eq!(WellId::normalized("WELL_A").as_str(), "WELL_A");
        assert_eq!(WellId::normalized("MPB-2A").as_str(), "MPB-2A");
    }

    #[test]
    fn map_lookup_by_str() {
        let mut map = BTreeMap::new();
        map.insert(WellId::from("MPB-28"), 1);
        assert_eq!(map.get("MPB-28"), Some(&1));
    }
}
