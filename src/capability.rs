//! Capability codes and capability sets.
//!
//! A capability code is a single letter drawn from the host platform's fixed
//! alphabet. Each letter denotes a lifecycle context in which the host runs a
//! module's hook: `G` for the gateway service, `C` for the runtime client,
//! and `D` for the designer. A scope declaration references one or more
//! codes as a compact string (e.g. `"GC"`), and every referenced code must
//! be backed by a hook binding before a module can be packaged.
//!
//! The alphabet is closed: extending it is a source change. This keeps the
//! canonical ordering of [`CapabilitySet`] total, which in turn keeps
//! manifest emission deterministic.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// A lifecycle context the host can run a hook in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Capability {
    /// Gateway service scope.
    Gateway,
    /// Runtime client scope.
    Client,
    /// Designer scope.
    Designer,
}

impl Capability {
    /// Every capability in canonical order.
    pub const ALL: [Capability; 3] = [
        Capability::Gateway,
        Capability::Client,
        Capability::Designer,
    ];

    /// The single-letter code for this capability.
    pub fn code(&self) -> char {
        match self {
            Capability::Gateway => 'G',
            Capability::Client => 'C',
            Capability::Designer => 'D',
        }
    }

    /// Look up a capability by its code letter.
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'G' => Some(Capability::Gateway),
            'C' => Some(Capability::Client),
            'D' => Some(Capability::Designer),
            _ => None,
        }
    }

    /// Human-readable name of the lifecycle context.
    pub fn context_name(&self) -> &'static str {
        match self {
            Capability::Gateway => "Gateway",
            Capability::Client => "Client",
            Capability::Designer => "Designer",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl Serialize for Capability {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.code().to_string())
    }
}

impl<'de> Deserialize<'de> for Capability {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => Capability::from_code(ch).ok_or_else(|| {
                serde::de::Error::custom(format!("unknown capability code '{ch}'"))
            }),
            _ => Err(serde::de::Error::custom(
                "capability must be a single code letter",
            )),
        }
    }
}

/// Error raised when a code string contains letters outside the alphabet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown capability code(s): {}", unknown.iter().map(|c| c.to_string()).collect::<Vec<_>>().join(", "))]
pub struct CapabilityParseError {
    /// Every unrecognized letter, in input order.
    pub unknown: Vec<char>,
}

/// An ordered, duplicate-free set of capabilities.
///
/// The textual form is the concatenation of the member codes in canonical
/// alphabet order (`G` before `C` before `D`), so `"CG"` parses to the same
/// set that serializes back as `"GC"`. Parsing collects *every* unknown
/// letter rather than stopping at the first, so callers can report them all
/// in one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CapabilitySet {
    members: Vec<Capability>,
}

impl CapabilitySet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a compact code string such as `"GC"`.
    ///
    /// Repeated letters collapse. Whitespace is not tolerated; the manifest
    /// format stores bare code strings.
    pub fn parse(codes: &str) -> Result<Self, CapabilityParseError> {
        let mut unknown = Vec::new();
        let mut set = CapabilitySet::new();
        for ch in codes.chars() {
            match Capability::from_code(ch) {
                Some(cap) => set.insert(cap),
                None => {
                    if !unknown.contains(&ch) {
                        unknown.push(ch);
                    }
                }
            }
        }
        if unknown.is_empty() {
            Ok(set)
        } else {
            Err(CapabilityParseError { unknown })
        }
    }

    /// Add a capability, keeping canonical order.
    pub fn insert(&mut self, capability: Capability) {
        if !self.members.contains(&capability) {
            self.members.push(capability);
            self.members.sort();
        }
    }

    /// True if the set contains `capability`.
    pub fn contains(&self, capability: Capability) -> bool {
        self.members.contains(&capability)
    }

    /// True if the set has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Iterate members in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.members.iter().copied()
    }

    /// The canonical compact code string (e.g. `"GC"`).
    pub fn code_string(&self) -> String {
        self.members.iter().map(Capability::code).collect()
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        let mut set = CapabilitySet::new();
        for cap in iter {
            set.insert(cap);
        }
        set
    }
}

impl std::fmt::Display for CapabilitySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code_string())
    }
}

impl Serialize for CapabilitySet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.code_string())
    }
}

impl<'de> Deserialize<'de> for CapabilitySet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let codes = String::deserialize(deserializer)?;
        CapabilitySet::parse(&codes).map_err(serde::de::Error::custom)
    }
}
