use std::fmt;

/// Declares a case-insensitive string identifier.
///
/// Keys are trimmed and lowercased on construction so lookups never depend on
/// the casing used by content files or callers.
macro_rules! normalized_key {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(from = "String", into = "String"))]
        pub struct $name(String);

        impl $name {
            pub fn new(raw: impl AsRef<str>) -> Self {
                Self(raw.as_ref().trim().to_lowercase())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self::new(raw)
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                Self::new(raw)
            }
        }

        impl From<$name> for String {
            fn from(key: $name) -> String {
                key.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

normalized_key!(
    /// Identifier of an attribute (e.g. `strength`). Unique per ledger.
    AttributeKey
);

normalized_key!(
    /// Identifier of a skill definition.
    SkillKey
);

normalized_key!(
    /// Identifier of a class definition.
    ClassId
);

normalized_key!(
    /// Class group (profession slot). An actor holds at most one class per group.
    ClassGroup
);

normalized_key!(
    /// Namespaced origin of an externally granted skill level (e.g. `items:ring_of_fire`).
    GrantSource
);

/// Stable opaque handle of an actor known to the progression subsystem.
///
/// Handles are issued monotonically by the host roster and never reused, so a
/// handle held by a stale task can never alias a newer actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActorHandle(pub u64);

impl fmt::Display for ActorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor#{}", self.0)
    }
}

/// Non-owning tag recording who installed a modifier.
///
/// Used for lookup and bulk cancellation only, never for lifetime control.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceId(pub u64);

impl From<ActorHandle> for SourceId {
    fn from(handle: ActorHandle) -> Self {
        Self(handle.0)
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "source#{}", self.0)
    }
}

/// Discrete time unit driven by the host's update loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Self = Self(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Ticks remaining from `self` until `later`, zero if `later` has passed.
    pub fn until(self, later: Tick) -> u64 {
        later.0.saturating_sub(self.0)
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0.saturating_add(rhs))
    }
}

impl std::ops::Sub<u64> for Tick {
    type Output = Tick;
    fn sub(self, rhs: u64) -> Tick {
        Tick(self.0.saturating_sub(rhs))
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_case_insensitive() {
        assert_eq!(AttributeKey::new("Strength"), AttributeKey::new(" strength "));
        assert_eq!(SkillKey::from("FireBall").as_str(), "fireball");
    }

    #[test]
    fn tick_until_saturates() {
        assert_eq!(Tick(5).until(Tick(12)), 7);
        assert_eq!(Tick(12).until(Tick(5)), 0);
    }
}
