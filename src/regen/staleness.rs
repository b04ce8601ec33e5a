use std::time::SystemTime;

/// How long a published artifact stays fresh.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Revalidate {
    /// Never regenerate; the artifact is fresh forever.
    Disabled,
    /// Regenerate on every request.
    EveryRequest,
    /// Regenerate once the artifact is at least this many seconds old.
    AfterSeconds(u64),
}

impl Default for Revalidate {
    fn default() -> Self {
        Self::EveryRequest
    }
}

impl serde::Serialize for Revalidate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Self::Disabled => serializer.serialize_bool(false),
            Self::EveryRequest => serializer.serialize_unit(),
            Self::AfterSeconds(secs) => serializer.serialize_u64(*secs),
        }
    }
}

impl<'de> serde::Deserialize<'de> for Revalidate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Flag(bool),
            Secs(u64),
        }

        match Option::<Repr>::deserialize(deserializer)? {
            None => Ok(Self::EveryRequest),
            Some(Repr::Flag(false)) => Ok(Self::Disabled),
            Some(Repr::Flag(true)) => Err(serde::de::Error::custom(
                "revalidate must be false, absent, or a number of seconds",
            )),
            Some(Repr::Secs(secs)) => Ok(Self::AfterSeconds(secs)),
        }
    }
}

/// Decide whether an artifact generated at `last_generated` is stale at `now`.
///
/// A disabled interval is never stale; an absent one always is. Clock skew
/// that places `now` before `last_generated` reads as fresh.
pub fn is_stale(last_generated: SystemTime, interval: Revalidate, now: SystemTime) -> bool {
    match interval {
        Revalidate::Disabled => false,
        Revalidate::EveryRequest => true,
        Revalidate::AfterSeconds(secs) => now
            .duration_since(last_generated)
            .map(|age| age.as_secs() >= secs)
            .unwrap_or(false),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/regen/staleness.rs"]
mod tests;
