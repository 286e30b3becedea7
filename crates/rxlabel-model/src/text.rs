use std::fmt;

/// Text that has passed through the label text normalizer.
///
/// Holds lower-case, single-space separated tokens. Construction from raw
/// strings lives with the normalizer; this type only carries the result.
#[derive(
    Debug,
    Clone,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(transparent)]
pub struct NormalizedText(String);

impl NormalizedText {
    /// Wrap an already-normalized string.
    ///
    /// Callers outside the normalizer should prefer `normalize()`; this is
    /// for values that were normalized earlier and stored.
    pub fn from_normalized(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.0.split(' ').filter(|token| !token.is_empty())
    }

    pub fn token_count(&self) -> usize {
        self.tokens().count()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for NormalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
