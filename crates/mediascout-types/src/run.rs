//! Scrape Run identity.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// What triggered a scrape run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    Api,
    Schedule,
}

/// `{brand_id_prefix}-{8-char random}`, shared by every log line and
/// metric emitted within one run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ScrapeRunId(String);

impl ScrapeRunId {
    /// Generate a new run id for `brand_id`. The random suffix comes from
    /// a fresh UUID rather than a dedicated RNG so the type has no extra
    /// dependency beyond `uuid`, which every crate in this workspace
    /// already pulls in for entity ids.
    pub fn generate(brand_id: Uuid) -> Self {
        let prefix = brand_id.simple().to_string();
        let prefix = &prefix[..8.min(prefix.len())];
        let suffix = Uuid::new_v4().simple().to_string();
        let suffix = &suffix[..8];
        Self(format!("{prefix}-{suffix}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScrapeRunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ScrapeRunId> for String {
    fn from(id: ScrapeRunId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_id_has_expected_shape() {
        let id = ScrapeRunId::generate(Uuid::new_v4());
        let parts: Vec<&str> = id.as_str().split('-').collect();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].len(), 8);
        assert_eq!(parts[1].len(), 8);
    }

    #[test]
    fn generated_ids_are_unique() {
        let brand = Uuid::new_v4();
        let a = ScrapeRunId::generate(brand);
        let b = ScrapeRunId::generate(brand);
        assert_ne!(a, b);
    }
}
