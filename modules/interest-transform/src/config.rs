/// Default prefix joined to the raw `userId` to form the owner identifier.
pub const DEFAULT_OWNER_PREFIX: &str = "U_a-";

/// Transformer configuration. Immutable once handed to a `DocumentTransformer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformConfig {
    /// Prefix for resolved owner ids (`U_a-` + `userId`).
    pub owner_prefix: String,
    /// Route `Interests.SportsTeam` / `Interests.FinanceSecurity` to the
    /// legacy rules. Off in the live dispatch table.
    pub legacy_rules_enabled: bool,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            owner_prefix: DEFAULT_OWNER_PREFIX.to_string(),
            legacy_rules_enabled: false,
        }
    }
}

impl TransformConfig {
    pub fn with_owner_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.owner_prefix = prefix.into();
        self
    }

    pub fn with_legacy_rules(mut self, enabled: bool) -> Self {
        self.legacy_rules_enabled = enabled;
        self
    }
}
