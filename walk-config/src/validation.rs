use std::fmt;

use crate::models::Config;

/// Non-fatal finding surfaced to the operator at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.hint {
            Some(hint) => write!(f, "{} (hint: {hint})", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigWarnings {
    items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    pub fn push(&mut self, message: impl Into<String>) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: None,
        });
    }

    pub fn push_with_hint(&mut self, message: impl Into<String>, hint: impl Into<String>) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    pub fn extend(&mut self, other: ConfigWarnings) {
        self.items.extend(other.items);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConfigWarning> {
        self.items.iter()
    }
}

/// Checks that do not block startup but usually indicate a mistake.
pub fn collect_warnings(config: &Config) -> ConfigWarnings {
    let mut warnings = ConfigWarnings::default();

    if config.database.url.is_none() {
        warnings.push_with_hint(
            "No database configured; progress is kept in memory and lost on restart",
            "Set DATABASE_URL or [database].url",
        );
    }

    if config.redis.is_none() {
        warnings.push_with_hint(
            "No Redis configured; the matching submission set is kept in memory",
            "Set REDIS_URL or [redis].url",
        );
    }

    if config.admin.secret.is_none() {
        warnings.push_with_hint(
            "No admin secret set; the timeout report endpoint is disabled",
            "Set WALK_ADMIN_SECRET or [admin].secret",
        );
    }

    if config.scanner.default_threshold_minutes == 0 {
        warnings.push("scanner.default_threshold_minutes is 0; every active team counts as timed out");
    }

    warnings
}
