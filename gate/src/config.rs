use serde::{Deserialize, Serialize};

/// Session key used when none is configured.
pub const DEFAULT_STORAGE_KEY: &str = "recaptcha_verified";

/// Public gate settings, served to the client by `GET /api/auth/gate-config`.
///
/// Both values are client-visible; the challenge secret never appears here.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateConfig {
    #[serde(default)]
    pub site_key: Option<String>,
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

impl GateConfig {
    pub fn new(site_key: Option<String>, storage_key: Option<String>) -> Self {
        Self {
            site_key,
            storage_key: storage_key
                .filter(|k| !k.is_empty())
                .unwrap_or_else(default_storage_key),
        }
    }

    pub fn site_key(&self) -> Option<&str> {
        self.site_key.as_deref().filter(|k| !k.is_empty())
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self::new(None, None)
    }
}
