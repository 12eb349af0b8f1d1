//! Configuration section definitions.

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ============================================================================
// [content]
// ============================================================================

/// `[content]` section: where things live on disk, relative to the root.
///
/// ```toml
/// [content]
/// dir = "marketing-content"       # {dir}/{type}/{folder}/{locale}.yml
/// assets = "attached_assets"      # physical image files
/// registry = "marketing-content/image-registry.json"
/// schema_registry = "marketing-content/schema-org.json"
/// output = "dist"                 # redirects.json lands here
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Content root, holding one directory per content type.
    pub dir: PathBuf,

    /// Physical assets directory (recursively scanned).
    pub assets: PathBuf,

    /// Declared image registry JSON.
    pub registry: PathBuf,

    /// Schema-org entry registry JSON (valid `schema.include` keys).
    pub schema_registry: PathBuf,

    /// Output directory for build artifacts.
    pub output: PathBuf,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("marketing-content"),
            assets: PathBuf::from("attached_assets"),
            registry: PathBuf::from("marketing-content/image-registry.json"),
            schema_registry: PathBuf::from("marketing-content/schema-org.json"),
            output: PathBuf::from("dist"),
        }
    }
}

// ============================================================================
// [routes]
// ============================================================================

/// `[routes]` section: fixed routes that exist outside the content tree,
/// plus the locale set used for locale-prefixed URLs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutesConfig {
    /// Known static routes (redirect sources must not shadow these).
    pub static_routes: Vec<String>,

    /// Supported locales, used when an entry declares no locale files.
    pub locales: Vec<String>,

    /// Locale used for single-target redirects of locale-prefixed content.
    pub default_locale: String,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            static_routes: vec![
                "/".to_string(),
                "/about".to_string(),
                "/contact".to_string(),
                "/privacy".to_string(),
                "/terms".to_string(),
            ],
            locales: vec!["en".to_string(), "es".to_string()],
            default_locale: "en".to_string(),
        }
    }
}

// ============================================================================
// [serve]
// ============================================================================

/// `[serve]` section: development/runtime server settings.
///
/// Use `interface = "0.0.0.0"` to make the server accessible from LAN.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Network interface to bind.
    /// - `127.0.0.1` (default): localhost only
    /// - `0.0.0.0`: all interfaces (LAN accessible)
    pub interface: IpAddr,

    /// HTTP port number.
    pub port: u16,

    /// Directory served at `/` for paths that are neither redirects nor
    /// assets, relative to the root.
    pub public: PathBuf,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            interface: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 4820,
            public: PathBuf::from("public"),
        }
    }
}

// ============================================================================
// [validate]
// ============================================================================

/// `[validate]` section: which validation passes run.
///
/// ```toml
/// [validate]
/// redirects = true      # self-redirects, conflicts, collisions, loops
/// meta = true           # priority range, change_frequency, schema refs
/// seo_warnings = true   # warn on missing page_title/description
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidateConfig {
    /// Enable redirect validation.
    pub redirects: bool,

    /// Enable meta-field validation.
    pub meta: bool,

    /// Warn about missing SEO metadata (never build-breaking).
    pub seo_warnings: bool,
}

impl Default for ValidateConfig {
    fn default() -> Self {
        Self {
            redirects: true,
            meta: true,
            seo_warnings: true,
        }
    }
}
