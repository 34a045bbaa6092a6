//! Centralized constants for names, keys, lifetimes, and permissions.

/// Default site root directory.
pub const DEFAULT_SITE_ROOT: &str = "/var/lib/clawpress";

/// Environment variable overriding the site root.
pub const ROOT_ENV: &str = "CLAWPRESS_ROOT";

/// Environment variable holding the log filter directive.
pub const LOG_ENV: &str = "CLAWPRESS_LOG";

/// Permission mode for the site root directory.
pub const SITE_DIR_MODE: u32 = 0o700;

/// Permission mode for site.toml (holds password hashes and flash secrets).
pub const SITE_TOML_MODE: u32 = 0o600;

/// Credential name reserved for the OpenClaw integration.
pub const DEFAULT_RESERVED_NAME: &str = "OpenClaw";

/// App id recorded on credentials issued by this plugin.
pub const DEFAULT_APP_ID: &str = "clawpress";

/// Content metadata key marking an item as created through the integration.
pub const ATTRIBUTION_META_KEY: &str = "_clawpress_created";

/// Prefix shared by every flash entry this plugin writes.
pub const FLASH_PREFIX: &str = "clawpress_";

pub const FLASH_ERROR_PREFIX: &str = "clawpress_error_";
pub const FLASH_CREATED_PREFIX: &str = "clawpress_created_";

/// Lifetime of an error notice carried across the create redirect.
pub const DEFAULT_ERROR_TTL_SECS: i64 = 60;

/// Lifetime of the one-time connection info after a successful create.
pub const DEFAULT_CREATED_TTL_SECS: i64 = 300;

/// Number of recent items shown in usage stats.
pub const DEFAULT_RECENT_LIMIT: usize = 5;

/// Capability required to manage the integration credential.
pub const DEFAULT_REQUIRED_CAPABILITY: &str = "manage_options";

/// Capability required to view the site-wide roster.
pub const ROSTER_CAPABILITY: &str = "list_users";

/// Nonce validity window; tokens rotate every half lifetime.
pub const DEFAULT_NONCE_LIFETIME_SECS: i64 = 86_400;

/// Upper bound for any configured lifetime (one year).
pub const MAX_LIFETIME_SECS: i64 = 31_536_000;

/// Number of characters in a generated application password.
pub const APP_PASSWORD_LENGTH: usize = 24;

/// Application passwords are displayed in groups of this many characters.
pub const APP_PASSWORD_CHUNK: usize = 4;

/// Length of the per-site nonce signing secret.
pub const NONCE_SECRET_LENGTH: usize = 64;

pub const ACTION_CREATE: &str = "clawpress_create";
pub const ACTION_REVOKE: &str = "clawpress_revoke";
