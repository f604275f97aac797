/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

// =============================================================================
// ROLE CONSTANTS
// =============================================================================

/// Admin role - can manage every resource
pub const ROLE_ADMIN: &str = "admin";

/// Editor role - can publish content and manage their own resources
pub const ROLE_EDITOR: &str = "editor";

/// Plain user role
pub const ROLE_USER: &str = "user";

/// The seeded admin account; only this account may change roles or delete users
pub const SUPER_ADMIN_USERNAME: &str = "admin";

// =============================================================================
// CONTENT
// =============================================================================

/// Length of derived summaries, in characters
pub const SUMMARY_MAX_CHARS: usize = 200;
