pub const THREAD_NAME: &str = "role_gate_server";

pub const DEFAULT_ADDRESS: &str = "127.0.0.1";
pub const DEFAULT_PORT: &str = "3000";

/// Default admin name that will be written to the database.
pub const ADMIN_USERNAME: &str = "admin";
/// Email of the bootstrapped admin.
pub const ADMIN_EMAIL: &str = "admin@role-gate.local";
/// Default password length when random password is needed at the user creation.
pub const PASSWORD_LEN: usize = 32;
/// Default environment variable of admin password
pub const ADMIN_PASSWORD_VAR: &str = "ADMIN_PASSWORD";

// Environment variables read by the `run` subcommand
pub const CUSTOMER_SECRET_VAR: &str = "JWT_SECRET_KEY";
pub const ADMIN_SECRET_VAR: &str = "JWT_ADMIN_KEY";
pub const ACCESS_EXPIRES_VAR: &str = "JWT_ACCESS_EXPIRES";
pub const REFRESH_EXPIRES_VAR: &str = "JWT_REFRESH_EXPIRES";

// Database settings
pub const DB_FILE_PATH: &str = "./sessions.db";
pub const USER_TABLE_NAME: &str = "users";
pub const ROLE_TABLE_NAME: &str = "roles";
pub const SESSION_TABLE_NAME: &str = "sessions";
/// Upper bound of a single store operation in seconds
pub const DEFAULT_STORE_TIMEOUT_SECS: &str = "10";

// Argon2 password hashing params
use argon2::{Config, Variant, Version};
pub const ARGON2_CONFIG: Config = Config {
  variant: Variant::Argon2id,
  version: Version::Version13,
  mem_cost: 4096,
  time_cost: 3,
  lanes: 4,
  secret: &[],
  ad: &[],
  hash_length: 32,
};
pub const ARGON2_SALT_LEN: usize = 32;

// Token settings
pub const DEFAULT_TOKEN_ISSUER: &str = "role-gate";
/// Customer access token lifetime in seconds [default: 1 day]
pub const DEFAULT_ACCESS_EXPIRES_SECS: &str = "86400";
/// Refresh token lifetime in seconds [default: 7 days]
pub const DEFAULT_REFRESH_EXPIRES_SECS: &str = "604800";
/// Admin access tokens are always short-lived, whatever the configured access lifetime is.
pub const ADMIN_ACCESS_EXPIRES_SECS: u64 = 300;

pub const ACCESS_TOKEN_SUBJECT: &str = "access-token";
pub const REFRESH_TOKEN_SUBJECT: &str = "refresh-token";
pub const ADMIN_TOKEN_SUBJECT: &str = "admin-token";
pub const ADMIN_REFRESH_TOKEN_SUBJECT: &str = "refresh-admin-token";
pub const ADMIN_AUDIENCE: &str = "admin";

// Role settings
pub const CUSTOMER_ROLE_ID: i64 = 1;
pub const CUSTOMER_ROLE_NAME: &str = "user";
pub const ADMIN_ROLE_ID: i64 = 2;
pub const ADMIN_ROLE_NAME: &str = "admin";
pub const MANAGER_ROLE_ID: i64 = 4;
pub const MANAGER_ROLE_NAME: &str = "manager";
/// Bit vector width used when checking numeric role ids
pub const ROLE_VECTOR_WIDTH: usize = 10;
