//! Suite constants
//!
//! Fixed values the control plane expects or the operations use as targets.

// Endpoints and credentials
pub const DEFAULT_BASE_URL: &str = "https://api.t1.cloud";
pub const DEFAULT_AUTH_GRANT: &str = "client_credentials";
pub const TOKEN_LIFETIME_SECS: i64 = 55 * 60;
pub const TOKEN_REFRESH_THRESHOLD_SECS: i64 = 5 * 60;

// Poll budgets
pub const DEFAULT_TRANSIENT_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_BACKOFF_SECS: u64 = 10;
pub const ORDER_LIST_PAGE_SIZE: u32 = 5;

// Public IP and bandwidth
pub const INITIAL_PUBLIC_IP_BANDWIDTH: u32 = 100;
pub const BANDWIDTH_OPTIONS: [u32; 6] = [200, 500, 1000, 2000, 5000, 10000];

// Resize target
pub const RESIZE_TARGET_RAM_MB: u32 = 8192;
pub const RESIZE_TARGET_VCPUS: u32 = 4;

// MySQL settings
pub const MAX_USER_CONNECTIONS_RANGE: (u32, u32) = (100, 1000);
pub const MAX_USER_CONNECTIONS_ALTERNATIVES: [u32; 5] = [150, 200, 300, 500, 800];

// Redis settings
pub const REDIS_TIMEOUT_RANGE: (u32, u32) = (300, 500);
pub const REDIS_TIMEOUT_ALTERNATIVES: [u32; 4] = [350, 400, 450, 500];
pub const REDIS_DEFAULT_TIMEOUT: u32 = 300;
pub const REDIS_DEFAULT_TCP_BACKLOG: u32 = 511;
pub const REDIS_DEFAULT_TCP_KEEPALIVE: u32 = 300;
pub const REDIS_DEFAULT_MAXMEMORY_POLICY: &str = "noeviction";
pub const REDIS_DEFAULT_AOF_FSYNC: &str = "everysec";
pub const REDIS_DEFAULT_RDB_SAVE: &str = "300 10";
pub const BACKUP_SCHEDULE_EARLY: &str = "00:00:00";
pub const BACKUP_SCHEDULE_LATE: &str = "00:30:00";
pub const BACKUP_RETENTION_LONG: u32 = 7;
pub const BACKUP_RETENTION_SHORT: u32 = 5;
pub const UNKNOWN_BACKUP_NAME: &str = "unknown_backup";

// Node scaling
pub const MIN_NODES_AFTER_REMOVAL: u32 = 3;
pub const DEFAULT_REDIS_NODES_TO_ADD: u32 = 2;
pub const DEFAULT_MYSQL_NODES_TO_ADD: u32 = 1;
