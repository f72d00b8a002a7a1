//! Server-side policy values and job defaults.

/// Products with stock strictly below this are considered low on stock
/// by the restock mutation.
pub const LOW_STOCK_THRESHOLD: i64 = 10;

/// How much stock the restock mutation adds to each low-stock product.
pub const RESTOCK_AMOUNT: i64 = 10;

/// Trailing window, in days, for the order-reminders job.
pub const REMINDER_WINDOW_DAYS: i64 = 7;

/// Timestamp prefix used for every job sink line.
pub const SINK_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_GRAPHQL_ENDPOINT: &str = "http://localhost:8000/graphql";
pub const DEFAULT_CLIENT_RETRIES: u32 = 3;

pub const DEFAULT_HEARTBEAT_LOG: &str = "/tmp/crm_heartbeat_log.txt";
pub const DEFAULT_RESTOCK_LOG: &str = "/tmp/low_stock_updates_log.txt";
pub const DEFAULT_REMINDERS_LOG: &str = "/tmp/order_reminders_log.txt";
pub const DEFAULT_REPORT_LOG: &str = "/tmp/crm_report_log.txt";
