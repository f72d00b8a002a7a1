//! Maintenance jobs. Each one is an independently schedulable unit of work:
//! external cron invokes the matching CLI subcommand, the job talks to the
//! GraphQL API, writes one line per event to its own append-only sink, and
//! never propagates a failure to the scheduler.

pub mod heartbeat;
pub mod reminders;
pub mod report;
pub mod restock;
pub mod sink;
