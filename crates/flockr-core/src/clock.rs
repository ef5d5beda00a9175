use chrono::{DateTime, Utc};

/// Source of wall-clock time for timestamps and scheduling decisions.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn now_timestamp(&self) -> i64 {
        self.now().timestamp()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
