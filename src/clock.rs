use chrono::{ DateTime, Utc };

/// Source of "now" for freshness and baseline windows. Injected into every
/// service so derived computations are reproducible under test.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
