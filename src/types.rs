use chrono::{DateTime, Utc};

pub type Id = uuid::Uuid;
pub type Time = DateTime<Utc>;

/// Gets the current timestamp
pub fn now() -> Time {
	Utc::now()
}
