/// Internal registry keys.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Public identifier of models, NEBs and geometries.
pub type UniqueId = uuid::Uuid;
