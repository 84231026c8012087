pub mod core;
pub mod feed;
pub mod notifications;
pub mod preferences;
