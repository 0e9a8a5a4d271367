pub mod broadcast;
pub mod connection;
pub mod insights;
pub mod registry;
pub mod signaling;
