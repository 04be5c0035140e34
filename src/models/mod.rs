//! Typed records shared by the HTTP, database and notification layers.

pub mod message;
pub mod response;
