//! One page of the admin message listing.

use crate::models::message::contact_message::ContactMessage;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct MessagePage {
    pub messages: Vec<ContactMessage>,
    pub total: i64,
    pub pages: i64,
    pub current_page: i64,
}
