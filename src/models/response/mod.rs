pub mod message_page;
