pub mod contact_form;
pub mod contact_message;
