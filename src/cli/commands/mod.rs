mod inquiries;
mod send;

pub use inquiries::cmd_list_inquiries;
pub use send::cmd_send_inquiry;
