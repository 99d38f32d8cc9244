pub use super::inquiries::Entity as Inquiries;
