pub mod inquiry;

pub use inquiry::{Inquiry, InquiryDraft, NewInquiry, RequiredField, ValidationError};
