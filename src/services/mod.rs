pub mod inquiry_service;
pub mod inquiry_service_impl;
pub use inquiry_service::{InquiryError, InquiryService};
pub use inquiry_service_impl::DefaultInquiryService;
