pub mod contact;

pub use contact::{ContactClient, ContactClientError};
