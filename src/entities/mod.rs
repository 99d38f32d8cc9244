pub mod prelude;

pub mod inquiries;
