//! Data models for the lending server

pub mod book;
pub mod person;

// Re-export commonly used types
pub use book::{Book, BookForm, FindCriteria, Issuance, ListingQuery, PageRequest};
pub use person::Person;
