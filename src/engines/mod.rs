pub mod json;
pub use json::JsonDocumentStore;
