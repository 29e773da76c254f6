pub mod ingest;
pub mod input;
pub mod render;

pub use ingest::JsonSeedImporter;
