pub mod error;
pub mod quiz;

// CSV value types shared by the import pipeline
pub mod csv;
