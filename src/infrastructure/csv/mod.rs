// ============================================================
// CSV INFRASTRUCTURE LAYER
// ============================================================
// CSV reading with encoding tolerance and delimiter detection

mod csv_parser;

pub use csv_parser::CsvParser;
