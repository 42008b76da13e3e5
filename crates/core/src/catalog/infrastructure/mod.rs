pub mod json_catalog_reader;
