pub mod catalog_use_case;
pub mod ports;
