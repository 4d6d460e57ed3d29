pub mod config;

pub use config::{CharacterSet, FieldConfig};
