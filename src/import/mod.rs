//! Template import from flattened spreadsheet exports

pub mod tabular;

pub use tabular::parse_tabular_template;
