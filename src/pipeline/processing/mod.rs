// Pipeline processing: field lookup, normalization, filtering and aggregation

pub mod aggregate;
pub mod field_resolver;
pub mod filter;
pub mod images;
pub mod normalize;
pub mod table;
