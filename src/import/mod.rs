pub mod annotation;
pub mod index_table;
pub mod ocit;

// Re-export commonly used items
pub use annotation::{parse_annotation, resolve_intersection};
pub use index_table::IndexTable;
pub use ocit::{parse_ocit, read_intersections, IntersectionRecord, OcitDocument, SignalGroupRecord};
