pub mod model;

// Re-export for consumers of the listing model
pub use model::{disassemble_input, open_input, parse_u64, Input, Listing, ListingLine, Stop};
