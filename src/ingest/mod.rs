pub mod reader;
pub mod row;
pub mod digest;

pub use reader::{decode, parse_offerings, read_offerings};
pub use row::{RawRow, COLUMNS};
pub use digest::compute_file_hash;
