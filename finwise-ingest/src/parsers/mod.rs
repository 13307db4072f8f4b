pub mod delimited;

pub use delimited::{map_records, parse_amount, parse_csv};
