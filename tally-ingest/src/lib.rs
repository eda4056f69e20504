//! tally-ingest: statement parsers (OFX and delimited text), sign
//! conventions per account source, and format sniffing.

pub mod delimited;
pub mod error;
pub mod parsers;
pub mod sign;
pub mod sniff;
pub mod types;

pub use error::IngestError;
pub use sign::{normalize_sign, normalize_sign_tag, SignSource, SignedAmount};
pub use sniff::{detect_format, parse_file, parse_file_as};
pub use types::ParseResult;
