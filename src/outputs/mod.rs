//! Output generation for match results.
//!
//! # Submodules
//!
//! - [`export`]: Writes matches to a UTF-8 CSV file
//! - [`table`]: Renders matches as an aligned plain-text table for the terminal
//!
//! # CSV Layout
//!
//! ```text
//! Title,DOI,Story URL
//! Coffee cures everything,10.1000/xyz123,https://www.scimex.org/newsfeed/coffee
//! ```

pub mod export;
pub mod table;
