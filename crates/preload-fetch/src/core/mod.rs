//! Pure helpers with no I/O.

mod checksum;
mod retry;

pub use checksum::parse_sha256;
pub use retry::retry_delay;
