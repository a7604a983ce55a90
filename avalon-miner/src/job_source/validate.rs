//! Solution checking.

use bitcoin::block::Header;
use bitcoin::consensus;

use super::WorkItem;

/// Whether hashing the work's header with this nonce meets the target.
///
/// The nonce is patched into the last header field, the header is
/// double-SHA256 hashed and the result compared against the work target.
/// A header that fails to parse cannot be solved by any nonce.
pub fn solution_meets_target(work: &WorkItem, nonce: u32) -> bool {
    let mut header_bytes = work.header;
    header_bytes[76..80].copy_from_slice(&nonce.to_le_bytes());

    let header: Header = match consensus::deserialize(&header_bytes) {
        Ok(header) => header,
        Err(_) => return false,
    };

    work.target.is_met_by(header.block_hash())
}
