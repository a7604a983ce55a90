//! Job payload computation for the chip.
//!
//! The chip does not take a raw block header. It wants the SHA-256
//! midstate of the header's first 64 bytes plus the three header words
//! that fall into the second compression block (merkle tail, ntime,
//! nbits); it rolls the nonce itself and finishes the double hash in
//! silicon. Everything here is a pure function of the header.

use sha2::compress256;
use sha2::digest::generic_array::GenericArray;

/// SHA-256 initial hash values (FIPS 180-4).
const SHA256_INITIAL_STATE: [u32; 8] = [
    0x6a09e667, 0xbb67ae85, 0x3c6ef372, 0xa54ff53a, 0x510e527f, 0x9b05688c, 0x1f83d9ab, 0x5be0cd19,
];

/// Number of configuration words the chip expects for one job.
pub const HASH_CONFIG_WORDS: usize = 11;

/// Compress one 64-byte chunk from the SHA-256 initial state.
pub fn midstate(chunk: &[u8; 64]) -> [u32; 8] {
    let mut state = SHA256_INITIAL_STATE;
    let block = GenericArray::clone_from_slice(chunk);
    compress256(&mut state, std::slice::from_ref(&block));
    state
}

/// Build the job configuration words for an 80-byte serialized header:
/// the midstate of bytes 0..64, then the tail words (merkle root tail,
/// ntime, nbits) in header order.
pub fn hash_config_words(header: &[u8; 80]) -> [u32; HASH_CONFIG_WORDS] {
    let mut first_chunk = [0u8; 64];
    first_chunk.copy_from_slice(&header[..64]);

    let mut words = [0u32; HASH_CONFIG_WORDS];
    words[..8].copy_from_slice(&midstate(&first_chunk));
    for (i, tail_word) in header[64..76].chunks_exact(4).enumerate() {
        words[8 + i] = u32::from_le_bytes(tail_word.try_into().unwrap());
    }
    words
}

#[cfg(test)]
mod tests {
    use sha2::{Digest, Sha256};

    use super::*;

    fn sample_header() -> [u8; 80] {
        let mut header = [0u8; 80];
        for (i, byte) in header.iter_mut().enumerate() {
            *byte = (i as u8).wrapping_mul(7).wrapping_add(3);
        }
        header
    }

    // Continuing the midstate over the padded tail block must reproduce
    // the full SHA-256 of the header.
    #[test]
    fn midstate_continues_to_the_full_digest() {
        let header = sample_header();

        let mut first_chunk = [0u8; 64];
        first_chunk.copy_from_slice(&header[..64]);
        let mut state = midstate(&first_chunk);

        // Second block: 16 header bytes, then SHA-256 padding for an
        // 80-byte (640-bit) message.
        let mut tail = [0u8; 64];
        tail[..16].copy_from_slice(&header[64..]);
        tail[16] = 0x80;
        tail[56..].copy_from_slice(&640u64.to_be_bytes());

        let block = GenericArray::clone_from_slice(&tail);
        compress256(&mut state, std::slice::from_ref(&block));

        let digest = Sha256::digest(header);
        for (i, word) in state.iter().enumerate() {
            assert_eq!(digest[4 * i..4 * i + 4], word.to_be_bytes());
        }
    }

    #[test]
    fn job_words_carry_midstate_then_header_tail() {
        let header = sample_header();
        let words = hash_config_words(&header);

        let mut first_chunk = [0u8; 64];
        first_chunk.copy_from_slice(&header[..64]);
        assert_eq!(&words[..8], &midstate(&first_chunk));

        assert_eq!(words[8], u32::from_le_bytes(header[64..68].try_into().unwrap()));
        assert_eq!(words[9], u32::from_le_bytes(header[68..72].try_into().unwrap()));
        assert_eq!(words[10], u32::from_le_bytes(header[72..76].try_into().unwrap()));
    }

    #[test]
    fn midstate_depends_on_every_input_byte() {
        let mut chunk = [0u8; 64];
        let base = midstate(&chunk);
        chunk[63] ^= 1;
        assert_ne!(midstate(&chunk), base);
    }
}
