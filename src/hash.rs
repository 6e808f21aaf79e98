//! Content digest: BLAKE2b truncated to 224 bits, matching `spec.md`
//! section 4.1's Hasher contract (`update`/`finalize`, 28-byte output).
//!
//! Grounded on the `blake2b_simd` usage pattern found alongside the
//! teacher's corpus (`Params::new().hash_length(n)` for a non-default
//! output width, `.to_state()` for incremental feeding).

use blake2b_simd::{Params, State};

pub const DIGEST_LEN: usize = 28;

pub struct Hasher {
    state: State,
}

impl Hasher {
    pub fn new() -> Self {
        Hasher {
            state: Params::new().hash_length(DIGEST_LEN).to_state(),
        }
    }

    pub fn update(&mut self, data: &[u8]) -> &mut Self {
        self.state.update(data);
        self
    }

    pub fn finalize(&self) -> [u8; DIGEST_LEN] {
        let hash = self.state.finalize();
        let mut out = [0u8; DIGEST_LEN];
        out.copy_from_slice(hash.as_bytes());
        out
    }
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot digest of a byte slice, used for symlink targets.
pub fn digest(data: &[u8]) -> [u8; DIGEST_LEN] {
    let mut h = Hasher::new();
    h.update(data);
    h.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incremental_matches_one_shot() {
        let whole = digest(b"hello world");
        let mut h = Hasher::new();
        h.update(b"hello ");
        h.update(b"world");
        assert_eq!(h.finalize(), whole);
    }

    #[test]
    fn empty_input_is_stable() {
        let a = digest(b"");
        let b = digest(b"");
        assert_eq!(a, b);
        assert_eq!(a.len(), DIGEST_LEN);
    }
}
