//! Public pet codes.
//!
//! A code is `PET_` followed by eight characters from `[A-Z0-9]`. Generation
//! does not consult the store; uniqueness is enforced by the unique index on
//! `pets.pet_code` and the retry loop in [`crate::registry`].

use rand::Rng;

pub const CODE_PREFIX: &str = "PET_";
pub const CODE_BODY_LEN: usize = 8;
pub const CODE_LEN: usize = CODE_PREFIX.len() + CODE_BODY_LEN;

const ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Draws a fresh code from the thread-local RNG.
pub fn generate_code() -> String {
    let mut rng = rand::thread_rng();
    let mut code = String::with_capacity(CODE_LEN);
    code.push_str(CODE_PREFIX);
    for _ in 0..CODE_BODY_LEN {
        let idx = rng.gen_range(0..ALPHABET.len());
        code.push(ALPHABET[idx] as char);
    }
    code
}

/// True when `code` has the exact shape produced by [`generate_code`].
pub fn is_well_formed(code: &str) -> bool {
    match code.strip_prefix(CODE_PREFIX) {
        Some(body) => {
            body.len() == CODE_BODY_LEN
                && body
                    .bytes()
                    .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
        }
        None => false,
    }
}

/// Source of candidate codes for registration and backfill.
pub trait CodeSource: Send + Sync {
    fn next_code(&self) -> String;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct RandomCodes;

impl CodeSource for RandomCodes {
    fn next_code(&self) -> String {
        generate_code()
    }
}
