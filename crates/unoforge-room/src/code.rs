//! Room code generation.

use rand::Rng;
use unoforge_protocol::RoomCode;

/// Characters a room code is drawn from. `I`, `O`, `0` and `1` are left
/// out so a code read off a TV can't be mistyped.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Draws a random code of `len` characters from [`CODE_ALPHABET`].
///
/// Uniqueness is the registry's job: it redraws on collision.
pub fn generate_code<R: Rng + ?Sized>(rng: &mut R, len: usize) -> RoomCode {
    let code: String = (0..len)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect();
    RoomCode::new(&code)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn test_generate_code_uses_alphabet_and_length() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..200 {
            let code = generate_code(&mut rng, 4);
            assert_eq!(code.as_str().len(), 4);
            assert!(code.as_str().bytes().all(|b| CODE_ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn test_alphabet_excludes_ambiguous_characters() {
        for b in b"IO01" {
            assert!(!CODE_ALPHABET.contains(b));
        }
    }
}
