//! Diceware-style share passwords drawn from the BIP-39 English word list

use bip39::Language;
use rand::{CryptoRng, RngCore};
use zeroize::Zeroizing;

use mixcrypt_core::CryptoResult;
use mixcrypt_crypto::rng::fill_random;

/// Words in a generated share password (88 bits of entropy)
pub const PASSWORD_WORDS: usize = 8;

/// Generate a space-separated password of [`PASSWORD_WORDS`] words.
pub fn generate_password<R: RngCore + CryptoRng>(rng: &mut R) -> CryptoResult<Zeroizing<String>> {
    let words = Language::English.word_list();

    let mut raw = Zeroizing::new([0u8; 2 * PASSWORD_WORDS]);
    fill_random(rng, &mut raw[..])?;

    let mut password = Zeroizing::new(String::new());
    for (i, pair) in raw.chunks_exact(2).enumerate() {
        // 2048 words: the low 11 bits of a uniform u16 are uniform
        let index = usize::from(u16::from_le_bytes([pair[0], pair[1]]) & 0x07FF);
        if i > 0 {
            password.push(' ');
        }
        password.push_str(words[index]);
    }
    Ok(password)
}
