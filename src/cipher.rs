//! Symmetric encryption under a negotiated session key.
//!
//! DISCLAIMER: [`ChaChaStreamCipher`] is a demonstration collaborator. It provides
//! confidentiality only: there is no authentication tag, so a tampered ciphertext
//! decrypts to garbage instead of failing. Use an AEAD for anything real.

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::dh::SessionKey;
use crate::error::{Error, Result};

/// Bytes of random stream id prepended to every ciphertext.
pub const STREAM_ID_LEN: usize = 8;

const KEY_LABEL: &[u8] = b"ffc-dh chacha20 stream key v1";

/// Anything that can encrypt and decrypt with a [`SessionKey`].
pub trait SymmetricCipher {
    /// Encrypt `plaintext` into a self-contained ciphertext.
    fn encrypt(&self, key: &SessionKey, plaintext: &[u8]) -> Result<Vec<u8>>;

    /// Invert [`encrypt`](Self::encrypt). Fails only on framing errors.
    fn decrypt(&self, key: &SessionKey, ciphertext: &[u8]) -> Result<Vec<u8>>;
}

/// ChaCha20 keystream XOR.
///
/// The cipher key is `SHA-256(label || Z)` where `Z` is the padded session key.
/// Each message picks a fresh 64-bit stream id, so one session key can protect more
/// than one message.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChaChaStreamCipher;

impl ChaChaStreamCipher {
    pub fn new() -> Self {
        ChaChaStreamCipher
    }

    fn keystream(key: &SessionKey, stream_id: u64) -> ChaCha20Rng {
        let mut hasher = Sha256::new();
        hasher.update(KEY_LABEL);
        hasher.update(&*key.to_bytes());

        let mut seed = Zeroizing::new([0u8; 32]);
        seed.copy_from_slice(&hasher.finalize());

        let mut rng = ChaCha20Rng::from_seed(*seed);
        rng.set_stream(stream_id);
        rng
    }

    fn apply(rng: &mut ChaCha20Rng, data: &[u8], out: &mut Vec<u8>) {
        let mut stream = Zeroizing::new(vec![0u8; data.len()]);
        rng.fill_bytes(&mut stream);
        out.extend(data.iter().zip(stream.iter()).map(|(d, k)| d ^ k));
    }
}

impl SymmetricCipher for ChaChaStreamCipher {
    fn encrypt(&self, key: &SessionKey, plaintext: &[u8]) -> Result<Vec<u8>> {
        let stream_id: u64 = rand::thread_rng().gen();
        let mut out = Vec::with_capacity(STREAM_ID_LEN + plaintext.len());
        out.extend_from_slice(&stream_id.to_be_bytes());
        Self::apply(&mut Self::keystream(key, stream_id), plaintext, &mut out);
        Ok(out)
    }

    fn decrypt(&self, key: &SessionKey, ciphertext: &[u8]) -> Result<Vec<u8>> {
        if ciphertext.len() < STREAM_ID_LEN {
            return Err(Error::MalformedEncoding(format!(
                "ciphertext of {} bytes is shorter than its {} byte stream id",
                ciphertext.len(),
                STREAM_ID_LEN
            )));
        }
        let (id, body) = ciphertext.split_at(STREAM_ID_LEN);
        let mut id_bytes = [0u8; STREAM_ID_LEN];
        id_bytes.copy_from_slice(id);

        let mut out = Vec::with_capacity(body.len());
        Self::apply(
            &mut Self::keystream(key, u64::from_be_bytes(id_bytes)),
            body,
            &mut out,
        );
        Ok(out)
    }
}
