use {
    base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD},
    sha2::{Digest, Sha256},
};

use crate::types::PkceChallenge;

/// Generate an S256 PKCE pair from 32 random bytes.
pub fn generate_pkce() -> PkceChallenge {
    let verifier = random_token();
    let challenge = URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()));
    PkceChallenge {
        verifier,
        challenge,
    }
}

/// Random opaque value for the `state` parameter.
pub fn generate_state() -> String {
    random_token()
}

fn random_token() -> String {
    URL_SAFE_NO_PAD.encode(rand::random::<[u8; 32]>())
}
