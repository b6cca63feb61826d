/*******************************************************************************
*   (c) 2021 Zondax GmbH
*
*  Licensed under the Apache License, Version 2.0 (the "License");
*  you may not use this file except in compliance with the License.
*  You may obtain a copy of the License at
*
*      http://www.apache.org/licenses/LICENSE-2.0
*
*  Unless required by applicable law or agreed to in writing, software
*  distributed under the License is distributed on an "AS IS" BASIS,
*  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
*  See the License for the specific language governing permissions and
*  limitations under the License.
********************************************************************************/
//! Hashing helpers and the contracts of the key holding collaborators.
//!
//! Private keys never reach this crate, derivation and signing are
//! delegated to a [`Signer`] and bech32 encoding to an [`AddressEncoder`].

use arrayref::array_ref;
use sha2::Digest;
use tiny_keccak::Hasher;

use crate::{
    constants::{ADDRESS_LEN, PK_HASH_LEN, SECP256K1_COMPRESSED_PK_LEN, SECP256K1_PK_LEN},
    parser::Bip32Path,
    ZxError,
};

pub const SHA256_LEN: usize = 32;
pub const KECCAK256_LEN: usize = 32;

/// Recoverable secp256k1 signature
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(any(test, feature = "derive-debug"), derive(Debug))]
pub struct Signature {
    pub r: [u8; 32],
    pub s: [u8; 32],
    /// recovery id, the parity of the `R` point
    pub v: u8,
}

/// Derives keys and signs digests, holds the private keys
pub trait Signer {
    /// Uncompressed secp256k1 public key of `path`
    fn derive_pubkey(&self, path: &Bip32Path) -> Result<[u8; SECP256K1_PK_LEN], ZxError>;

    fn sign(&self, path: &Bip32Path, digest: &[u8; 32]) -> Result<Signature, ZxError>;
}

/// Bech32 encoding of a public key hash
pub trait AddressEncoder {
    /// Writes the address in `out`, returning its length
    fn encode(&self, hrp: &str, hash: &[u8; PK_HASH_LEN], out: &mut [u8]) -> Result<usize, ZxError>;
}

pub fn sha256(data: &[u8]) -> [u8; SHA256_LEN] {
    sha2::Sha256::digest(data).into()
}

pub fn keccak256(data: &[u8]) -> [u8; KECCAK256_LEN] {
    let mut keccak = tiny_keccak::Keccak::v256();
    keccak.update(data);

    let mut out = [0; KECCAK256_LEN];
    keccak.finalize(&mut out);
    out
}

/// SEC1 compressed form of an uncompressed public key
pub fn compress_pubkey(
    pubkey: &[u8; SECP256K1_PK_LEN],
) -> Result<[u8; SECP256K1_COMPRESSED_PK_LEN], ZxError> {
    if pubkey[0] != 0x04 {
        return Err(ZxError::InvalidCryptoSettings);
    }

    let mut out = [0; SECP256K1_COMPRESSED_PK_LEN];
    out[0] = 0x02 | (pubkey[SECP256K1_PK_LEN - 1] & 1);
    out[1..].copy_from_slice(&pubkey[1..SECP256K1_COMPRESSED_PK_LEN]);
    Ok(out)
}

/// `ripemd160(sha256(pubkey))` of a compressed key, the payload of cosmos addresses
pub fn pubkey_hash(compressed: &[u8; SECP256K1_COMPRESSED_PK_LEN]) -> [u8; PK_HASH_LEN] {
    ripemd::Ripemd160::digest(sha256(compressed)).into()
}

/// Last 20 bytes of the keccak of the key coordinates
pub fn eth_address(pubkey: &[u8; SECP256K1_PK_LEN]) -> [u8; ADDRESS_LEN] {
    let hash = keccak256(&pubkey[1..]);
    *array_ref!(hash, KECCAK256_LEN - ADDRESS_LEN, ADDRESS_LEN)
}

#[cfg(test)]
mod tests {
    use super::*;

    // public key of the private key 1, the generator point
    const G: &str = "0479be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8";

    fn generator() -> [u8; SECP256K1_PK_LEN] {
        let mut pk = [0; SECP256K1_PK_LEN];
        pk.copy_from_slice(&hex::decode(G).unwrap());
        pk
    }

    #[test]
    fn digests() {
        assert_eq!(
            hex::encode(sha256(b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn addresses() {
        let pk = generator();

        let compressed = compress_pubkey(&pk).unwrap();
        assert_eq!(
            hex::encode(compressed),
            "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"
        );
        assert_eq!(
            hex::encode(pubkey_hash(&compressed)),
            "751e76e8199196d454941c45d1b3a323f1433bd6"
        );
        assert_eq!(
            hex::encode(eth_address(&pk)),
            "7e5f4552091a69125d5dfcb7b8c2659029395bdf"
        );
    }

    #[test]
    fn odd_keys_and_bad_prefix() {
        let mut pk = generator();
        pk[SECP256K1_PK_LEN - 1] |= 1;
        assert_eq!(compress_pubkey(&pk).unwrap()[0], 0x03);

        pk[0] = 0x02;
        assert_eq!(compress_pubkey(&pk), Err(ZxError::InvalidCryptoSettings));
    }
}
