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
use arrayvec::ArrayVec;

use crate::{
    constants::{COIN_HRP, COIN_TYPE_COSMOS, COIN_TYPE_ETH, MAX_ADDRESS_LEN, SIGNATURE_LEN},
    crypto::{self, AddressEncoder, Signer},
    handlers::SignError,
    parser::{Bip32Path, FromBytes, JsonTx, ParserError},
    sys::{ViewError, Viewable},
    utils::AppMode,
    ZxError,
};

/// A derivation path followed by the transaction to sign
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(any(test, feature = "derive-debug"), derive(Debug))]
pub struct SignRequest<'b> {
    pub path: Bip32Path,
    pub tx: &'b [u8],
}

impl<'b> SignRequest<'b> {
    /// Only `44'/60'` and `44'/118'` paths are accepted
    pub fn parse(payload: &'b [u8]) -> Result<Self, ParserError> {
        crate::sys::zemu_log_stack("SignRequest::parse");

        let (tx, path) = Bip32Path::from_bytes(payload)?;
        path.validate(&[COIN_TYPE_ETH, COIN_TYPE_COSMOS])?;

        if tx.is_empty() {
            return Err(ParserError::NoData);
        }

        Ok(Self { path, tx })
    }
}

/// Bech32 address of the key at `path`
pub fn cosmos_address<S, E>(
    path: &Bip32Path,
    signer: &S,
    encoder: &E,
) -> Result<ArrayVec<u8, MAX_ADDRESS_LEN>, ZxError>
where
    S: Signer + ?Sized,
    E: AddressEncoder + ?Sized,
{
    let pubkey = signer.derive_pubkey(path)?;
    let hash = crypto::pubkey_hash(&crypto::compress_pubkey(&pubkey)?);

    let mut out = [0; MAX_ADDRESS_LEN];
    let len = encoder.encode(COIN_HRP, &hash, &mut out)?;

    let mut address = ArrayVec::new();
    address
        .try_extend_from_slice(out.get(..len).ok_or(ZxError::OutOfBounds)?)
        .map_err(|_| ZxError::BufferTooSmall)?;
    Ok(address)
}

/// Review and signature of a JSON transaction
pub struct SignUI<'b, 's, S: ?Sized> {
    path: Bip32Path,
    tx: JsonTx<'b>,
    hash: [u8; crypto::SHA256_LEN],
    signer: &'s S,
}

impl<'b, 's, S: Signer + ?Sized> SignUI<'b, 's, S> {
    /// Validates `request` and prepares its review.
    ///
    /// The address of the signing key is derived first, so messages
    /// sent from it are recognised
    pub fn new<E: AddressEncoder + ?Sized>(
        request: SignRequest<'b>,
        mode: AppMode,
        signer: &'s S,
        encoder: &E,
    ) -> Result<Self, SignError> {
        crate::sys::zemu_log_stack("SignUI::new");

        let own_address = cosmos_address(&request.path, signer, encoder)?;

        let mut tx = JsonTx::new(request.tx, &own_address, mode)?;
        tx.validate()?;

        Ok(Self {
            path: request.path,
            tx,
            hash: crypto::sha256(request.tx),
            signer,
        })
    }

    pub fn tx(&self) -> &JsonTx<'b> {
        &self.tx
    }
}

impl<'b, 's, S: Signer + ?Sized> Viewable for SignUI<'b, 's, S> {
    fn num_items(&mut self) -> Result<u8, ViewError> {
        self.tx.get_num_items().map_err(Into::into)
    }

    #[inline(never)]
    fn render_item(
        &mut self,
        item_n: u8,
        title: &mut [u8],
        message: &mut [u8],
        page: u8,
    ) -> Result<u8, ViewError> {
        self.tx
            .get_item(item_n, title, message, page)
            .map_err(Into::into)
    }

    /// Writes `r || s || v`
    fn accept(&mut self, out: &mut [u8]) -> Result<usize, ZxError> {
        let out = out.get_mut(..SIGNATURE_LEN).ok_or(ZxError::BufferTooSmall)?;
        let signature = self.signer.sign(&self.path, &self.hash)?;

        out[..32].copy_from_slice(&signature.r);
        out[32..64].copy_from_slice(&signature.s);
        out[64] = signature.v;

        Ok(SIGNATURE_LEN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_PATH;

    fn payload(path: &[u32], tx: &[u8]) -> std::vec::Vec<u8> {
        let mut out = Bip32Path::new(path.iter().copied())
            .unwrap()
            .serialize()
            .to_vec();
        out.extend_from_slice(tx);
        out
    }

    #[test]
    fn requests() {
        let data = payload(&DEFAULT_PATH, b"{}");
        let request = SignRequest::parse(&data).unwrap();
        assert_eq!(request.tx, b"{}");
        assert_eq!(request.path.components(), &DEFAULT_PATH[..]);

        let cosmos = [0x8000_002c, 0x8000_0076, 0x8000_0000, 0, 0];
        assert!(SignRequest::parse(&payload(&cosmos, b"{}")).is_ok());

        const SUITE: &[(&[u32], &[u8], ParserError)] = &[
            (&[0x8000_002c, 0x8000_0001, 0x8000_0000], b"{}", ParserError::InvalidPath),
            (&[0x8000_002c], b"{}", ParserError::InvalidPath),
            (&[0x8000_002c, 0x8000_003c], b"", ParserError::NoData),
        ];

        for (path, tx, expected) in SUITE {
            std::dbg!(path);
            assert_eq!(SignRequest::parse(&payload(path, tx)), Err(*expected));
        }

        assert_eq!(SignRequest::parse(&[]), Err(ParserError::UnexpectedBufferEnd));
    }
}
