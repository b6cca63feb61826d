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
    constants::{COIN_TYPE_COSMOS, COIN_TYPE_ETH, MAX_ADDRESS_LEN, SECP256K1_COMPRESSED_PK_LEN},
    crypto::{self, AddressEncoder, Signer},
    handlers::{handle_ui_message, signing::cosmos_address, write_title, SignError},
    parser::{Bip32Path, ParserError},
    sys::{ViewError, Viewable},
    utils::AppMode,
    ZxError,
};

/// Review of the bech32 address of a key
pub struct AddrUI {
    path: Bip32Path,
    mode: AppMode,
    pubkey: [u8; SECP256K1_COMPRESSED_PK_LEN],
    address: ArrayVec<u8, MAX_ADDRESS_LEN>,
}

impl AddrUI {
    pub fn new<S, E>(
        path: Bip32Path,
        mode: AppMode,
        signer: &S,
        encoder: &E,
    ) -> Result<Self, SignError>
    where
        S: Signer + ?Sized,
        E: AddressEncoder + ?Sized,
    {
        crate::sys::zemu_log_stack("AddrUI::new");
        path.validate(&[COIN_TYPE_COSMOS, COIN_TYPE_ETH])?;

        let pubkey = crypto::compress_pubkey(&signer.derive_pubkey(&path)?)?;
        let address = cosmos_address(&path, signer, encoder)?;

        Ok(Self {
            path,
            mode,
            pubkey,
            address,
        })
    }

    pub fn address(&self) -> &[u8] {
        &self.address
    }

    fn render(
        &self,
        item_n: u8,
        title: &mut [u8],
        message: &mut [u8],
        page: u8,
    ) -> Result<u8, ParserError> {
        match item_n {
            0 => {
                write_title(title, b"Address")?;
                handle_ui_message(&self.address, message, page)
            }
            1 if self.mode.expert => {
                write_title(title, b"Path")?;
                handle_ui_message(&self.path.render()?, message, page)
            }
            _ => Err(ParserError::DisplayIdxOutOfRange),
        }
    }
}

impl Viewable for AddrUI {
    fn num_items(&mut self) -> Result<u8, ViewError> {
        Ok(1 + self.mode.expert as u8)
    }

    fn render_item(
        &mut self,
        item_n: u8,
        title: &mut [u8],
        message: &mut [u8],
        page: u8,
    ) -> Result<u8, ViewError> {
        self.render(item_n, title, message, page)
            .map_err(Into::into)
    }

    /// Writes the compressed public key followed by the address
    fn accept(&mut self, out: &mut [u8]) -> Result<usize, ZxError> {
        let len = SECP256K1_COMPRESSED_PK_LEN + self.address.len();
        let out = out.get_mut(..len).ok_or(ZxError::BufferTooSmall)?;

        out[..SECP256K1_COMPRESSED_PK_LEN].copy_from_slice(&self.pubkey);
        out[SECP256K1_COMPRESSED_PK_LEN..].copy_from_slice(&self.address);

        Ok(len)
    }
}
