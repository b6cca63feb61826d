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
use crate::{
    constants::{ADDRESS_LEN, COIN_TYPE_COSMOS, COIN_TYPE_ETH, SECP256K1_PK_LEN},
    crypto::{self, Signer},
    handlers::{handle_ui_message, write_title, SignError},
    parser::{Bip32Path, ParserError},
    sys::{ViewError, Viewable},
    utils::{hex_encode, AppMode},
    ZxError,
};

const ADDRESS_HEX_LEN: usize = ADDRESS_LEN * 2;

/// Review of the EVM address of a key
pub struct AddrUI {
    path: Bip32Path,
    mode: AppMode,
    pubkey: [u8; SECP256K1_PK_LEN],
    address: [u8; ADDRESS_LEN],
}

impl AddrUI {
    pub fn new<S: Signer + ?Sized>(
        path: Bip32Path,
        mode: AppMode,
        signer: &S,
    ) -> Result<Self, SignError> {
        crate::sys::zemu_log_stack("EthAddrUI::new");
        path.validate(&[COIN_TYPE_ETH, COIN_TYPE_COSMOS])?;

        let pubkey = signer.derive_pubkey(&path)?;
        let address = crypto::eth_address(&pubkey);

        Ok(Self {
            path,
            mode,
            pubkey,
            address,
        })
    }

    /// Lowercase hex of the address, without prefix
    fn address_hex(&self) -> Result<[u8; ADDRESS_HEX_LEN], ParserError> {
        let mut out = [0; ADDRESS_HEX_LEN];
        hex_encode(self.address, &mut out)?;
        Ok(out)
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
                write_title(title, b"EVM Address")?;

                let mut text = [0; ADDRESS_HEX_LEN + 2];
                text[..2].copy_from_slice(b"0x");
                text[2..].copy_from_slice(&self.address_hex()?);
                handle_ui_message(&text, message, page)
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

    /// Writes the length prefixed public key, then the length
    /// prefixed hex address
    fn accept(&mut self, out: &mut [u8]) -> Result<usize, ZxError> {
        const LEN: usize = 1 + SECP256K1_PK_LEN + 1 + ADDRESS_HEX_LEN;

        let out = out.get_mut(..LEN).ok_or(ZxError::BufferTooSmall)?;
        let hex = self.address_hex().map_err(|_| ZxError::EncodingFailed)?;

        out[0] = SECP256K1_PK_LEN as u8;
        out[1..1 + SECP256K1_PK_LEN].copy_from_slice(&self.pubkey);
        out[1 + SECP256K1_PK_LEN] = ADDRESS_HEX_LEN as u8;
        out[2 + SECP256K1_PK_LEN..].copy_from_slice(&hex);

        Ok(LEN)
    }
}
