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
use arrayref::array_ref;
use nom::bytes::complete::take;

use crate::{
    constants::{ADDRESS_LEN, ETH_ARG_LEN},
    handlers::handle_ui_message,
    parser::{FromBytes, ParserError},
    utils::hex_encode,
};

/// An EVM account address, borrowed from the transaction
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(any(test, feature = "derive-debug"), derive(Debug))]
pub struct Address<'b>(&'b [u8; ADDRESS_LEN]);

impl<'b> Address<'b> {
    pub fn raw_address(&self) -> &'b [u8; ADDRESS_LEN] {
        self.0
    }

    /// Reads an address from a 32 bytes abi word, which must be zero padded
    pub fn from_abi_word(input: &'b [u8]) -> Result<(&'b [u8], Self), nom::Err<ParserError>> {
        let (rem, word) = take(ETH_ARG_LEN)(input)?;
        let (padding, address) = word.split_at(ETH_ARG_LEN - ADDRESS_LEN);
        if padding.iter().any(|b| *b != 0) {
            return Err(ParserError::InvalidAddress.into());
        }

        Ok((rem, Self(array_ref!(address, 0, ADDRESS_LEN))))
    }

    /// `0x` followed by the lowercase hex of the address
    pub fn render_eth_address(&self, message: &mut [u8], page: u8) -> Result<u8, ParserError> {
        const PREFIX: &[u8] = b"0x";

        let mut out = [0; ADDRESS_LEN * 2 + 2];
        out[..PREFIX.len()].copy_from_slice(PREFIX);
        let sz = PREFIX.len() + hex_encode(self.0, &mut out[PREFIX.len()..])?;

        handle_ui_message(&out[..sz], message, page)
    }
}

impl<'b> FromBytes<'b> for Address<'b> {
    #[inline(never)]
    fn from_bytes(input: &'b [u8]) -> Result<(&'b [u8], Self), nom::Err<ParserError>> {
        let (rem, addr) = take(ADDRESS_LEN)(input)?;
        Ok((rem, Self(array_ref!(addr, 0, ADDRESS_LEN))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::strlen;

    #[test]
    fn render() {
        let raw = [0xAB; ADDRESS_LEN];
        let (_, address) = Address::from_bytes(&raw).unwrap();

        let mut message = [0; 50];
        assert_eq!(address.render_eth_address(&mut message, 0), Ok(1));
        let len = strlen(&message);
        assert_eq!(&message[..2], b"0x");
        assert_eq!(&message[2..len], "ab".repeat(ADDRESS_LEN).as_bytes());
    }

    #[test]
    fn abi_words() {
        let mut word = [0u8; ETH_ARG_LEN];
        word[12..].copy_from_slice(&[0x11; ADDRESS_LEN]);
        let (rem, address) = Address::from_abi_word(&word).unwrap();
        assert!(rem.is_empty());
        assert_eq!(address.raw_address(), &[0x11; ADDRESS_LEN]);

        word[0] = 1;
        assert_eq!(
            Address::from_abi_word(&word).map_err(ParserError::from),
            Err(ParserError::InvalidAddress)
        );
        assert!(Address::from_abi_word(&word[..31]).is_err());
    }

    #[test]
    fn short_input() {
        assert_eq!(
            Address::from_bytes(&[0; 19]).map_err(ParserError::from),
            Err(ParserError::UnexpectedBufferEnd)
        );
    }
}
