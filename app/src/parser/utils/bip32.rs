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
use nom::number::complete::{be_u32, be_u8};

use crate::constants::{BIP44_PURPOSE, HARDENED, MAX_BIP32_PATH_DEPTH, U32_FORMATTED_SIZE};
use crate::parser::{u32_to_str, FromBytes, ParserError};

/// "m" plus, per component, a separator, the index and the hardened mark
pub const MAX_PATH_STR_LEN: usize = 1 + MAX_BIP32_PATH_DEPTH * (U32_FORMATTED_SIZE + 2);

/// Derivation path as received with a sign or address request
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(any(test, feature = "derive-debug"), derive(Debug))]
pub struct Bip32Path {
    components: ArrayVec<u32, MAX_BIP32_PATH_DEPTH>,
}

impl Bip32Path {
    pub fn new(components: impl IntoIterator<Item = u32>) -> Result<Self, ParserError> {
        let mut path = ArrayVec::new();
        for c in components {
            path.try_push(c).map_err(|_| ParserError::InvalidPath)?;
        }

        if path.is_empty() {
            return Err(ParserError::InvalidPath);
        }

        Ok(Self { components: path })
    }

    pub fn components(&self) -> &[u32] {
        &self.components
    }

    /// Checks the path starts with 44' followed by one of the allowed coin types
    pub fn validate(&self, coin_types: &[u32]) -> Result<(), ParserError> {
        match self.components.as_slice() {
            [purpose, coin, ..] if *purpose == BIP44_PURPOSE && coin_types.contains(coin) => Ok(()),
            _ => Err(ParserError::InvalidPath),
        }
    }

    /// Writes the path as `m/44'/60'/0'/0/0`
    pub fn render(&self) -> Result<ArrayVec<u8, MAX_PATH_STR_LEN>, ParserError> {
        let mut out = ArrayVec::new();
        out.try_push(b'm')?;

        let mut num = [0u8; U32_FORMATTED_SIZE];
        for c in self.components.iter() {
            out.try_push(b'/')?;
            out.try_extend_from_slice(u32_to_str(c & !HARDENED, &mut num)?)?;
            if c & HARDENED != 0 {
                out.try_push(b'\'')?;
            }
        }

        Ok(out)
    }

    pub fn serialize(&self) -> ArrayVec<u8, { 1 + MAX_BIP32_PATH_DEPTH * 4 }> {
        let mut out = ArrayVec::new();
        out.push(self.components.len() as u8);
        for c in self.components.iter() {
            // capacity is sized for the maximum depth
            let _ = out.try_extend_from_slice(&c.to_be_bytes());
        }
        out
    }
}

impl<'b> FromBytes<'b> for Bip32Path {
    #[inline(never)]
    fn from_bytes(input: &'b [u8]) -> Result<(&'b [u8], Self), nom::Err<ParserError>> {
        crate::sys::zemu_log_stack("Bip32Path::from_bytes");

        let (mut rem, num_components) = be_u8(input)?;
        if num_components == 0 || num_components as usize > MAX_BIP32_PATH_DEPTH {
            return Err(ParserError::InvalidPath.into());
        }

        let mut components = ArrayVec::new();
        for _ in 0..num_components {
            let (r, c) = be_u32(rem)?;
            rem = r;
            components.push(c);
        }

        Ok((rem, Self { components }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{COIN_TYPE_COSMOS, COIN_TYPE_ETH, DEFAULT_PATH};

    #[test]
    fn parse_and_render() {
        let path = Bip32Path::new(DEFAULT_PATH.iter().copied()).unwrap();
        let bytes = path.serialize();

        let (rem, parsed) = Bip32Path::from_bytes(&bytes).unwrap();
        assert!(rem.is_empty());
        assert_eq!(parsed, path);
        assert_eq!(&parsed.render().unwrap()[..], b"m/44'/60'/0'/0/0");
        assert!(parsed.validate(&[COIN_TYPE_ETH]).is_ok());
        assert_eq!(
            parsed.validate(&[COIN_TYPE_COSMOS]).unwrap_err(),
            ParserError::InvalidPath
        );
    }

    #[test]
    fn reject_bad_lengths() {
        assert!(Bip32Path::from_bytes(&[0]).is_err());
        assert!(Bip32Path::from_bytes(&[11]).is_err());
        // two components announced, one given
        assert!(Bip32Path::from_bytes(&[2, 0x80, 0, 0, 44]).is_err());
        assert!(Bip32Path::new(0..11).is_err());
    }
}
