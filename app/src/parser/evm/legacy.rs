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
use super::{parse_rlp_item, BaseLegacy};
use crate::parser::{FromBytes, ParserError};

/// A legacy transaction, either EIP-155 or the older 6 fields form
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(any(test, feature = "derive-debug"), derive(Debug))]
pub struct Legacy<'b> {
    pub base: BaseLegacy<'b>,
    // r and s follow and must be empty
    chain_id: Option<&'b [u8]>,
}

impl<'b> Legacy<'b> {
    pub fn chain_id(&self) -> Option<&'b [u8]> {
        self.chain_id
    }
}

impl<'b> FromBytes<'b> for Legacy<'b> {
    #[inline(never)]
    fn from_bytes(input: &'b [u8]) -> Result<(&'b [u8], Self), nom::Err<ParserError>> {
        crate::sys::zemu_log_stack("Legacy::from_bytes");

        let (rem, base) = BaseLegacy::from_bytes(input)?;

        // pre EIP-155, not replay protected
        if rem.is_empty() {
            return Ok((
                rem,
                Self {
                    base,
                    chain_id: None,
                },
            ));
        }

        let (rem, id_bytes) = super::base::parse_scalar(rem)?;
        let (rem, r) = parse_rlp_item(rem)?;
        let (rem, s) = parse_rlp_item(rem)?;
        if !r.is_empty() || !s.is_empty() {
            return Err(ParserError::UnexpectedData.into());
        }

        let chain_id = Some(id_bytes).filter(|id| !id.is_empty());

        Ok((rem, Self { base, chain_id }))
    }
}
