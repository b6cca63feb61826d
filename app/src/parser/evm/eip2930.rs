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
use super::{base::parse_scalar, parse_rlp_list, BaseLegacy};
use crate::parser::{FromBytes, ParserError};

/// Type 1 transaction, a legacy one with an access list
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(any(test, feature = "derive-debug"), derive(Debug))]
pub struct Eip2930<'b> {
    pub chain_id: &'b [u8],
    pub base: BaseLegacy<'b>,
    pub access_list: &'b [u8],
}

impl<'b> FromBytes<'b> for Eip2930<'b> {
    #[inline(never)]
    fn from_bytes(input: &'b [u8]) -> Result<(&'b [u8], Self), nom::Err<ParserError>> {
        crate::sys::zemu_log_stack("Eip2930::from_bytes");

        let (rem, chain_id) = parse_scalar(input)?;
        if chain_id.is_empty() {
            return Err(ParserError::InvalidChainId.into());
        }

        let (rem, base) = BaseLegacy::from_bytes(rem)?;
        let (rem, access_list) = parse_rlp_list(rem)?;

        // the unsigned payload ends with the access list
        if !rem.is_empty() {
            return Err(ParserError::UnexpectedData.into());
        }

        Ok((
            rem,
            Self {
                chain_id,
                base,
                access_list,
            },
        ))
    }
}
