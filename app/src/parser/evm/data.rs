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
use cfg_if::cfg_if;

use super::{parse_rlp_item, Address};
use crate::parser::ParserError;

#[cfg(feature = "erc20")]
mod erc20;
#[cfg(feature = "erc20")]
pub use erc20::ERC20;

/// What the calldata of a transaction does
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(any(test, feature = "derive-debug"), derive(Debug))]
pub enum EthData<'b> {
    /// plain value transfer
    None,
    /// contract creation, holds the init code
    Deploy(&'b [u8]),
    /// calldata we can't decode, holds the raw calldata
    ContractCall(&'b [u8]),
    #[cfg(feature = "erc20")]
    Erc20(ERC20<'b>),
}

impl<'b> EthData<'b> {
    /// Parses the data item that follows `to` and `value`
    pub fn parse(
        to: &Option<Address<'b>>,
        value: &[u8],
        input: &'b [u8],
    ) -> Result<(&'b [u8], Self), nom::Err<ParserError>> {
        let (rem, data) = parse_rlp_item(input)?;

        let this = match (to, data.is_empty()) {
            // no destination and nothing to deploy
            (None, true) => return Err(ParserError::InvalidTransactionType.into()),
            (None, false) => Self::Deploy(data),
            (Some(_), true) => Self::None,
            (Some(_), false) => Self::classify_call(value, data),
        };

        Ok((rem, this))
    }

    fn classify_call(value: &[u8], data: &'b [u8]) -> Self {
        cfg_if! {
            if #[cfg(feature = "erc20")] {
                // a token call also moving native value is shown as what it is, a blind call
                if value.iter().any(|b| *b != 0) {
                    return Self::ContractCall(data);
                }

                match ERC20::parse(data) {
                    Ok(token) => Self::Erc20(token),
                    Err(e) => {
                        log::debug!("calldata is not an ERC-20 call: {}", e as u32);
                        Self::ContractCall(data)
                    }
                }
            } else {
                let _ = value;
                Self::ContractCall(data)
            }
        }
    }

    /// Deployments and undecoded calls can only be signed blindly
    pub fn requires_blind_sign(&self) -> bool {
        matches!(self, Self::Deploy(_) | Self::ContractCall(_))
    }
}
