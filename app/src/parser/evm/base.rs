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
use super::{parse_rlp_item, Address, EthData};
use crate::{
    constants::{ADDRESS_LEN, U256_LEN},
    parser::{FromBytes, ParserError},
};

/// Reads an rlp scalar, which must fit an uint256
pub fn parse_scalar(input: &[u8]) -> Result<(&[u8], &[u8]), nom::Err<ParserError>> {
    let (rem, scalar) = parse_rlp_item(input)?;
    if scalar.len() > U256_LEN {
        return Err(ParserError::ValueOutOfRange.into());
    }

    Ok((rem, scalar))
}

/// Reads the destination, empty when the transaction creates a contract
pub fn parse_to(input: &[u8]) -> Result<(&[u8], Option<Address<'_>>), nom::Err<ParserError>> {
    let (rem, raw_address) = parse_rlp_item(input)?;

    let address = match raw_address.len() {
        0 => None,
        ADDRESS_LEN => Some(Address::from_bytes(raw_address)?.1),
        _ => return Err(ParserError::InvalidAddress.into()),
    };

    Ok((rem, address))
}

/// Fields shared by legacy and EIP-2930 transactions
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(any(test, feature = "derive-debug"), derive(Debug))]
pub struct BaseLegacy<'b> {
    pub nonce: &'b [u8],
    pub gas_price: &'b [u8],
    pub gas_limit: &'b [u8],
    pub to: Option<Address<'b>>,
    pub value: &'b [u8],
    pub data: EthData<'b>,
}

impl<'b> FromBytes<'b> for BaseLegacy<'b> {
    #[inline(never)]
    fn from_bytes(input: &'b [u8]) -> Result<(&'b [u8], Self), nom::Err<ParserError>> {
        crate::sys::zemu_log_stack("BaseLegacy::from_bytes");

        let (rem, nonce) = parse_scalar(input)?;
        let (rem, gas_price) = parse_scalar(rem)?;
        let (rem, gas_limit) = parse_scalar(rem)?;
        let (rem, to) = parse_to(rem)?;
        let (rem, value) = parse_scalar(rem)?;
        let (rem, data) = EthData::parse(&to, value, rem)?;

        Ok((
            rem,
            Self {
                nonce,
                gas_price,
                gas_limit,
                to,
                value,
                data,
            },
        ))
    }
}
