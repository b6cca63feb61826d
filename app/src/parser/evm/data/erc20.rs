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
use nom::{bytes::complete::take, number::complete::be_u32};

use crate::{
    constants::ETH_ARG_LEN,
    parser::{evm::Address, ParserError},
};

/// Reads an uint256 abi word
fn parse_word(input: &[u8]) -> Result<(&[u8], &[u8]), nom::Err<ParserError>> {
    take(ETH_ARG_LEN)(input)
}

#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(any(test, feature = "derive-debug"), derive(Debug))]
pub struct Transfer<'b> {
    pub to: Address<'b>,
    pub value: &'b [u8],
}

impl<'b> Transfer<'b> {
    pub const SELECTOR: u32 = 0xa9059cbb;

    fn parse(input: &'b [u8]) -> Result<(&'b [u8], Self), nom::Err<ParserError>> {
        crate::sys::zemu_log_stack("ERC20Transfer::parse");

        let (rem, to) = Address::from_abi_word(input)?;
        let (rem, value) = parse_word(rem)?;

        Ok((rem, Self { to, value }))
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(any(test, feature = "derive-debug"), derive(Debug))]
pub struct TransferFrom<'b> {
    pub from: Address<'b>,
    pub to: Address<'b>,
    pub value: &'b [u8],
}

impl<'b> TransferFrom<'b> {
    pub const SELECTOR: u32 = 0x23b872dd;

    fn parse(input: &'b [u8]) -> Result<(&'b [u8], Self), nom::Err<ParserError>> {
        crate::sys::zemu_log_stack("ERC20TransferFrom::parse");

        let (rem, from) = Address::from_abi_word(input)?;
        let (rem, to) = Address::from_abi_word(rem)?;
        if from == to {
            return Err(ParserError::InvalidEthMessage.into());
        }
        let (rem, value) = parse_word(rem)?;

        Ok((rem, Self { from, to, value }))
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(any(test, feature = "derive-debug"), derive(Debug))]
pub struct Approve<'b> {
    pub spender: Address<'b>,
    pub value: &'b [u8],
}

impl<'b> Approve<'b> {
    pub const SELECTOR: u32 = 0x095ea7b3;

    fn parse(input: &'b [u8]) -> Result<(&'b [u8], Self), nom::Err<ParserError>> {
        crate::sys::zemu_log_stack("ERC20Approve::parse");

        let (rem, spender) = Address::from_abi_word(input)?;
        let (rem, value) = parse_word(rem)?;

        Ok((rem, Self { spender, value }))
    }
}

/// An ERC-20 call that moves or allows moving tokens.
///
/// Calldata is a 4 bytes selector followed by 32 bytes words,
/// addresses are left padded with zeros. Only these signatures are
/// recognised, `view` methods make no sense in a transaction:
/**
```solidity
function transfer(address _to, uint256 _value) public returns (bool success)
function transferFrom(address _from, address _to, uint256 _value) public returns (bool success)
function approve(address _spender, uint256 _value) public returns (bool success)
```
*/
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(any(test, feature = "derive-debug"), derive(Debug))]
pub enum ERC20<'b> {
    Transfer(Transfer<'b>),
    TransferFrom(TransferFrom<'b>),
    Approve(Approve<'b>),
}

impl<'b> ERC20<'b> {
    pub fn method_name(&self) -> &'static [u8] {
        match self {
            ERC20::Transfer(_) => b"transfer",
            ERC20::TransferFrom(_) => b"transferFrom",
            ERC20::Approve(_) => b"approve",
        }
    }

    /// Token amount, a raw big-endian uint256
    pub fn value(&self) -> &'b [u8] {
        match self {
            ERC20::Transfer(t) => t.value,
            ERC20::TransferFrom(t) => t.value,
            ERC20::Approve(a) => a.value,
        }
    }

    /// Parses the whole calldata, trailing bytes are refused
    pub fn parse(data: &'b [u8]) -> Result<Self, ParserError> {
        let (rem, selector) = be_u32::<_, ParserError>(data)?;

        let (rem, this) = match selector {
            Transfer::SELECTOR => {
                let (rem, t) = Transfer::parse(rem)?;
                (rem, Self::Transfer(t))
            }
            TransferFrom::SELECTOR => {
                let (rem, t) = TransferFrom::parse(rem)?;
                (rem, Self::TransferFrom(t))
            }
            Approve::SELECTOR => {
                let (rem, a) = Approve::parse(rem)?;
                (rem, Self::Approve(a))
            }
            _ => return Err(ParserError::InvalidEthSelector),
        };

        if !rem.is_empty() {
            return Err(ParserError::UnexpectedData);
        }

        Ok(this)
    }
}
