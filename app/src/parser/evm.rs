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
use core::{convert::TryFrom, fmt::Write};

use arrayvec::{ArrayString, ArrayVec};
use ethereum_types::U256;

use crate::{
    constants::{DEPLOY_DATA_PREVIEW_LEN, EVM_DECIMALS, FORMATTED_NUMBER_LEN, SEI_TOKEN_SYMBOL},
    handlers::{handle_ui_message, write_title},
    parser::{fpstr_with_symbol, DisplayableItem, FromBytes, ParserError},
    sys::ViewError,
    utils::{hex_encode, AppMode},
};

mod address;
mod base;
mod data;
mod eip1559;
mod eip2930;
mod legacy;
mod rlp;

pub use address::Address;
pub use base::BaseLegacy;
#[cfg(feature = "erc20")]
pub use data::ERC20;
pub use data::EthData;
pub use eip1559::Eip1559;
pub use eip2930::Eip2930;
pub use legacy::Legacy;
pub use rlp::{
    bytes_to_u64, get_tx_rlp_len, get_tx_total_len, parse_rlp_item, parse_rlp_list, EIP1559_TX,
    EIP2930_TX,
};

/// Largest review: a token `transferFrom` in expert mode
const MAX_EVM_ITEMS: usize = 12;

#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(any(test, feature = "derive-debug"), derive(Debug))]
pub enum EthTransaction<'b> {
    Legacy(Legacy<'b>),
    Eip2930(Eip2930<'b>),
    Eip1559(Eip1559<'b>),
}

impl<'b> EthTransaction<'b> {
    /// Parses a whole transaction, `input` must hold nothing else
    pub fn new(input: &'b [u8]) -> Result<Self, ParserError> {
        let (_, tx) = Self::from_bytes(input)?;
        Ok(tx)
    }

    pub fn is_typed_tx(&self) -> bool {
        !matches!(self, Self::Legacy(_))
    }

    /// Missing for pre EIP-155 legacy transactions
    pub fn chain_id(&self) -> Option<&'b [u8]> {
        match self {
            Self::Legacy(t) => t.chain_id(),
            Self::Eip2930(t) => Some(t.chain_id),
            Self::Eip1559(t) => Some(t.chain_id),
        }
    }

    pub fn nonce(&self) -> &'b [u8] {
        match self {
            Self::Legacy(t) => t.base.nonce,
            Self::Eip2930(t) => t.base.nonce,
            Self::Eip1559(t) => t.nonce,
        }
    }

    pub fn gas_limit(&self) -> &'b [u8] {
        match self {
            Self::Legacy(t) => t.base.gas_limit,
            Self::Eip2930(t) => t.base.gas_limit,
            Self::Eip1559(t) => t.gas_limit,
        }
    }

    /// Gas price, or the fee cap of an EIP-1559 transaction
    pub fn max_gas_price(&self) -> &'b [u8] {
        match self {
            Self::Legacy(t) => t.base.gas_price,
            Self::Eip2930(t) => t.base.gas_price,
            Self::Eip1559(t) => t.max_fee,
        }
    }

    pub fn priority_fee(&self) -> Option<&'b [u8]> {
        match self {
            Self::Eip1559(t) => Some(t.priority_fee),
            _ => None,
        }
    }

    pub fn to(&self) -> Option<Address<'b>> {
        match self {
            Self::Legacy(t) => t.base.to,
            Self::Eip2930(t) => t.base.to,
            Self::Eip1559(t) => t.to,
        }
    }

    pub fn value(&self) -> &'b [u8] {
        match self {
            Self::Legacy(t) => t.base.value,
            Self::Eip2930(t) => t.base.value,
            Self::Eip1559(t) => t.value,
        }
    }

    pub fn data(&self) -> EthData<'b> {
        match self {
            Self::Legacy(t) => t.base.data,
            Self::Eip2930(t) => t.base.data,
            Self::Eip1559(t) => t.data,
        }
    }

    /// Upper bound of the fees, gas limit times the (maximum) gas price
    pub fn max_fees(&self) -> ethereum_types::U512 {
        let gas_limit = U256::from_big_endian(self.gas_limit());
        gas_limit.full_mul(U256::from_big_endian(self.max_gas_price()))
    }

    /// Least significant byte of the chain id, enough to compute
    /// a legacy signature `v`
    pub fn chain_id_low_byte(&self) -> Option<u8> {
        self.chain_id().and_then(|id| id.last().copied())
    }
}

impl<'b> FromBytes<'b> for EthTransaction<'b> {
    #[inline(never)]
    fn from_bytes(input: &'b [u8]) -> Result<(&'b [u8], Self), nom::Err<ParserError>> {
        crate::sys::zemu_log_stack("EthTransaction::from_bytes");

        // eip2718: version || rlp([fields]), legacy carries no version
        let (version, rem) = match input.first() {
            Some(&v) if v == EIP2930_TX || v == EIP1559_TX => (Some(v), &input[1..]),
            Some(_) => (None, input),
            None => return Err(ParserError::UnexpectedBufferEnd.into()),
        };

        let (rem, payload) = parse_rlp_list(rem)?;
        if !rem.is_empty() {
            return Err(ParserError::UnexpectedData.into());
        }

        let (left, tx) = match version {
            Some(EIP2930_TX) => {
                let (left, tx) = Eip2930::from_bytes(payload)?;
                (left, Self::Eip2930(tx))
            }
            Some(_) => {
                let (left, tx) = Eip1559::from_bytes(payload)?;
                (left, Self::Eip1559(tx))
            }
            None => {
                let (left, tx) = Legacy::from_bytes(payload)?;
                (left, Self::Legacy(tx))
            }
        };

        if !left.is_empty() {
            return Err(ParserError::UnexpectedData.into());
        }

        Ok((rem, tx))
    }
}

/// How the value of a review item is rendered
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(any(test, feature = "derive-debug"), derive(Debug))]
enum EvmValue<'b> {
    Address(Address<'b>),
    /// wei, shown in SEI
    Native(&'b [u8]),
    /// big-endian integer shown as is
    Integer(&'b [u8]),
    Text(&'static [u8]),
    Calldata(&'b [u8]),
    MaxFees,
}

#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(any(test, feature = "derive-debug"), derive(Debug))]
struct EvmItem<'b> {
    title: &'static [u8],
    value: EvmValue<'b>,
}

impl<'b> EvmItem<'b> {
    const fn new(title: &'static [u8], value: EvmValue<'b>) -> Self {
        Self { title, value }
    }
}

/// Review of an EVM transaction.
///
/// The list of items is fixed when the review is built,
/// rendering is then a lookup.
pub struct EthReview<'b> {
    tx: EthTransaction<'b>,
    mode: AppMode,
    items: ArrayVec<EvmItem<'b>, MAX_EVM_ITEMS>,
}

impl<'b> EthReview<'b> {
    /// Parses `input` and prepares its review.
    ///
    /// Deployments and undecoded contract calls are refused
    /// unless blind signing is enabled
    pub fn parse(input: &'b [u8], mode: AppMode) -> Result<Self, ParserError> {
        Self::new(EthTransaction::new(input)?, mode)
    }

    pub fn new(tx: EthTransaction<'b>, mode: AppMode) -> Result<Self, ParserError> {
        crate::sys::zemu_log_stack("EthReview::new");

        if tx.data().requires_blind_sign() && !mode.blind_sign {
            log::debug!("refusing a blind signature, blind signing is disabled");
            return Err(ParserError::BlindSignNotEnabled);
        }

        let mut this = Self {
            tx,
            mode,
            items: ArrayVec::new(),
        };
        this.collect_items()?;

        Ok(this)
    }

    pub fn tx(&self) -> &EthTransaction<'b> {
        &self.tx
    }

    pub fn mode(&self) -> AppMode {
        self.mode
    }

    fn collect_items(&mut self) -> Result<(), ParserError> {
        let tx = self.tx;
        let items = &mut self.items;

        match tx.data() {
            EthData::None => {
                let to = tx.to().ok_or(ParserError::InvalidAddress)?;
                items.try_push(EvmItem::new(b"To", EvmValue::Address(to)))?;
                items.try_push(EvmItem::new(b"Amount", EvmValue::Native(tx.value())))?;
            }
            #[cfg(feature = "erc20")]
            EthData::Erc20(token) => {
                let contract = tx.to().ok_or(ParserError::InvalidAddress)?;
                items.try_push(EvmItem::new(b"ERC-20", EvmValue::Text(token.method_name())))?;
                items.try_push(EvmItem::new(b"Contract", EvmValue::Address(contract)))?;

                match token {
                    ERC20::Transfer(t) => {
                        items.try_push(EvmItem::new(b"To", EvmValue::Address(t.to)))?;
                    }
                    ERC20::TransferFrom(t) => {
                        items.try_push(EvmItem::new(b"From", EvmValue::Address(t.from)))?;
                        items.try_push(EvmItem::new(b"To", EvmValue::Address(t.to)))?;
                    }
                    ERC20::Approve(a) => {
                        items.try_push(EvmItem::new(b"Spender", EvmValue::Address(a.spender)))?;
                    }
                }
                items.try_push(EvmItem::new(b"Amount", EvmValue::Integer(token.value())))?;
            }
            EthData::Deploy(code) => {
                items.try_push(EvmItem::new(b"Contract", EvmValue::Text(b"Deploy")))?;
                items.try_push(EvmItem::new(b"Amount", EvmValue::Native(tx.value())))?;
                items.try_push(EvmItem::new(b"Contract Data", EvmValue::Calldata(code)))?;
            }
            EthData::ContractCall(calldata) => {
                let to = tx.to().ok_or(ParserError::InvalidAddress)?;
                items.try_push(EvmItem::new(b"To", EvmValue::Address(to)))?;
                items.try_push(EvmItem::new(b"Amount", EvmValue::Native(tx.value())))?;
                items.try_push(EvmItem::new(b"Contract Data", EvmValue::Calldata(calldata)))?;
            }
        }

        if self.mode.expert {
            items.try_push(EvmItem::new(b"Nonce", EvmValue::Integer(tx.nonce())))?;
            items.try_push(EvmItem::new(b"Gas Limit", EvmValue::Integer(tx.gas_limit())))?;
            match tx.priority_fee() {
                Some(priority) => {
                    let max_fee = tx.max_gas_price();
                    items.try_push(EvmItem::new(b"Max Priority Fee", EvmValue::Integer(priority)))?;
                    items.try_push(EvmItem::new(b"Max Fee", EvmValue::Integer(max_fee)))?;
                }
                None => {
                    let price = tx.max_gas_price();
                    items.try_push(EvmItem::new(b"Gas Price", EvmValue::Integer(price)))?;
                }
            }
        }

        items.try_push(EvmItem::new(b"Max Fees", EvmValue::MaxFees))?;

        if let Some(chain_id) = tx.chain_id() {
            items.try_push(EvmItem::new(b"Chain ID", EvmValue::Integer(chain_id)))?;
        }

        Ok(())
    }

    pub fn get_num_items(&self) -> Result<u8, ParserError> {
        u8::try_from(self.items.len()).map_err(|_| ParserError::UnexpectedNumberItems)
    }

    #[inline(never)]
    pub fn get_item(
        &self,
        item_n: u8,
        title: &mut [u8],
        message: &mut [u8],
        page: u8,
    ) -> Result<u8, ParserError> {
        crate::sys::zemu_log_stack("EthReview::get_item");

        let item = self
            .items
            .get(item_n as usize)
            .ok_or(ParserError::DisplayIdxOutOfRange)?;

        message.iter_mut().for_each(|b| *b = 0);
        write_title(title, item.title)?;

        let result = match item.value {
            EvmValue::Address(address) => address.render_eth_address(message, page),
            EvmValue::Native(wei) => {
                render_u256(wei, EVM_DECIMALS, SEI_TOKEN_SYMBOL, message, page)
            }
            EvmValue::Integer(raw) => render_u256(raw, 0, "", message, page),
            EvmValue::Text(text) => handle_ui_message(text, message, page),
            EvmValue::Calldata(data) => render_calldata(data, message, page),
            EvmValue::MaxFees => {
                render_number(self.tx.max_fees(), EVM_DECIMALS, SEI_TOKEN_SYMBOL, message, page)
            }
        };

        // nothing partial is ever shown
        if result.is_err() {
            message.iter_mut().for_each(|b| *b = 0);
        }
        result
    }
}

impl<'b> DisplayableItem for EthReview<'b> {
    fn num_items(&self) -> Result<u8, ViewError> {
        self.get_num_items().map_err(Into::into)
    }

    #[inline(never)]
    fn render_item(
        &self,
        item_n: u8,
        title: &mut [u8],
        message: &mut [u8],
        page: u8,
    ) -> Result<u8, ViewError> {
        self.get_item(item_n, title, message, page)
            .map_err(Into::into)
    }
}

/// Renders a big-endian scalar of at most 32 bytes with `decimals`
/// fractional places, followed by `symbol` if not empty
pub fn render_u256(
    raw: &[u8],
    decimals: usize,
    symbol: &str,
    message: &mut [u8],
    page: u8,
) -> Result<u8, ParserError> {
    if raw.len() > crate::constants::U256_LEN {
        return Err(ParserError::ValueOutOfRange);
    }

    render_number(U256::from_big_endian(raw), decimals, symbol, message, page)
}

fn render_number(
    number: impl core::fmt::Display,
    decimals: usize,
    symbol: &str,
    message: &mut [u8],
    page: u8,
) -> Result<u8, ParserError> {
    let mut digits = ArrayString::<FORMATTED_NUMBER_LEN>::new();
    write!(digits, "{}", number).map_err(|_| ParserError::BufferTooSmall)?;

    let text: ArrayVec<u8, FORMATTED_NUMBER_LEN> =
        fpstr_with_symbol(digits.as_bytes(), decimals, symbol.as_bytes())?;

    handle_ui_message(&text, message, page)
}

/// `0x` and the hex of the first calldata bytes, `...` marks a cut
fn render_calldata(data: &[u8], message: &mut [u8], page: u8) -> Result<u8, ParserError> {
    const PREFIX: &[u8] = b"0x";
    const ELLIPSIS: &[u8] = b"...";

    let mut out: ArrayVec<u8, { 2 + DEPLOY_DATA_PREVIEW_LEN * 2 + 3 }> = ArrayVec::new();
    out.try_extend_from_slice(PREFIX)?;

    let preview = &data[..data.len().min(DEPLOY_DATA_PREVIEW_LEN)];
    let mut hex = [0u8; DEPLOY_DATA_PREVIEW_LEN * 2];
    let len = hex_encode(preview, &mut hex)?;
    out.try_extend_from_slice(&hex[..len])?;

    if data.len() > DEPLOY_DATA_PREVIEW_LEN {
        out.try_extend_from_slice(ELLIPSIS)?;
    }

    handle_ui_message(&out, message, page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::strlen;
    use std::{
        string::{String, ToString},
        vec::Vec,
    };

    const TRANSFER_2930: &str = "01ed820531058504a817c800825208943535353535353535353535353535353535353535880de0b6b3a764000080c0";
    const TRANSFER_1559: &str = "02f182053180843b9aca0084b2d05e008252089435353535353535353535353535353535353535358822b1c8c1227a000080c0";
    const CALL_LEGACY: &str = "f83902843b9aca0082c3509435353535353535353535353535353535353535358094d0e30db0000102030405060708090a0b0c0d0e0f8205318080";

    fn review(tx: &str, mode: AppMode) -> Result<Vec<(String, String)>, ParserError> {
        let bytes = hex::decode(tx).unwrap();
        let review = EthReview::parse(&bytes, mode)?;

        let mut items = Vec::new();
        for idx in 0..review.get_num_items()? {
            let mut title = [0u8; 40];
            let mut message = [0u8; 200];
            review.get_item(idx, &mut title, &mut message, 0)?;

            let title = String::from_utf8(title[..strlen(&title)].to_vec()).unwrap();
            let message = String::from_utf8(message[..strlen(&message)].to_vec()).unwrap();
            items.push((title, message));
        }
        Ok(items)
    }

    fn pairs(expected: &[(&str, &str)]) -> Vec<(String, String)> {
        expected
            .iter()
            .map(|(k, v)| (String::from(*k), String::from(*v)))
            .collect()
    }

    #[test]
    fn eip2930_transfer() {
        let items = review(TRANSFER_2930, AppMode::default()).unwrap();
        assert_eq!(
            items,
            pairs(&[
                ("To", "0x3535353535353535353535353535353535353535"),
                ("Amount", "1 SEI"),
                ("Max Fees", "0.00042 SEI"),
                ("Chain ID", "1329"),
            ])
        );
    }

    #[test]
    fn eip1559_transfer_expert() {
        let items = review(TRANSFER_1559, AppMode::expert()).unwrap();
        assert_eq!(
            items,
            pairs(&[
                ("To", "0x3535353535353535353535353535353535353535"),
                ("Amount", "2.5 SEI"),
                ("Nonce", "0"),
                ("Gas Limit", "21000"),
                ("Max Priority Fee", "1000000000"),
                ("Max Fee", "3000000000"),
                ("Max Fees", "0.000063 SEI"),
                ("Chain ID", "1329"),
            ])
        );
    }

    #[test]
    fn contract_calls_need_blind_signing() {
        assert_eq!(
            review(CALL_LEGACY, AppMode::default()),
            Err(ParserError::BlindSignNotEnabled)
        );

        let items = review(CALL_LEGACY, AppMode::default().with_blind_sign()).unwrap();
        assert_eq!(
            items,
            pairs(&[
                ("To", "0x3535353535353535353535353535353535353535"),
                ("Amount", "0 SEI"),
                ("Contract Data", "0xd0e30db0000102030405060708090a0b..."),
                ("Max Fees", "0.00005 SEI"),
                ("Chain ID", "1329"),
            ])
        );
    }

    #[test]
    #[cfg(feature = "erc20")]
    fn token_transfer() {
        let tx = "02f86f82053107847735940085174876e80082ea6094e15a8e2ebc5ea4e0f1a5d43e4b1ac3b6d42e5e4f80b844a9059cbb0000000000000000000000001111111111111111111111111111111111111111000000000000000000000000000000000000000000000000000000000016e360c0";

        let items = review(tx, AppMode::default()).unwrap();
        assert_eq!(
            items,
            pairs(&[
                ("ERC-20", "transfer"),
                ("Contract", "0xe15a8e2ebc5ea4e0f1a5d43e4b1ac3b6d42e5e4f"),
                ("To", "0x1111111111111111111111111111111111111111"),
                ("Amount", "1500000"),
                ("Max Fees", "0.006 SEI"),
                ("Chain ID", "1329"),
            ])
        );
    }

    #[test]
    fn envelopes() {
        let bytes = hex::decode(TRANSFER_1559).unwrap();
        assert_eq!(EthTransaction::new(&bytes).map(|tx| tx.is_typed_tx()), Ok(true));
        let bytes = hex::decode(CALL_LEGACY).unwrap();
        assert_eq!(EthTransaction::new(&bytes).map(|tx| tx.is_typed_tx()), Ok(false));

        const SUITE: &[(&str, ParserError)] = &[
            // trailing byte after the list
            (
                "01ed820531058504a817c800825208943535353535353535353535353535353535353535880de0b6b3a764000080c000",
                ParserError::UnexpectedData,
            ),
            // list shorter than declared
            ("02f18205", ParserError::UnexpectedBufferEnd),
            // not a list
            ("8180", ParserError::InvalidRlpData),
            ("", ParserError::UnexpectedBufferEnd),
        ];

        for (input, expected) in SUITE {
            std::dbg!(input);
            let bytes = hex::decode(input).unwrap();
            assert_eq!(EthTransaction::new(&bytes), Err(*expected));
        }
    }

    #[test]
    fn out_of_range() {
        let bytes = hex::decode(TRANSFER_2930).unwrap();
        let review = EthReview::parse(&bytes, AppMode::default()).unwrap();

        let mut title = [0u8; 40];
        let mut message = [0u8; 40];
        let n = review.get_num_items().unwrap();
        assert_eq!(
            review.get_item(n, &mut title, &mut message, 0),
            Err(ParserError::DisplayIdxOutOfRange)
        );
        assert_eq!(
            review.render_item(n, &mut title, &mut message, 0),
            Err(ViewError::NoData)
        );
    }

    #[test]
    fn large_numbers() {
        let mut message = [0u8; 200];

        let max = [0xff; 32];
        render_u256(&max, 0, "", &mut message, 0).unwrap();
        assert_eq!(
            &message[..strlen(&message)],
            U256::MAX.to_string().as_bytes()
        );

        assert_eq!(
            render_u256(&[0x01; 33], 0, "", &mut message, 0),
            Err(ParserError::ValueOutOfRange)
        );

        // the fee product needs 512 bits
        let fees = U256::MAX.full_mul(U256::MAX);
        let pages = render_number(fees, EVM_DECIMALS, SEI_TOKEN_SYMBOL, &mut message, 0).unwrap();
        assert_eq!(pages, 1);
        assert!(message[..strlen(&message)].ends_with(b" SEI"));
    }
}
