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
use core::convert::TryFrom;

use nom::bytes::complete::take;

use crate::parser::ParserError;

pub const EIP2930_TX: u8 = 0x01;
pub const EIP1559_TX: u8 = 0x02;

const U64_SIZE: usize = core::mem::size_of::<u64>();

/// Converts a slice of big-endian bytes to an u64
pub fn bytes_to_u64(input: &[u8]) -> Result<u64, ParserError> {
    if input.len() > U64_SIZE {
        return Err(ParserError::ValueOutOfRange);
    }

    let mut raw = [0; U64_SIZE];
    raw[U64_SIZE - input.len()..].copy_from_slice(input);
    Ok(u64::from_be_bytes(raw))
}

/// Reads the `num_bytes` big-endian length that follows a long form marker
fn read_long_len(data: &[u8], num_bytes: usize) -> Result<u64, ParserError> {
    if num_bytes > U64_SIZE {
        return Err(ParserError::ValueOutOfRange);
    }

    let num = data
        .get(1..)
        .and_then(|d| d.get(..num_bytes))
        .ok_or(ParserError::UnexpectedBufferEnd)?;

    Ok(num
        .iter()
        .fold(0u64, |acc, b| acc.saturating_mul(256).saturating_add(*b as u64)))
}

/// Return the number of bytes of the ethereum tx
///
/// Expects an optional transaction version followed by a
/// rlp-encoded list, anything else is not an ethereum transaction.
///
/// Returns the number of header bytes read and the number of payload bytes to read
pub fn get_tx_rlp_len(mut data: &[u8]) -> Result<(usize, u64), ParserError> {
    let mut read = 0;

    // legacy transactions carry no version
    let version = *data.first().ok_or(ParserError::UnexpectedBufferEnd)?;
    if version == EIP2930_TX || version == EIP1559_TX {
        data = &data[1..];
        read += 1;
    }

    let marker = *data.first().ok_or(ParserError::UnexpectedBufferEnd)?;

    match marker {
        slist @ 0xC0..=0xF7 => Ok((read + 1, slist as u64 - 0xC0)),
        list @ 0xF8..=0xFF => {
            let num_bytes = list as usize - 0xF7;
            let len = read_long_len(data, num_bytes)?;

            Ok((read + 1 + num_bytes, len))
        }
        _ => Err(ParserError::InvalidRlpData),
    }
}

/// Total size of the transaction, header included.
///
/// Saturates instead of wrapping on adversarial lengths
pub fn get_tx_total_len(data: &[u8]) -> Result<u64, ParserError> {
    let (read, to_read) = get_tx_rlp_len(data)?;
    Ok((read as u64).saturating_add(to_read))
}

/// Returns the remaining bytes from data along with the bytes
/// representation of the found item.
///
/// Lists are returned as their raw payload
pub fn parse_rlp_item(data: &[u8]) -> Result<(&[u8], &[u8]), nom::Err<ParserError>> {
    let marker = *data.first().ok_or(ParserError::UnexpectedBufferEnd)?;

    let (read, to_read) = match marker {
        0..=0x7F => return Ok((&data[1..], &data[..1])),
        0x81 if data.get(1).map_or(false, |b| *b < 0x80) => {
            // a single byte below 0x80 is its own encoding
            return Err(ParserError::InvalidRlpData.into());
        }
        sstring @ 0x80..=0xB7 => (1, sstring as u64 - 0x80),
        string @ 0xB8..=0xBF => {
            let num_bytes = string as usize - 0xB7;
            (1 + num_bytes, read_canonical_long_len(data, num_bytes)?)
        }
        slist @ 0xC0..=0xF7 => (1, slist as u64 - 0xC0),
        list @ 0xF8..=0xFF => {
            let num_bytes = list as usize - 0xF7;
            (1 + num_bytes, read_canonical_long_len(data, num_bytes)?)
        }
    };

    let to_read = usize::try_from(to_read).map_err(|_| ParserError::ValueOutOfRange)?;
    take(to_read)(&data[read..])
}

/// Like [`parse_rlp_item`] but the item must be a list
pub fn parse_rlp_list(data: &[u8]) -> Result<(&[u8], &[u8]), nom::Err<ParserError>> {
    match data.first() {
        Some(0xC0..=0xFF) => parse_rlp_item(data),
        Some(_) => Err(ParserError::InvalidRlpData.into()),
        None => Err(ParserError::UnexpectedBufferEnd.into()),
    }
}

// the long form is only valid for payloads above 55 bytes
fn read_canonical_long_len(data: &[u8], num_bytes: usize) -> Result<u64, ParserError> {
    let len = read_long_len(data, num_bytes)?;
    if len < 56 {
        return Err(ParserError::InvalidRlpData);
    }
    Ok(len)
}
