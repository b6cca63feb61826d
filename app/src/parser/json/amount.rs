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

use arrayvec::ArrayVec;

use super::tokenizer::{ParsedJson, TokenKind};
use crate::constants::{
    COIN_AMOUNT_MAXSIZE, COIN_DEFAULT_DENOM_BASE, COIN_DEFAULT_DENOM_FACTOR,
    COIN_DEFAULT_DENOM_REPR, COIN_DENOM_MAXSIZE, FORMATTED_AMOUNT_LEN,
};
use crate::handlers::handle_ui_message;
use crate::parser::{fpstr_with_symbol, join_with_space, ParserError};

const EMPTY_AMOUNT: &[u8] = b"Empty";

/// Renders a coin or a list of coins.
///
/// Every coin of a list takes its own pages, `page` indexes the
/// concatenation of all of them.
#[inline(never)]
pub fn format_amount(
    json: &ParsedJson,
    token: usize,
    out: &mut [u8],
    page: u8,
) -> Result<u8, ParserError> {
    crate::sys::zemu_log_stack("json::format_amount");

    if json.token(token)?.kind != TokenKind::Array {
        return format_amount_item(json, token, out, page);
    }

    let count = json.element_count(token)?;
    if count == 0 {
        return handle_ui_message(EMPTY_AMOUNT, out, page);
    }

    let page = page as usize;
    let mut total_pages = 0usize;
    let mut target = None;
    for n in 0..count {
        let coin = json.array_get_nth_element(token, n)?;
        let pages = format_amount_item(json, coin, out, 0)? as usize;

        if target.is_none() && page < total_pages + pages {
            target = Some((coin, page - total_pages));
        }
        total_pages += pages;
    }

    let total_pages = u8::try_from(total_pages).map_err(|_| ParserError::ValueOutOfRange)?;
    let (coin, coin_page) = target.ok_or(ParserError::DisplayPageOutOfRange)?;

    // coin_page is below this coin's page count, itself a u8
    format_amount_item(json, coin, out, coin_page as u8)?;
    Ok(total_pages)
}

/// Renders a single `{"amount":"..","denom":".."}` object
fn format_amount_item(
    json: &ParsedJson,
    token: usize,
    out: &mut [u8],
    page: u8,
) -> Result<u8, ParserError> {
    let coin = json.token(token)?;
    if coin.kind != TokenKind::Object {
        return Err(ParserError::UnexpectedType);
    }

    match coin.size() {
        0 => return handle_ui_message(EMPTY_AMOUNT, out, page),
        2 => {}
        _ => return Err(ParserError::UnexpectedField),
    }

    let amount_key = json.object_get_nth_key(token, 0)?;
    let denom_key = json.object_get_nth_key(token, 1)?;
    if json.token_bytes(amount_key)? != b"amount" || json.token_bytes(denom_key)? != b"denom" {
        return Err(ParserError::UnexpectedField);
    }

    let (amount_token, denom_token) = (amount_key + 1, denom_key + 1);
    if json.token(amount_token)?.kind != TokenKind::String
        || json.token(denom_token)?.kind != TokenKind::String
    {
        return Err(ParserError::UnexpectedType);
    }

    let amount = json.token_bytes(amount_token)?;
    let denom = json.token_bytes(denom_token)?;
    if amount.is_empty() || amount.len() >= COIN_AMOUNT_MAXSIZE {
        return Err(ParserError::ValueOutOfRange);
    }
    if denom.is_empty() || denom.len() >= COIN_DENOM_MAXSIZE {
        return Err(ParserError::ValueOutOfRange);
    }

    let text: ArrayVec<u8, FORMATTED_AMOUNT_LEN> = if denom == COIN_DEFAULT_DENOM_BASE.as_bytes() {
        fpstr_with_symbol(
            amount,
            COIN_DEFAULT_DENOM_FACTOR,
            COIN_DEFAULT_DENOM_REPR.as_bytes(),
        )?
    } else {
        join_with_space(amount, denom)?
    };

    handle_ui_message(&text, out, page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::strlen;

    fn render(value: &str, out_len: usize, page: u8) -> Result<(u8, std::string::String), ParserError> {
        let json = ParsedJson::parse(value.as_bytes())?;
        let mut out = std::vec![0u8; out_len];
        let pages = format_amount(&json, 0, &mut out, page)?;
        let len = strlen(&out);
        Ok((pages, std::string::String::from_utf8(out[..len].to_vec()).unwrap()))
    }

    #[test]
    fn base_denom_is_rewritten() {
        const SUITE: &[(&str, &str)] = &[
            (r#"{"amount":"1000000","denom":"sei"}"#, "1 SEI"),
            (r#"{"amount":"1500000","denom":"sei"}"#, "1.5 SEI"),
            (r#"{"amount":"1","denom":"sei"}"#, "0.000001 SEI"),
            (r#"{"amount":"0","denom":"sei"}"#, "0 SEI"),
            (r#"{"amount":"1000000","denom":"usei"}"#, "1000000 usei"),
            (r#"{"amount":"10","denom":"atom"}"#, "10 atom"),
            (r#"{}"#, "Empty"),
            (r#"[]"#, "Empty"),
        ];

        for (input, expected) in SUITE {
            std::dbg!(input);
            assert_eq!(render(input, 40, 0).unwrap(), (1, std::string::String::from(*expected)));
        }
    }

    #[test]
    fn lists_paginate_per_coin() {
        let coins = r#"[{"amount":"10","denom":"atom"},{"amount":"2000000","denom":"sei"},{"amount":"3","denom":"photon"}]"#;
        assert_eq!(render(coins, 40, 0).unwrap(), (3, "10 atom".into()));
        assert_eq!(render(coins, 40, 1).unwrap(), (3, "2 SEI".into()));
        assert_eq!(render(coins, 40, 2).unwrap(), (3, "3 photon".into()));
        assert_eq!(render(coins, 40, 3), Err(ParserError::DisplayPageOutOfRange));

        // the second coin spans two pages of 4 characters
        let coins = r#"[{"amount":"1","denom":"a"},{"amount":"12","denom":"abcde"}]"#;
        assert_eq!(render(coins, 5, 0).unwrap(), (3, "1 a".into()));
        assert_eq!(render(coins, 5, 1).unwrap(), (3, "12 a".into()));
        assert_eq!(render(coins, 5, 2).unwrap(), (3, "bcde".into()));
    }

    #[test]
    fn amount_length_limit() {
        let digits = "1".repeat(COIN_AMOUNT_MAXSIZE - 1);
        let longest = std::format!(r#"{{"amount":"{}","denom":"usei"}}"#, digits);
        let (pages, text) = render(&longest, 100, 0).unwrap();
        assert_eq!(pages, 1);
        assert_eq!(text, std::format!("{} usei", digits));

        let too_long = std::format!(r#"{{"amount":"{}1","denom":"usei"}}"#, digits);
        assert_eq!(render(&too_long, 100, 0), Err(ParserError::ValueOutOfRange));
    }

    #[test]
    fn wrong_shapes() {
        const SUITE: &[(&str, ParserError)] = &[
            (r#"{"denom":"sei","amount":"1"}"#, ParserError::UnexpectedField),
            (r#"{"amount":"1"}"#, ParserError::UnexpectedField),
            (r#"{"amount":"1","denom":"sei","x":"y"}"#, ParserError::UnexpectedField),
            (r#"{"amount":1,"denom":"sei"}"#, ParserError::UnexpectedType),
            (r#""1000""#, ParserError::UnexpectedType),
            (r#"{"amount":"","denom":"sei"}"#, ParserError::ValueOutOfRange),
            (r#"{"amount":"1","denom":""}"#, ParserError::ValueOutOfRange),
            (r#"{"amount":"1a","denom":"sei"}"#, ParserError::UnexpectedValue),
        ];

        for (input, expected) in SUITE {
            std::dbg!(input);
            assert_eq!(render(input, 40, 0), Err(*expected));
        }
    }
}
