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
use super::tokenizer::{ParsedJson, TokenKind};
use crate::parser::ParserError;

/// Root fields every transaction must carry, in the order they are checked
const REQUIRED_ROOT_FIELDS: &[(&str, ParserError)] = &[
    ("chain_id", ParserError::JsonMissingChainId),
    ("sequence", ParserError::JsonMissingSequence),
    ("fee", ParserError::JsonMissingFee),
    ("msgs", ParserError::JsonMissingMsgs),
    ("account_number", ParserError::JsonMissingAccountNumber),
    ("memo", ParserError::JsonMissingMemo),
];

/// Checks the transaction is in canonical form and carries every required root field
#[inline(never)]
pub fn validate(json: &ParsedJson) -> Result<(), ParserError> {
    crate::sys::zemu_log_stack("json::validate");

    let root = json.tokens().first().ok_or(ParserError::JsonZeroTokens)?;
    if root.kind != TokenKind::Object {
        return Err(ParserError::JsonUnexpectedRoot);
    }

    if contains_whitespace(json) {
        return Err(ParserError::JsonContainsWhitespace);
    }

    if !is_sorted(json)? {
        return Err(ParserError::JsonIsNotSorted);
    }

    for (name, missing) in REQUIRED_ROOT_FIELDS.iter() {
        if json.object_get_value(0, name.as_bytes())?.is_none() {
            return Err(*missing);
        }
    }

    Ok(())
}

fn is_space(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}

/// True if any whitespace appears outside of string contents
pub fn contains_whitespace(json: &ParsedJson) -> bool {
    let buffer = json.buffer();
    let mut cursor = 0;

    for token in json.tokens().iter().filter(|t| t.kind == TokenKind::String) {
        // the opening quote sits right before the string contents
        let outside = buffer.get(cursor..token.start().saturating_sub(1)).unwrap_or(&[]);
        if outside.iter().any(|&c| is_space(c)) {
            return true;
        }
        // resume after the closing quote
        cursor = token.end() + 1;
    }

    buffer
        .get(cursor..)
        .unwrap_or(&[])
        .iter()
        .any(|&c| is_space(c))
}

/// True if the keys of every object are in strictly ascending order
pub fn is_sorted(json: &ParsedJson) -> Result<bool, ParserError> {
    for (idx, token) in json.tokens().iter().enumerate() {
        if token.kind != TokenKind::Object {
            continue;
        }

        let mut previous: Option<&[u8]> = None;
        for n in 0..token.size() {
            let key = json.token_bytes(json.object_get_nth_key(idx, n)?)?;
            if let Some(previous) = previous {
                if previous >= key {
                    return Ok(false);
                }
            }
            previous = Some(key);
        }
    }

    Ok(true)
}
