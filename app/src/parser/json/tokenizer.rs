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

use crate::constants::{MAX_JSON_NESTING, MAX_NUMBER_OF_TOKENS};
use crate::parser::ParserError;

#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(any(test, feature = "derive-debug"), derive(Debug))]
pub enum TokenKind {
    Object,
    Array,
    String,
    Number,
    Primitive,
}

/// A node of the flat token tree.
///
/// `start..end` is the byte range in the source buffer: strings exclude their quotes,
/// containers include their brackets. `size` is the number of keys of an object or
/// the number of elements of an array.
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(any(test, feature = "derive-debug"), derive(Debug))]
pub struct Token {
    pub kind: TokenKind,
    start: u16,
    end: u16,
    size: u16,
}

impl Token {
    pub fn start(&self) -> usize {
        self.start as usize
    }

    pub fn end(&self) -> usize {
        self.end as usize
    }

    pub fn size(&self) -> usize {
        self.size as usize
    }

    pub fn is_scalar(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::String | TokenKind::Number | TokenKind::Primitive
        )
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Expect {
    Value,
    ValueOrClose,
    Key,
    KeyOrClose,
    Colon,
    CommaOrClose,
    Done,
}

/// Immutable token array over a borrowed JSON buffer
pub struct ParsedJson<'b> {
    buffer: &'b [u8],
    tokens: ArrayVec<Token, MAX_NUMBER_OF_TOKENS>,
}

impl<'b> ParsedJson<'b> {
    #[inline(never)]
    pub fn parse(buffer: &'b [u8]) -> Result<Self, ParserError> {
        crate::sys::zemu_log_stack("ParsedJson::parse");

        if buffer.len() > u16::MAX as usize {
            return Err(ParserError::ValueOutOfRange);
        }

        let mut tokens: ArrayVec<Token, MAX_NUMBER_OF_TOKENS> = ArrayVec::new();
        let mut open: ArrayVec<usize, MAX_JSON_NESTING> = ArrayVec::new();
        let mut expect = Expect::Value;
        let mut pos = 0;

        while pos < buffer.len() {
            let c = buffer[pos];

            match c {
                b' ' | b'\t' | b'\n' | b'\r' => {
                    pos += 1;
                    continue;
                }
                b'{' | b'[' => {
                    if !matches!(expect, Expect::Value | Expect::ValueOrClose) {
                        return Err(ParserError::JsonIncomplete);
                    }
                    let kind = if c == b'{' {
                        TokenKind::Object
                    } else {
                        TokenKind::Array
                    };
                    Self::count_element(&mut tokens, &open);
                    open.try_push(tokens.len())
                        .map_err(|_| ParserError::RecursionDepthExceeded)?;
                    Self::push(&mut tokens, kind, pos, pos)?;
                    expect = if kind == TokenKind::Object {
                        Expect::KeyOrClose
                    } else {
                        Expect::ValueOrClose
                    };
                    pos += 1;
                }
                b'}' | b']' => {
                    let wanted = if c == b'}' {
                        TokenKind::Object
                    } else {
                        TokenKind::Array
                    };
                    let &idx = open.last().ok_or(ParserError::JsonIncomplete)?;
                    let closable = match expect {
                        Expect::CommaOrClose => true,
                        Expect::KeyOrClose => wanted == TokenKind::Object,
                        Expect::ValueOrClose => wanted == TokenKind::Array,
                        _ => false,
                    };
                    if !closable || tokens[idx].kind != wanted {
                        return Err(ParserError::JsonIncomplete);
                    }
                    open.pop();
                    tokens[idx].end = (pos + 1) as u16;
                    expect = Self::after_value(&open);
                    pos += 1;
                }
                b'"' => {
                    let start = pos + 1;
                    let end = Self::scan_string(buffer, start)?;
                    match expect {
                        Expect::Key | Expect::KeyOrClose => {
                            let &idx = open.last().ok_or(ParserError::JsonIncomplete)?;
                            tokens[idx].size += 1;
                            Self::push(&mut tokens, TokenKind::String, start, end)?;
                            expect = Expect::Colon;
                        }
                        Expect::Value | Expect::ValueOrClose => {
                            Self::count_element(&mut tokens, &open);
                            Self::push(&mut tokens, TokenKind::String, start, end)?;
                            expect = Self::after_value(&open);
                        }
                        _ => return Err(ParserError::JsonIncomplete),
                    }
                    // skip the closing quote
                    pos = end + 1;
                }
                b':' => {
                    if expect != Expect::Colon {
                        return Err(ParserError::JsonIncomplete);
                    }
                    expect = Expect::Value;
                    pos += 1;
                }
                b',' => {
                    if expect != Expect::CommaOrClose {
                        return Err(ParserError::JsonIncomplete);
                    }
                    let &idx = open.last().ok_or(ParserError::JsonIncomplete)?;
                    expect = if tokens[idx].kind == TokenKind::Object {
                        Expect::Key
                    } else {
                        Expect::Value
                    };
                    pos += 1;
                }
                _ => {
                    if !matches!(expect, Expect::Value | Expect::ValueOrClose) {
                        return Err(ParserError::JsonIncomplete);
                    }
                    let end = buffer[pos..]
                        .iter()
                        .position(|&b| {
                            matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b',' | b']' | b'}' | b':')
                        })
                        .map(|p| pos + p)
                        .unwrap_or(buffer.len());
                    let kind = Self::classify_primitive(&buffer[pos..end])?;
                    Self::count_element(&mut tokens, &open);
                    Self::push(&mut tokens, kind, pos, end)?;
                    expect = Self::after_value(&open);
                    pos = end;
                }
            }
        }

        if tokens.is_empty() {
            return Err(ParserError::JsonZeroTokens);
        }
        if expect != Expect::Done || !open.is_empty() {
            return Err(ParserError::JsonIncomplete);
        }

        Ok(Self { buffer, tokens })
    }

    fn push(
        tokens: &mut ArrayVec<Token, MAX_NUMBER_OF_TOKENS>,
        kind: TokenKind,
        start: usize,
        end: usize,
    ) -> Result<(), ParserError> {
        tokens
            .try_push(Token {
                kind,
                start: start as u16,
                end: end as u16,
                size: 0,
            })
            .map_err(|_| ParserError::JsonTooManyTokens)
    }

    // values directly inside an array count as its elements
    fn count_element(tokens: &mut ArrayVec<Token, MAX_NUMBER_OF_TOKENS>, open: &[usize]) {
        if let Some(&idx) = open.last() {
            if tokens[idx].kind == TokenKind::Array {
                tokens[idx].size += 1;
            }
        }
    }

    fn after_value(open: &[usize]) -> Expect {
        if open.is_empty() {
            Expect::Done
        } else {
            Expect::CommaOrClose
        }
    }

    /// Returns the index of the closing quote
    fn scan_string(buffer: &[u8], start: usize) -> Result<usize, ParserError> {
        let mut pos = start;
        while pos < buffer.len() {
            match buffer[pos] {
                b'"' => return Ok(pos),
                b'\\' => {
                    let escaped = *buffer.get(pos + 1).ok_or(ParserError::JsonIncomplete)?;
                    match escaped {
                        b'"' | b'\\' | b'/' | b'b' | b'f' | b'n' | b'r' | b't' => pos += 2,
                        b'u' => {
                            let hex = buffer
                                .get(pos + 2..pos + 6)
                                .ok_or(ParserError::JsonIncomplete)?;
                            if !hex.iter().all(u8::is_ascii_hexdigit) {
                                return Err(ParserError::JsonIncomplete);
                            }
                            pos += 6;
                        }
                        _ => return Err(ParserError::JsonIncomplete),
                    }
                }
                // raw control characters are not allowed inside strings
                0..=0x1F => return Err(ParserError::JsonIncomplete),
                _ => pos += 1,
            }
        }

        Err(ParserError::JsonIncomplete)
    }

    fn classify_primitive(text: &[u8]) -> Result<TokenKind, ParserError> {
        match text {
            b"true" | b"false" | b"null" => Ok(TokenKind::Primitive),
            [first, ..]
                if (*first == b'-' || first.is_ascii_digit())
                    && text
                        .iter()
                        .all(|&b| b.is_ascii_digit() || matches!(b, b'-' | b'+' | b'.' | b'e' | b'E')) =>
            {
                Ok(TokenKind::Number)
            }
            _ => Err(ParserError::JsonIncomplete),
        }
    }

    pub fn buffer(&self) -> &'b [u8] {
        self.buffer
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn token(&self, idx: usize) -> Result<&Token, ParserError> {
        self.tokens.get(idx).ok_or(ParserError::NoData)
    }

    /// Raw text of a token, strings without their quotes
    pub fn token_bytes(&self, idx: usize) -> Result<&'b [u8], ParserError> {
        let token = self.token(idx)?;
        self.buffer
            .get(token.start()..token.end())
            .ok_or(ParserError::UnexpectedBufferEnd)
    }

    /// Index of the token following the whole subtree rooted at `idx`
    pub fn next_sibling(&self, idx: usize) -> usize {
        let end = match self.tokens.get(idx) {
            Some(t) => t.end(),
            None => return self.tokens.len(),
        };

        let mut next = idx + 1;
        while next < self.tokens.len() && self.tokens[next].start() < end {
            next += 1;
        }
        next
    }

    /// Number of keys of an object, elements of an array, 0 for scalars
    pub fn element_count(&self, idx: usize) -> Result<usize, ParserError> {
        Ok(self.token(idx)?.size())
    }

    pub fn array_get_nth_element(&self, array: usize, n: usize) -> Result<usize, ParserError> {
        let token = self.token(array)?;
        if token.kind != TokenKind::Array {
            return Err(ParserError::UnexpectedType);
        }
        if n >= token.size() {
            return Err(ParserError::DisplayIdxOutOfRange);
        }

        let mut element = array + 1;
        for _ in 0..n {
            element = self.next_sibling(element);
        }
        Ok(element)
    }

    pub fn object_get_nth_key(&self, object: usize, n: usize) -> Result<usize, ParserError> {
        let token = self.token(object)?;
        if token.kind != TokenKind::Object {
            return Err(ParserError::UnexpectedType);
        }
        if n >= token.size() {
            return Err(ParserError::DisplayIdxOutOfRange);
        }

        let mut key = object + 1;
        for _ in 0..n {
            key = self.next_sibling(key + 1);
        }
        Ok(key)
    }

    pub fn object_get_nth_value(&self, object: usize, n: usize) -> Result<usize, ParserError> {
        self.object_get_nth_key(object, n).map(|key| key + 1)
    }

    /// Looks up the value of `key` among the direct children of `object`
    pub fn object_get_value(&self, object: usize, key: &[u8]) -> Result<Option<usize>, ParserError> {
        let count = self.element_count(object)?;
        for n in 0..count {
            let key_idx = self.object_get_nth_key(object, n)?;
            if self.token_bytes(key_idx)? == key {
                return Ok(Some(key_idx + 1));
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_tree_layout() {
        let json = br#"{"a":[1,{"b":"x"}],"c":true}"#;
        let parsed = ParsedJson::parse(json).unwrap();
        let kinds: std::vec::Vec<TokenKind> = parsed.tokens().iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            [
                TokenKind::Object,
                TokenKind::String,
                TokenKind::Array,
                TokenKind::Number,
                TokenKind::Object,
                TokenKind::String,
                TokenKind::String,
                TokenKind::String,
                TokenKind::Primitive,
            ]
        );

        assert_eq!(parsed.element_count(0).unwrap(), 2);
        assert_eq!(parsed.element_count(2).unwrap(), 2);
        assert_eq!(parsed.next_sibling(2), 7);
        assert_eq!(parsed.object_get_value(0, b"c").unwrap(), Some(8));
        assert_eq!(parsed.object_get_value(0, b"z").unwrap(), None);
        assert_eq!(parsed.array_get_nth_element(2, 1).unwrap(), 4);
        assert_eq!(parsed.token_bytes(6).unwrap(), b"x");
        assert_eq!(parsed.token_bytes(4).unwrap(), br#"{"b":"x"}"#);
    }

    #[test]
    fn escapes_stay_inside_strings() {
        let json = br#"{"m":"a\"b,}\u00e9"}"#;
        let parsed = ParsedJson::parse(json).unwrap();
        assert_eq!(parsed.tokens().len(), 3);
        assert_eq!(parsed.token_bytes(2).unwrap(), br#"a\"b,}\u00e9"#);
    }

    #[test]
    fn malformed_inputs() {
        const SUITE: &[(&[u8], ParserError)] = &[
            (b"", ParserError::JsonZeroTokens),
            (b"   ", ParserError::JsonZeroTokens),
            (b"{", ParserError::JsonIncomplete),
            (br#"{"a":}"#, ParserError::JsonIncomplete),
            (br#"{"a" "b"}"#, ParserError::JsonIncomplete),
            (br#"{1:"b"}"#, ParserError::JsonIncomplete),
            (br#"{"a":"b",}"#, ParserError::JsonIncomplete),
            (br#"{"a":"b"}]"#, ParserError::JsonIncomplete),
            (br#"{"a":"b"}{}"#, ParserError::JsonIncomplete),
            (br#"{"a":tru}"#, ParserError::JsonIncomplete),
            (br#"{"a":"\q"}"#, ParserError::JsonIncomplete),
        ];

        for (input, expected) in SUITE {
            std::dbg!(core::str::from_utf8(input).unwrap());
            assert_eq!(ParsedJson::parse(input).err(), Some(*expected));
        }
    }

    #[test]
    fn nesting_is_bounded() {
        let mut json = std::vec::Vec::new();
        json.resize(MAX_JSON_NESTING + 1, b'[');
        json.resize(2 * (MAX_JSON_NESTING + 1), b']');

        assert_eq!(
            ParsedJson::parse(&json).err(),
            Some(ParserError::RecursionDepthExceeded)
        );
    }

    #[test]
    fn too_many_tokens() {
        let mut json = std::vec::Vec::from(&b"["[..]);
        for _ in 0..MAX_NUMBER_OF_TOKENS {
            json.extend_from_slice(b"1,");
        }
        json.extend_from_slice(b"1]");

        assert_eq!(
            ParsedJson::parse(&json).err(),
            Some(ParserError::JsonTooManyTokens)
        );
    }
}
