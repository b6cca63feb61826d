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

use super::tokenizer::{ParsedJson, TokenKind};
use crate::constants::{KEY_BUFFER_LEN, MAX_RECURSION_DEPTH};
use crate::parser::ParserError;

const MSG_TYPE_FIELD: &[u8] = b"msgs/type";
const MSG_FROM_FIELDS: &[&[u8]] = &[
    b"msgs/value/from_address",
    b"msgs/value/delegator_address",
    b"msgs/value/sender",
];

pub fn is_msg_type_field(key: &[u8]) -> bool {
    key == MSG_TYPE_FIELD
}

pub fn is_msg_from_field(key: &[u8]) -> bool {
    MSG_FROM_FIELDS.iter().any(|field| *field == key)
}

/// Leaves hidden from display queries once message grouping is known.
///
/// Representatives are identified by their leaf index in the ungrouped traversal.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(any(test, feature = "derive-debug"), derive(Debug))]
pub struct GroupingFilter {
    pub msg_type: Option<u16>,
    pub msg_from: Option<u16>,
    pub hide_msg_from: bool,
}

impl GroupingFilter {
    fn skips(&self, key: &[u8], leaf_index: u16) -> bool {
        if is_msg_type_field(key) {
            if let Some(repr) = self.msg_type {
                return leaf_index != repr;
            }
        }

        if is_msg_from_field(key) {
            if let Some(repr) = self.msg_from {
                return self.hide_msg_from || leaf_index != repr;
            }
        }

        false
    }
}

/// Locates the `item_index`-th displayable leaf below a root field.
///
/// A query is built for a single lookup and dropped afterwards, so no state
/// carries over from one lookup to the next.
pub struct Query {
    item_index: u16,
    max_level: u8,
    max_depth: u8,
    filter: Option<GroupingFilter>,
    // leaves yielded so far
    item_index_current: u16,
    // leaves visited so far, including the ones hidden by the filter
    leaf_index: u16,
    out_key: ArrayVec<u8, KEY_BUFFER_LEN>,
}

impl Query {
    pub fn new(
        root_key: &str,
        item_index: u16,
        max_level: u8,
        filter: Option<GroupingFilter>,
    ) -> Result<Self, ParserError> {
        let mut out_key = ArrayVec::new();
        out_key.try_extend_from_slice(root_key.as_bytes())?;

        Ok(Self {
            item_index,
            max_level,
            max_depth: MAX_RECURSION_DEPTH,
            filter,
            item_index_current: 0,
            leaf_index: 0,
            out_key,
        })
    }

    /// Path of the found item, `root/key/key`
    pub fn key(&self) -> &[u8] {
        &self.out_key
    }

    /// Returns the token of the wanted item, or `QueryNoResults`
    /// if the subtree holds fewer items
    pub fn find(&mut self, json: &ParsedJson, root_token: usize) -> Result<usize, ParserError> {
        self.traverse(json, root_token, self.max_level, self.max_depth)
    }

    fn traverse(
        &mut self,
        json: &ParsedJson,
        idx: usize,
        level: u8,
        depth: u8,
    ) -> Result<usize, ParserError> {
        let token = *json.token(idx)?;

        // beyond the level budget the subtree is shown as a single value
        if level == 0 || token.is_scalar() {
            return self.visit_leaf(idx);
        }

        if depth == 0 {
            return Err(ParserError::RecursionDepthExceeded);
        }

        match token.kind {
            TokenKind::Object => {
                let key_len = self.out_key.len();
                let mut key_idx = idx + 1;

                for _ in 0..token.size() {
                    let value_idx = key_idx + 1;

                    self.out_key.try_push(b'/')?;
                    self.out_key
                        .try_extend_from_slice(json.token_bytes(key_idx)?)?;

                    match self.traverse(json, value_idx, level - 1, depth - 1) {
                        Err(ParserError::QueryNoResults) => {}
                        found => return found,
                    }

                    self.out_key.truncate(key_len);
                    key_idx = json.next_sibling(value_idx);
                }
            }
            TokenKind::Array => {
                let mut element = idx + 1;

                for _ in 0..token.size() {
                    match self.traverse(json, element, level, depth - 1) {
                        Err(ParserError::QueryNoResults) => {}
                        found => return found,
                    }

                    element = json.next_sibling(element);
                }
            }
            _ => return Err(ParserError::UnexpectedType),
        }

        Err(ParserError::QueryNoResults)
    }

    fn visit_leaf(&mut self, idx: usize) -> Result<usize, ParserError> {
        let leaf_index = self.leaf_index;
        self.leaf_index = self.leaf_index.saturating_add(1);

        if let Some(filter) = self.filter {
            if filter.skips(&self.out_key, leaf_index) {
                return Err(ParserError::QueryNoResults);
            }
        }

        if self.item_index_current == self.item_index {
            return Ok(idx);
        }

        self.item_index_current = self.item_index_current.saturating_add(1);
        Err(ParserError::QueryNoResults)
    }
}
