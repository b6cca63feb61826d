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

use crate::{
    constants::{MAX_ADDRESS_LEN, VALIDATION_KEY_LEN, VALIDATION_VALUE_LEN},
    parser::{DisplayableItem, ParserError},
    sys::ViewError,
    utils::AppMode,
};

mod amount;
mod display;
mod query;
mod tokenizer;
mod validate;

pub use amount::format_amount;
pub use display::{is_amount_key, substitute_key, RootItem};
pub use query::{is_msg_from_field, is_msg_type_field, GroupingFilter, Query};
pub use tokenizer::{ParsedJson, Token, TokenKind};
pub use validate::{contains_whitespace, is_sorted};

use display::DisplayCache;

#[derive(Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(any(test, feature = "derive-debug"), derive(Debug))]
struct Flags {
    cache_valid: bool,
    msg_type_grouping: bool,
    msg_from_grouping: bool,
    msg_from_grouping_hide_all: bool,
}

/// Tracks a message field whose value may be shown once for all messages
#[derive(Clone, Copy, Default)]
struct Group<'b> {
    count: u16,
    // leaf index and raw value of the first occurrence
    repr: Option<(u16, &'b [u8])>,
}

impl<'b> Group<'b> {
    /// Returns false as soon as `value` diverges from the representative
    fn track(&mut self, leaf_index: u16, value: &'b [u8]) -> bool {
        match self.repr {
            None => {
                self.repr = Some((leaf_index, value));
                self.count = 1;
                true
            }
            Some((_, repr)) if repr == value => {
                self.count = self.count.saturating_add(1);
                true
            }
            Some(_) => {
                self.count = 0;
                false
            }
        }
    }

    fn repr_leaf(&self) -> Option<u16> {
        self.repr.map(|(leaf, _)| leaf)
    }

    fn repr_value(&self) -> Option<&'b [u8]> {
        self.repr.map(|(_, value)| value)
    }
}

/// Review context of a JSON (amino) transaction.
///
/// Owns the token tree of the borrowed transaction bytes and the display
/// cache built from it. The cache is built on first use and kept until
/// [`JsonTx::reset`].
pub struct JsonTx<'b> {
    json: ParsedJson<'b>,
    own_address: ArrayVec<u8, MAX_ADDRESS_LEN>,
    mode: AppMode,
    extra_depth_level: bool,

    flags: Flags,
    msg_type: Group<'b>,
    msg_from: Group<'b>,
    cache: DisplayCache,
}

impl<'b> JsonTx<'b> {
    /// Tokenizes `buffer`.
    ///
    /// `own_address` is the address of the signing key, used to hide
    /// the sender of self-sent messages, and may be empty
    pub fn new(buffer: &'b [u8], own_address: &[u8], mode: AppMode) -> Result<Self, ParserError> {
        crate::sys::zemu_log_stack("JsonTx::new");

        let json = ParsedJson::parse(buffer)?;

        let mut own = ArrayVec::new();
        own.try_extend_from_slice(own_address)?;

        Ok(Self {
            json,
            own_address: own,
            mode,
            extra_depth_level: false,
            flags: Flags::default(),
            msg_type: Group::default(),
            msg_from: Group::default(),
            cache: DisplayCache::default(),
        })
    }

    /// Flattens messages one level deeper
    pub fn with_extra_depth_level(mut self) -> Self {
        self.extra_depth_level = true;
        self.reset();
        self
    }

    pub fn json(&self) -> &ParsedJson<'b> {
        &self.json
    }

    pub fn mode(&self) -> AppMode {
        self.mode
    }

    /// Changes the review mode, the display cache is rebuilt on next use
    pub fn set_mode(&mut self, mode: AppMode) {
        self.mode = mode;
        self.reset();
    }

    /// Drops the display cache and every grouping decision
    pub fn reset(&mut self) {
        self.flags = Flags::default();
        self.msg_type = Group::default();
        self.msg_from = Group::default();
        self.cache = DisplayCache::default();
    }

    pub fn is_indexed(&self) -> bool {
        self.flags.cache_valid
    }

    /// Builds the display cache if it is not built yet
    pub fn ensure_indexed(&mut self) -> Result<(), ParserError> {
        self.index_root_fields()
    }

    /// Chain id is the default one, only meaningful once indexed
    pub fn is_default_chain(&self) -> bool {
        self.cache.is_default_chain
    }

    /// True when in expert mode or when the chain is not the default one
    pub fn is_expert_or_not_default_chain(&mut self) -> Result<bool, ParserError> {
        self.ensure_indexed()?;
        Ok(self.mode.expert || !self.cache.is_default_chain)
    }

    /// Checks the canonical form, then renders every page of every item
    /// so a transaction that can't be shown is refused before review
    #[inline(never)]
    pub fn validate(&mut self) -> Result<(), ParserError> {
        crate::sys::zemu_log_stack("JsonTx::validate");

        validate::validate(&self.json)?;
        self.ensure_indexed()?;

        let mut key = [0u8; VALIDATION_KEY_LEN];
        let mut value = [0u8; VALIDATION_VALUE_LEN];

        for idx in 0..self.indexed_num_items()? {
            let pages = self.indexed_item(idx, &mut key, &mut value, 0)?;
            for page in 1..pages {
                self.indexed_item(idx, &mut key, &mut value, page)?;
            }
        }

        Ok(())
    }

    pub fn get_num_items(&mut self) -> Result<u8, ParserError> {
        self.ensure_indexed()?;
        self.indexed_num_items()
    }

    /// Renders the `display_idx`-th item, returning its number of pages
    pub fn get_item(
        &mut self,
        display_idx: u8,
        key: &mut [u8],
        value: &mut [u8],
        page: u8,
    ) -> Result<u8, ParserError> {
        self.ensure_indexed()?;
        self.indexed_item(display_idx, key, value, page)
    }
}

impl<'b> DisplayableItem for JsonTx<'b> {
    fn num_items(&self) -> Result<u8, ViewError> {
        self.indexed_num_items().map_err(Into::into)
    }

    #[inline(never)]
    fn render_item(
        &self,
        item_n: u8,
        title: &mut [u8],
        message: &mut [u8],
        page: u8,
    ) -> Result<u8, ViewError> {
        self.indexed_item(item_n, title, message, page)
            .map_err(Into::into)
    }
}
