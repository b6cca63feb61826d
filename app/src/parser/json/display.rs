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

use super::{
    amount::format_amount,
    query::{is_msg_from_field, is_msg_type_field, GroupingFilter, Query},
    JsonTx,
};
use crate::{
    constants::{COIN_DEFAULT_CHAINID, NUM_REQUIRED_ROOT_ITEMS},
    handlers::{handle_ui_message, write_title},
    parser::ParserError,
};

/// Root fields shown during review, in display order
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(any(test, feature = "derive-debug"), derive(Debug))]
#[repr(u8)]
pub enum RootItem {
    ChainId,
    AccountNumber,
    Sequence,
    Msgs,
    Memo,
    Fee,
    Tip,
}

impl RootItem {
    pub const ALL: [RootItem; NUM_REQUIRED_ROOT_ITEMS] = [
        RootItem::ChainId,
        RootItem::AccountNumber,
        RootItem::Sequence,
        RootItem::Msgs,
        RootItem::Memo,
        RootItem::Fee,
        RootItem::Tip,
    ];

    pub fn key(self) -> &'static str {
        match self {
            RootItem::ChainId => "chain_id",
            RootItem::AccountNumber => "account_number",
            RootItem::Sequence => "sequence",
            RootItem::Msgs => "msgs",
            RootItem::Memo => "memo",
            RootItem::Fee => "fee",
            RootItem::Tip => "tip",
        }
    }

    /// How many object levels are expanded before a subtree is shown as one value
    pub fn max_level(self, extra_depth_level: bool) -> u8 {
        match self {
            RootItem::Fee | RootItem::Tip => 1,
            RootItem::Msgs if extra_depth_level => 3,
            _ => 2,
        }
    }
}

#[derive(Clone, Copy, Default)]
struct CacheEntry {
    start_token: Option<usize>,
    subitem_count: u16,
}

#[derive(Clone, Copy, Default)]
pub(super) struct DisplayCache {
    entries: [CacheEntry; NUM_REQUIRED_ROOT_ITEMS],
    total_item_count: u16,
    pub(super) is_default_chain: bool,
}

const KEY_SUBSTITUTIONS: &[(&str, &str)] = &[
    ("chain_id", "Chain ID"),
    ("account_number", "Account number"),
    ("sequence", "Sequence"),
    ("memo", "Memo"),
    ("fee/amount", "Fee"),
    ("fee/gas", "Gas"),
    ("fee/gas_limit", "Gas Limit"),
    ("fee/granter", "Granter"),
    ("fee/payer", "Payer"),
    ("msgs/type", "Type"),
    ("msgs/value/inputs", "Inputs"),
    ("msgs/value/outputs", "Outputs"),
    ("msgs/value/from_address", "From address"),
    ("msgs/value/to_address", "To address"),
    ("msgs/value/amount", "Amount"),
    ("msgs/value/delegator_address", "Delegator address"),
    ("msgs/value/validator_address", "Validator address"),
    ("msgs/value/validator_dst_address", "Validator dest"),
    ("msgs/value/validator_src_address", "Validator source"),
    ("msgs/value/contract", "Contract address"),
    ("msgs/value/funds", "Funds"),
    ("msgs/value/msg", "Msg"),
    ("msgs/value/sender", "Sender address"),
    ("tip/amount", "Tip"),
    ("tip/tipper", "Tipper"),
];

const AMOUNT_KEYS: &[&str] = &[
    "fee/amount",
    "msgs/inputs/coins",
    "msgs/outputs/coins",
    "msgs/value/inputs/coins",
    "msgs/value/outputs/coins",
    "msgs/value/amount",
    "tip/amount",
];

/// Friendly title for a raw key path, first exact match wins
pub fn substitute_key(key: &[u8]) -> &[u8] {
    KEY_SUBSTITUTIONS
        .iter()
        .find(|(raw, _)| raw.as_bytes() == key)
        .map(|(_, friendly)| friendly.as_bytes())
        .unwrap_or(key)
}

pub fn is_amount_key(key: &[u8]) -> bool {
    AMOUNT_KEYS.iter().any(|k| k.as_bytes() == key)
}

impl<'b> JsonTx<'b> {
    #[inline(never)]
    pub(super) fn index_root_fields(&mut self) -> Result<(), ParserError> {
        if self.flags.cache_valid {
            return Ok(());
        }
        crate::sys::zemu_log_stack("JsonTx::index_root_fields");

        self.reset();
        self.flags.msg_type_grouping = true;
        self.flags.msg_from_grouping = true;

        for root in RootItem::ALL.iter().copied() {
            let start = match self.json.object_get_value(0, root.key().as_bytes())? {
                Some(start) => start,
                None => continue,
            };

            let max_level = root.max_level(self.extra_depth_level);
            let mut count: u16 = 0;
            loop {
                let mut query = Query::new(root.key(), count, max_level, None)?;
                let token = match query.find(&self.json, start) {
                    Ok(token) => token,
                    Err(ParserError::QueryNoResults) => break,
                    Err(e) => return Err(e),
                };
                let value = self.json.token_bytes(token)?;

                match root {
                    RootItem::Memo if value.is_empty() => break,
                    RootItem::Msgs => self.track_grouping(query.key(), count, value),
                    _ => {}
                }

                count = count.checked_add(1).ok_or(ParserError::OperationOverflows)?;
            }

            self.cache.entries[root as usize] = CacheEntry {
                start_token: Some(start),
                subitem_count: count,
            };
            self.cache.total_item_count = self.cache.total_item_count.saturating_add(count);
        }

        self.cache.is_default_chain = self.compute_is_default_chain()?;

        if self.mode.expert || !self.cache.is_default_chain {
            self.flags.msg_from_grouping = false;
        }

        self.flags.msg_from_grouping_hide_all = match self.msg_from.repr_value() {
            Some(from) => !self.own_address.is_empty() && from == self.own_address.as_slice(),
            None => false,
        };

        self.flags.cache_valid = true;
        Ok(())
    }

    fn track_grouping(&mut self, key: &[u8], leaf_index: u16, value: &'b [u8]) {
        if self.flags.msg_type_grouping
            && is_msg_type_field(key)
            && !self.msg_type.track(leaf_index, value)
        {
            log::debug!("message type grouping disabled at leaf {}", leaf_index);
            self.flags.msg_type_grouping = false;
        }

        if self.flags.msg_from_grouping
            && is_msg_from_field(key)
            && !self.msg_from.track(leaf_index, value)
        {
            log::debug!("message sender grouping disabled at leaf {}", leaf_index);
            self.flags.msg_from_grouping = false;
        }
    }

    fn compute_is_default_chain(&self) -> Result<bool, ParserError> {
        let root = RootItem::ChainId;
        let start = self.cache.entries[root as usize]
            .start_token
            .ok_or(ParserError::JsonMissingChainId)?;

        let mut query = Query::new(root.key(), 0, root.max_level(self.extra_depth_level), None)?;
        let token = query.find(&self.json, start)?;
        let chain_id = self.json.token_bytes(token)?;

        if chain_id == COIN_DEFAULT_CHAINID.as_bytes() {
            log::debug!("default chain");
            Ok(true)
        } else if chain_id == b"0" || chain_id == b"1" {
            log::debug!("chain id not allowed");
            Err(ParserError::UnexpectedChain)
        } else {
            log::debug!("chain is not the default one");
            Ok(false)
        }
    }

    fn subitem_count(&self, root: RootItem) -> u16 {
        if self.cache.total_item_count == 0 {
            return 0;
        }

        let count = self.cache.entries[root as usize].subitem_count;
        match root {
            RootItem::AccountNumber | RootItem::Sequence if !self.mode.expert => 0,
            RootItem::Fee if !self.mode.expert => core::cmp::min(count, 1),
            RootItem::Msgs => {
                let mut count = count;
                if self.flags.msg_type_grouping && self.msg_type.count > 0 {
                    count = count.saturating_sub(self.msg_type.count).saturating_add(1);
                }
                if self.flags.msg_from_grouping && self.msg_from.count > 0 {
                    count = count
                        .saturating_sub(self.msg_from.count)
                        .saturating_add(u16::from(!self.flags.msg_from_grouping_hide_all));
                }
                count
            }
            _ => count,
        }
    }

    fn grouping_filter(&self, root: RootItem) -> Option<GroupingFilter> {
        if root != RootItem::Msgs {
            return None;
        }

        let msg_type = if self.flags.msg_type_grouping && self.msg_type.count > 0 {
            self.msg_type.repr_leaf()
        } else {
            None
        };
        let msg_from = if self.flags.msg_from_grouping && self.msg_from.count > 0 {
            self.msg_from.repr_leaf()
        } else {
            None
        };

        Some(GroupingFilter {
            msg_type,
            msg_from,
            hide_msg_from: self.flags.msg_from_grouping_hide_all,
        })
    }

    /// Maps a display index to its root field and the item index below it
    fn retrieve_tree_indexes(&self, display_idx: u8) -> Result<(RootItem, u16), ParserError> {
        let mut remaining = display_idx as u16;

        for root in RootItem::ALL.iter().copied() {
            let count = self.subitem_count(root);
            if remaining < count {
                return Ok((root, remaining));
            }
            remaining -= count;
        }

        Err(ParserError::DisplayIdxOutOfRange)
    }

    pub(super) fn indexed_num_items(&self) -> Result<u8, ParserError> {
        if !self.flags.cache_valid {
            return Err(ParserError::InitContextEmpty);
        }

        let total = RootItem::ALL
            .iter()
            .fold(0u16, |acc, root| acc.saturating_add(self.subitem_count(*root)));

        u8::try_from(total).map_err(|_| ParserError::UnexpectedNumberItems)
    }

    #[inline(never)]
    pub(super) fn indexed_item(
        &self,
        display_idx: u8,
        key: &mut [u8],
        value: &mut [u8],
        page: u8,
    ) -> Result<u8, ParserError> {
        crate::sys::zemu_log_stack("JsonTx::get_item");

        key.iter_mut().for_each(|b| *b = 0);
        value.iter_mut().for_each(|b| *b = 0);

        if display_idx >= self.indexed_num_items()? {
            return Err(ParserError::DisplayIdxOutOfRange);
        }

        let (root, item_index) = self.retrieve_tree_indexes(display_idx)?;
        let start = self.cache.entries[root as usize]
            .start_token
            .ok_or(ParserError::NoData)?;

        let mut query = Query::new(
            root.key(),
            item_index,
            root.max_level(self.extra_depth_level),
            self.grouping_filter(root),
        )?;
        let token = match query.find(&self.json, start) {
            Err(ParserError::QueryNoResults) => return Err(ParserError::NoData),
            found => found?,
        };

        let raw_key = query.key();
        let pages = if is_amount_key(raw_key) {
            format_amount(&self.json, token, value, page)
        } else {
            handle_ui_message(self.json.token_bytes(token)?, value, page)
        };

        // nothing is shown for an item that can't be fully rendered
        let pages = match pages {
            Ok(pages) => pages,
            Err(e) => {
                value.iter_mut().for_each(|b| *b = 0);
                return Err(e);
            }
        };

        if let Err(e) = write_title(key, substitute_key(raw_key)) {
            value.iter_mut().for_each(|b| *b = 0);
            return Err(e);
        }

        Ok(pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{strlen, AppMode};
    use std::{format, string::String, vec::Vec};

    fn sorted_tx(chain_id: &str, msgs: &str, memo: &str) -> String {
        format!(
            r#"{{"account_number":"108","chain_id":"{}","fee":{{"amount":[{{"amount":"600","denom":"usei"}}],"gas":"200000"}},"memo":"{}","msgs":{},"sequence":"106"}}"#,
            chain_id, memo, msgs
        )
    }

    fn send(from: &str, to: &str, amount: &str) -> String {
        format!(
            r#"{{"type":"cosmos-sdk/MsgSend","value":{{"amount":[{{"amount":"{}","denom":"sei"}}],"from_address":"{}","to_address":"{}"}}}}"#,
            amount, from, to
        )
    }

    fn review(tx: &mut JsonTx) -> Vec<(String, String)> {
        let n = tx.get_num_items().unwrap();
        let mut out = Vec::new();
        for idx in 0..n {
            let mut key = [0u8; 40];
            let mut value = [0u8; 200];
            tx.get_item(idx, &mut key, &mut value, 0).unwrap();
            out.push((
                String::from_utf8(key[..strlen(&key)].to_vec()).unwrap(),
                String::from_utf8(value[..strlen(&value)].to_vec()).unwrap(),
            ));
        }
        out
    }

    fn keys(items: &[(String, String)]) -> Vec<&str> {
        items.iter().map(|(k, _)| k.as_str()).collect()
    }

    #[test]
    fn substitutions() {
        const SUITE: &[(&str, &str)] = &[
            ("chain_id", "Chain ID"),
            ("fee/gas", "Gas"),
            ("fee/gas_limit", "Gas Limit"),
            ("msgs/value/validator_dst_address", "Validator dest"),
            ("tip/tipper", "Tipper"),
            ("msgs/value/unknown", "msgs/value/unknown"),
            ("fee/ga", "fee/ga"),
        ];

        for (raw, expected) in SUITE {
            std::dbg!(raw);
            assert_eq!(substitute_key(raw.as_bytes()), expected.as_bytes());
        }
    }

    #[test]
    fn amount_keys() {
        assert!(is_amount_key(b"fee/amount"));
        assert!(is_amount_key(b"msgs/value/outputs/coins"));
        assert!(!is_amount_key(b"fee/gas"));
        assert!(!is_amount_key(b"msgs/value"));
    }

    #[test]
    fn levels() {
        assert_eq!(RootItem::Fee.max_level(true), 1);
        assert_eq!(RootItem::Tip.max_level(false), 1);
        assert_eq!(RootItem::Msgs.max_level(false), 2);
        assert_eq!(RootItem::Msgs.max_level(true), 3);
        assert_eq!(RootItem::ChainId.max_level(true), 2);
    }

    #[test]
    fn simple_send() {
        let raw = sorted_tx("atlantic-2", &format!("[{}]", send("sei1a", "sei1b", "1500000")), "hi");
        let mut tx = JsonTx::new(raw.as_bytes(), b"", AppMode::default()).unwrap();
        tx.validate().unwrap();

        let items = review(&mut tx);
        assert_eq!(
            items,
            [
                ("Chain ID", "atlantic-2"),
                ("Type", "cosmos-sdk/MsgSend"),
                ("Amount", "1.5 SEI"),
                ("From address", "sei1a"),
                ("To address", "sei1b"),
                ("Memo", "hi"),
                ("Fee", "600 usei"),
            ]
            .iter()
            .map(|(k, v)| (String::from(*k), String::from(*v)))
            .collect::<Vec<_>>()
        );
    }

    #[test]
    fn expert_shows_everything() {
        let raw = sorted_tx("atlantic-2", &format!("[{}]", send("sei1a", "sei1b", "1")), "");
        let mut tx = JsonTx::new(raw.as_bytes(), b"", AppMode::expert()).unwrap();

        let items = review(&mut tx);
        assert_eq!(
            keys(&items),
            [
                "Chain ID",
                "Account number",
                "Sequence",
                "Type",
                "Amount",
                "From address",
                "To address",
                "Fee",
                "Gas",
            ]
        );
    }

    #[test]
    fn grouping_across_messages() {
        let msgs = format!(
            "[{},{},{}]",
            send("sei1a", "sei1b", "1"),
            send("sei1a", "sei1c", "2"),
            send("sei1a", "sei1d", "3")
        );
        let raw = sorted_tx("atlantic-2", &msgs, "");

        let mut tx = JsonTx::new(raw.as_bytes(), b"", AppMode::default()).unwrap();
        let items = review(&mut tx);
        assert_eq!(
            keys(&items),
            [
                "Chain ID",
                "Type",
                "Amount",
                "From address",
                "To address",
                "Amount",
                "To address",
                "Amount",
                "To address",
                "Fee",
            ]
        );

        // the sender is the signer, no need to show it
        let mut tx = JsonTx::new(raw.as_bytes(), b"sei1a", AppMode::default()).unwrap();
        let items = review(&mut tx);
        assert_eq!(items.len(), 9);
        assert!(!keys(&items).contains(&"From address"));

        // other chains show every sender
        let raw = sorted_tx("pacific-1", &msgs, "");
        let mut tx = JsonTx::new(raw.as_bytes(), b"sei1a", AppMode::default()).unwrap();
        let items = review(&mut tx);
        assert_eq!(keys(&items).iter().filter(|k| **k == "From address").count(), 3);
        assert_eq!(keys(&items).iter().filter(|k| **k == "Type").count(), 1);
    }

    #[test]
    fn diverging_values_disable_grouping() {
        let other = send("sei1z", "sei1c", "2").replace("MsgSend", "MsgOther");
        let msgs = format!("[{},{}]", send("sei1a", "sei1b", "1"), other);
        let raw = sorted_tx("atlantic-2", &msgs, "");

        let mut tx = JsonTx::new(raw.as_bytes(), b"sei1a", AppMode::default()).unwrap();
        let items = review(&mut tx);
        assert_eq!(keys(&items).iter().filter(|k| **k == "Type").count(), 2);
        assert_eq!(keys(&items).iter().filter(|k| **k == "From address").count(), 2);
    }

    #[test]
    fn disallowed_chains() {
        for chain in ["0", "1"].iter() {
            let raw = sorted_tx(chain, &format!("[{}]", send("a", "b", "1")), "");
            let mut tx = JsonTx::new(raw.as_bytes(), b"", AppMode::default()).unwrap();
            assert_eq!(tx.get_num_items(), Err(ParserError::UnexpectedChain));
            assert!(!tx.is_indexed());
        }

        let raw = sorted_tx("10", &format!("[{}]", send("a", "b", "1")), "");
        let mut tx = JsonTx::new(raw.as_bytes(), b"", AppMode::default()).unwrap();
        assert!(tx.get_num_items().is_ok());
        assert!(!tx.is_default_chain());
    }

    #[test]
    fn out_of_range() {
        let raw = sorted_tx("atlantic-2", &format!("[{}]", send("a", "b", "1")), "");
        let mut tx = JsonTx::new(raw.as_bytes(), b"", AppMode::default()).unwrap();
        let n = tx.get_num_items().unwrap();

        let mut key = [0u8; 40];
        let mut value = [0u8; 40];
        assert_eq!(
            tx.get_item(n, &mut key, &mut value, 0),
            Err(ParserError::DisplayIdxOutOfRange)
        );
        assert_eq!(
            tx.get_item(u8::MAX, &mut key, &mut value, 0),
            Err(ParserError::DisplayIdxOutOfRange)
        );
    }

    #[test]
    fn uncached_reads_are_refused() {
        let raw = sorted_tx("atlantic-2", &format!("[{}]", send("a", "b", "1")), "");
        let tx = JsonTx::new(raw.as_bytes(), b"", AppMode::default()).unwrap();
        assert_eq!(tx.indexed_num_items(), Err(ParserError::InitContextEmpty));
    }
}
