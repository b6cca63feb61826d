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

// Coin
pub const COIN_DEFAULT_CHAINID: &str = "atlantic-2";
pub const COIN_MAX_CHAINID_LEN: usize = 20;
pub const COIN_DEFAULT_DENOM_BASE: &str = "sei";
pub const COIN_DEFAULT_DENOM_REPR: &str = "SEI";
pub const COIN_DEFAULT_DENOM_FACTOR: usize = 6;
pub const COIN_AMOUNT_MAXSIZE: usize = 50;
pub const COIN_DENOM_MAXSIZE: usize = 129;
pub const COIN_HRP: &str = "sei";

// EVM
pub const SEI_TOKEN_SYMBOL: &str = "SEI";
pub const EVM_DECIMALS: usize = 18;
pub const ADDRESS_LEN: usize = 20;
pub const ETH_ARG_LEN: usize = 32;
pub const ETH_SELECTOR_LEN: usize = 4;
pub const DEPLOY_DATA_PREVIEW_LEN: usize = 16;
pub const U256_LEN: usize = 32;

// JSON parser
pub const MAX_NUMBER_OF_TOKENS: usize = 768;
pub const MAX_JSON_NESTING: usize = 32;
pub const MAX_RECURSION_DEPTH: u8 = 6;
pub const NUM_REQUIRED_ROOT_ITEMS: usize = 7;
pub const KEY_BUFFER_LEN: usize = 70;
pub const VALIDATION_KEY_LEN: usize = KEY_BUFFER_LEN + 1;
pub const VALIDATION_VALUE_LEN: usize = 40;

// Formatting scratch buffers
pub const FORMATTED_NUMBER_LEN: usize = 160;
pub const FORMATTED_AMOUNT_LEN: usize = COIN_AMOUNT_MAXSIZE + COIN_DENOM_MAXSIZE + 2;
pub const U64_FORMATTED_SIZE: usize = 20;
pub const U32_FORMATTED_SIZE: usize = 10;
pub const U8_FORMATTED_SIZE: usize = 3;

// Keys and addresses
pub const MAX_BIP32_PATH_DEPTH: usize = 10;
pub const HARDENED: u32 = 0x8000_0000;
pub const BIP44_PURPOSE: u32 = HARDENED | 44;
pub const COIN_TYPE_ETH: u32 = HARDENED | 60;
pub const COIN_TYPE_COSMOS: u32 = HARDENED | 118;
pub const DEFAULT_PATH: [u32; 5] = [BIP44_PURPOSE, COIN_TYPE_ETH, HARDENED, 0, 0];
pub const SECP256K1_PK_LEN: usize = 65;
pub const SECP256K1_COMPRESSED_PK_LEN: usize = 33;
pub const PK_HASH_LEN: usize = 20;
pub const MAX_ADDRESS_LEN: usize = 90;
pub const SIGNATURE_LEN: usize = 65;
