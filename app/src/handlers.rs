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
mod utils;
pub use utils::*;

pub mod eth;
pub mod public_key;
pub mod signing;

use crate::{parser::ParserError, ZxError};

/// Failure while preparing a signature or an address review
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(any(test, feature = "derive-debug"), derive(Debug))]
pub enum SignError {
    /// the request or its transaction can't be reviewed
    Parser(ParserError),
    /// the key holding collaborator failed
    Crypto(ZxError),
}

impl From<ParserError> for SignError {
    fn from(e: ParserError) -> Self {
        Self::Parser(e)
    }
}

impl From<ZxError> for SignError {
    fn from(e: ZxError) -> Self {
        Self::Crypto(e)
    }
}

impl From<nom::Err<ParserError>> for SignError {
    fn from(e: nom::Err<ParserError>) -> Self {
        Self::Parser(e.into())
    }
}
