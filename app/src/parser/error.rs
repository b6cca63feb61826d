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
use arrayvec::CapacityError;
use nom::error::ErrorKind;

use crate::sys::ViewError;

#[repr(u32)]
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(any(test, feature = "derive-debug"), derive(Debug))]
pub enum ParserError {
    // Generic errors
    NoData,
    InitContextEmpty,
    DisplayIdxOutOfRange,
    DisplayPageOutOfRange,
    UnexpectedError,
    // internal, a query walked its whole subtree without reaching the wanted item
    QueryNoResults,

    // Resource limits
    BufferTooSmall,
    RecursionDepthExceeded,
    ValueOutOfRange,
    OperationOverflows,

    // JSON
    JsonZeroTokens,
    JsonTooManyTokens,
    JsonIncomplete,
    JsonUnexpectedRoot,
    JsonContainsWhitespace,
    JsonIsNotSorted,
    JsonMissingChainId,
    JsonMissingSequence,
    JsonMissingFee,
    JsonMissingMsgs,
    JsonMissingAccountNumber,
    JsonMissingMemo,

    // Transaction content
    UnexpectedBufferEnd,
    UnexpectedData,
    UnexpectedType,
    UnexpectedField,
    UnexpectedValue,
    UnexpectedNumberItems,
    UnexpectedChain,
    InvalidRlpData,
    InvalidTransactionType,
    InvalidAddress,
    InvalidChainId,
    InvalidEthSelector,
    InvalidEthMessage,
    InvalidPath,
    BlindSignNotEnabled,
}

impl From<ErrorKind> for ParserError {
    fn from(err: ErrorKind) -> Self {
        match err {
            ErrorKind::Eof => ParserError::UnexpectedBufferEnd,
            ErrorKind::Permutation => ParserError::UnexpectedType,
            ErrorKind::TooLarge => ParserError::ValueOutOfRange,
            _ => ParserError::UnexpectedError,
        }
    }
}

impl<I> nom::error::ParseError<I> for ParserError {
    fn from_error_kind(_input: I, kind: ErrorKind) -> Self {
        Self::from(kind)
    }

    // only the latest reported error is kept, there is no room for a backtrace
    fn append(_input: I, _kind: ErrorKind, other: Self) -> Self {
        other
    }
}

impl From<ParserError> for nom::Err<ParserError> {
    fn from(error: ParserError) -> Self {
        nom::Err::Error(error)
    }
}

impl<T> From<CapacityError<T>> for ParserError {
    fn from(_error: CapacityError<T>) -> Self {
        ParserError::BufferTooSmall
    }
}

impl From<nom::Err<Self>> for ParserError {
    fn from(e: nom::Err<Self>) -> Self {
        match e {
            nom::Err::Error(e) => e,
            nom::Err::Failure(e) => e,
            nom::Err::Incomplete(_) => Self::UnexpectedBufferEnd,
        }
    }
}

impl From<ParserError> for ViewError {
    fn from(error: ParserError) -> Self {
        match error {
            ParserError::NoData | ParserError::DisplayIdxOutOfRange => ViewError::NoData,
            _ => ViewError::Unknown,
        }
    }
}
