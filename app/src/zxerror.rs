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

/// Compatible error definition with ledger-zxlib error,
/// used at the boundary with the key derivation and signing collaborator
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZxError {
    Unknown = 0b00000000,
    Ok = 0b00000011,
    NoData = 0b00000101,
    BufferTooSmall = 0b00000110,
    OutOfBounds = 0b00001001,
    EncodingFailed = 0b00001010,
    InvalidCryptoSettings = 0b00001100,
    LedgerApiError = 0b00001111,
}
