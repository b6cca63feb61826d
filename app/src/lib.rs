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
#![no_std]
#![macro_use]
#![allow(clippy::enum_variant_names, clippy::manual_range_contains)]

extern crate no_std_compat as std;

pub mod constants;
pub mod crypto;
pub mod handlers;
pub mod parser;
mod sys;
#[macro_use]
pub mod utils;
mod zxerror;

pub use sys::ViewError;
pub use zxerror::ZxError;

pub fn zlog(msg: &str) {
    sys::zemu_log_stack(msg);
}
