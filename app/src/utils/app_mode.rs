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

/// User toggles in effect for one review, owned by the caller
#[derive(Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(any(test, feature = "derive-debug"), derive(Debug))]
pub struct AppMode {
    /// shows every field, including account number, sequence and the whole fee
    pub expert: bool,
    /// allows contract deployments and calls whose calldata can't be decoded
    pub blind_sign: bool,
}

impl AppMode {
    pub const fn expert() -> Self {
        Self {
            expert: true,
            blind_sign: false,
        }
    }

    pub const fn with_blind_sign(self) -> Self {
        Self {
            blind_sign: true,
            ..self
        }
    }
}
