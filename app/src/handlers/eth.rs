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
pub mod public_key;
pub mod signing;

/// EIP-155 `v` of a signature with recovery id `parity`
///
/// Typed transactions carry the bare parity, legacy ones
/// `27 + parity` or `35 + parity + 2 * chain_id`, truncated to a byte
pub fn signature_v(parity: u8, typed: bool, chain_id_low_byte: Option<u8>) -> u8 {
    let parity = parity & 1;

    match (typed, chain_id_low_byte) {
        (true, _) => parity,
        (false, None) => 27 + parity,
        (false, Some(id)) => id.wrapping_mul(2).wrapping_add(35 + parity),
    }
}
