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

use crate::parser::ParserError;

/// Writes the `page`-th chunk of `item` into `out`, null terminated.
///
/// Returns the number of pages `item` spans for the given `out` size;
/// an empty item still takes one (empty) page
pub fn handle_ui_message(item: &[u8], out: &mut [u8], page: u8) -> Result<u8, ParserError> {
    out.iter_mut().for_each(|b| *b = 0);

    let chunk_len = out.len().saturating_sub(1);
    if chunk_len == 0 {
        return Err(ParserError::BufferTooSmall);
    }

    let n_pages = core::cmp::max(1, (item.len() + chunk_len - 1) / chunk_len);
    let n_pages = u8::try_from(n_pages).map_err(|_| ParserError::ValueOutOfRange)?;

    if page >= n_pages {
        return Err(ParserError::DisplayPageOutOfRange);
    }

    let chunk = item
        .chunks(chunk_len)
        .nth(page as usize)
        .unwrap_or_default();
    out[..chunk.len()].copy_from_slice(chunk);

    Ok(n_pages)
}

/// Writes `label` into `title`, null terminated
pub fn write_title(title: &mut [u8], label: &[u8]) -> Result<(), ParserError> {
    title.iter_mut().for_each(|b| *b = 0);

    if label.len() + 1 > title.len() {
        return Err(ParserError::BufferTooSmall);
    }
    title[..label.len()].copy_from_slice(label);

    Ok(())
}
