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
use crate::ZxError;

#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(any(test, feature = "derive-debug"), derive(Debug))]
#[repr(u8)]
pub enum ViewError {
    Unknown,
    NoData,
    Reject,
}

/// Contract with the display collaborator driving a review
pub trait Viewable {
    /// Return the number of items to render
    fn num_items(&mut self) -> Result<u8, ViewError>;

    /// Render `item_idx` into `title` and `message`
    ///
    /// If an item is too long to render in the output, the number of "pages" is returned,
    /// and each page can be retrieved via the `page_idx` parameter
    fn render_item(
        &mut self,
        item_idx: u8,
        title: &mut [u8],
        message: &mut [u8],
        page_idx: u8,
    ) -> Result<u8, ViewError>;

    /// Called when the last item shown has been "accepted"
    ///
    /// Return is number of bytes written to out
    fn accept(&mut self, out: &mut [u8]) -> Result<usize, ZxError>;

    /// Called when the last item shows has been "rejected"
    fn reject(&mut self, _out: &mut [u8]) -> Result<usize, ZxError> {
        Ok(0)
    }
}
