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
use crate::{
    constants::SIGNATURE_LEN,
    crypto::{self, Signer},
    handlers::{signing::SignRequest, SignError},
    parser::{DisplayableItem, EthReview},
    sys::{ViewError, Viewable},
    utils::AppMode,
    ZxError,
};

use super::signature_v;

/// Review and signature of an EVM transaction
pub struct SignUI<'b, 's, S: ?Sized> {
    request: SignRequest<'b>,
    review: EthReview<'b>,
    hash: [u8; crypto::KECCAK256_LEN],
    signer: &'s S,
}

impl<'b, 's, S: Signer + ?Sized> SignUI<'b, 's, S> {
    pub fn new(request: SignRequest<'b>, mode: AppMode, signer: &'s S) -> Result<Self, SignError> {
        crate::sys::zemu_log_stack("EthSignUI::new");

        let review = EthReview::parse(request.tx, mode)?;
        let hash = crypto::keccak256(request.tx);

        Ok(Self {
            request,
            review,
            hash,
            signer,
        })
    }

    pub fn review(&self) -> &EthReview<'b> {
        &self.review
    }

    fn v(&self, parity: u8) -> u8 {
        let tx = self.review.tx();
        signature_v(parity, tx.is_typed_tx(), tx.chain_id_low_byte())
    }
}

impl<'b, 's, S: Signer + ?Sized> Viewable for SignUI<'b, 's, S> {
    fn num_items(&mut self) -> Result<u8, ViewError> {
        self.review.num_items()
    }

    #[inline(never)]
    fn render_item(
        &mut self,
        item_n: u8,
        title: &mut [u8],
        message: &mut [u8],
        page: u8,
    ) -> Result<u8, ViewError> {
        self.review.render_item(item_n, title, message, page)
    }

    /// Writes `v || r || s`
    fn accept(&mut self, out: &mut [u8]) -> Result<usize, ZxError> {
        let out = out.get_mut(..SIGNATURE_LEN).ok_or(ZxError::BufferTooSmall)?;
        let signature = self.signer.sign(&self.request.path, &self.hash)?;

        out[0] = self.v(signature.v);
        out[1..33].copy_from_slice(&signature.r);
        out[33..65].copy_from_slice(&signature.s);

        Ok(SIGNATURE_LEN)
    }
}
