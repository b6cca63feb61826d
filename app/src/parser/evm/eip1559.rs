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
use super::{
    base::{parse_scalar, parse_to},
    parse_rlp_list, Address, EthData,
};
use crate::parser::{FromBytes, ParserError};

/// Type 2 transaction, priced with a priority fee and a fee cap
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(any(test, feature = "derive-debug"), derive(Debug))]
pub struct Eip1559<'b> {
    pub chain_id: &'b [u8],
    pub nonce: &'b [u8],
    pub priority_fee: &'b [u8],
    pub max_fee: &'b [u8],
    pub gas_limit: &'b [u8],
    pub to: Option<Address<'b>>,
    pub value: &'b [u8],
    pub data: EthData<'b>,
    pub access_list: &'b [u8],
}

impl<'b> FromBytes<'b> for Eip1559<'b> {
    #[inline(never)]
    fn from_bytes(input: &'b [u8]) -> Result<(&'b [u8], Self), nom::Err<ParserError>> {
        crate::sys::zemu_log_stack("Eip1559::from_bytes");

        let (rem, chain_id) = parse_scalar(input)?;
        if chain_id.is_empty() {
            return Err(ParserError::InvalidChainId.into());
        }

        let (rem, nonce) = parse_scalar(rem)?;
        let (rem, priority_fee) = parse_scalar(rem)?;
        let (rem, max_fee) = parse_scalar(rem)?;
        let (rem, gas_limit) = parse_scalar(rem)?;
        let (rem, to) = parse_to(rem)?;
        let (rem, value) = parse_scalar(rem)?;
        let (rem, data) = EthData::parse(&to, value, rem)?;
        let (rem, access_list) = parse_rlp_list(rem)?;

        if !rem.is_empty() {
            return Err(ParserError::UnexpectedData.into());
        }

        Ok((
            rem,
            Self {
                chain_id,
                nonce,
                priority_fee,
                max_fee,
                gas_limit,
                to,
                value,
                data,
                access_list,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_eip1559_deploy() {
        let data = "02f9018a82a868808506fc23ac008506fc23ac008316e3608080b90170608060405234801561001057600080fd5b50610150806100206000396000f3fe608060405234801561001057600080fd5b50600436106100365760003560e01c80632e64cec11461003b5780636057361d14610059575b600080fd5b610043610075565b60405161005091906100d9565b60405180910390f35b610073600480360381019061006e919061009d565b61007e565b005b60008054905090565b8060008190555050565b60008135905061009781610103565b92915050565b6000602082840312156100b3576100b26100fe565b5b60006100c184828501610088565b91505092915050565b6100d3816100f4565b82525050565b60006020820190506100ee60008301846100ca565b92915050565b6000819050919050565b600080fd5b61010c816100f4565b811461011757600080fd5b5056fea2646970667358221220404e37f487a89a932dca5e77faaf6ca2de3b991f93d230604b1b8daaef64766264736f6c63430008070033c0";
        let data = hex::decode(data).unwrap();

        // data = 2 || rlp([fields])
        let (_, tx_bytes) = parse_rlp_list(&data[1..]).unwrap();
        let (_, tx) = Eip1559::from_bytes(tx_bytes).unwrap();

        assert!(tx.to.is_none());
        assert!(tx.nonce.is_empty());
        assert!(matches!(tx.data, EthData::Deploy(code) if code.len() == 0x170));
        assert_eq!(
            &1500000u64.to_be_bytes()[8 - tx.gas_limit.len()..],
            tx.gas_limit
        );
        assert_eq!(
            &30000000000u64.to_be_bytes()[8 - tx.max_fee.len()..],
            tx.max_fee
        );
        assert_eq!(
            &30000000000u64.to_be_bytes()[8 - tx.priority_fee.len()..],
            tx.priority_fee
        );
        assert_eq!(0, tx.value.len());
    }

    #[test]
    #[cfg(feature = "erc20")]
    fn parse_eip1559_token_transfer() {
        let data = hex::decode("02f86f82053107847735940085174876e80082ea6094e15a8e2ebc5ea4e0f1a5d43e4b1ac3b6d42e5e4f80b844a9059cbb0000000000000000000000001111111111111111111111111111111111111111000000000000000000000000000000000000000000000000000000000016e360c0").unwrap();

        let (_, tx_bytes) = parse_rlp_list(&data[1..]).unwrap();
        let (_, tx) = Eip1559::from_bytes(tx_bytes).unwrap();

        assert_eq!(tx.chain_id, &[0x05, 0x31]);
        assert!(matches!(tx.data, EthData::Erc20(_)));
    }

    #[test]
    fn access_list_must_be_a_list() {
        // 1559 transfer whose access list was replaced by an empty string
        let data = hex::decode("02f182053180843b9aca0084b2d05e008252089435353535353535353535353535353535353535358822b1c8c1227a000080c0").unwrap();
        let mut broken = data.clone();
        let last = broken.len() - 1;
        broken[last] = 0x80;

        let (_, tx_bytes) = parse_rlp_list(&data[1..]).unwrap();
        assert!(Eip1559::from_bytes(tx_bytes).is_ok());

        let (_, tx_bytes) = parse_rlp_list(&broken[1..]).unwrap();
        assert_eq!(
            Eip1559::from_bytes(tx_bytes).map_err(ParserError::from),
            Err(ParserError::InvalidRlpData)
        );
    }
}
