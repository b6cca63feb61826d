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
mod bip32;
pub use bip32::Bip32Path;

use arrayvec::ArrayVec;

use crate::constants::{U32_FORMATTED_SIZE, U64_FORMATTED_SIZE, U8_FORMATTED_SIZE};
use crate::parser::ParserError;

#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(any(test, feature = "derive-debug"), derive(Debug))]
pub enum IntStrToFpStrError {
    BufferFull,
    BufferTooShort,
    /// Digit at .0 is not an ascii number
    NotAllDigitsAreNumbers(usize),
}

impl From<IntStrToFpStrError> for ParserError {
    fn from(err: IntStrToFpStrError) -> Self {
        match err {
            IntStrToFpStrError::BufferFull | IntStrToFpStrError::BufferTooShort => {
                ParserError::BufferTooSmall
            }
            IntStrToFpStrError::NotAllDigitsAreNumbers(_) => ParserError::UnexpectedValue,
        }
    }
}

/// Return the len of the string until null termination
fn strlen(bytes: &[u8]) -> usize {
    bytes.split(|&n| n == 0).next().unwrap_or(bytes).len()
}

macro_rules! num_to_str {
    ($int_type:ty, $_name: ident, $size: expr) => {
        pub fn $_name(number: $int_type, output: &mut [u8]) -> Result<&mut [u8], ParserError> {
            if output.len() < $size {
                return Err(ParserError::BufferTooSmall);
            }
            if number == 0 {
                output[0] = b'0';
                return Ok(&mut output[..1]);
            }

            let mut offset = 0;
            let mut number = number;
            while number != 0 {
                let rem = number % 10;
                output[offset] = b'0' + rem as u8;
                offset += 1;
                number /= 10;
            }

            // digits were written least significant first
            output[..offset].reverse();

            Ok(&mut output[..offset])
        }
    };
}

num_to_str!(u64, u64_to_str, U64_FORMATTED_SIZE);
num_to_str!(u32, u32_to_str, U32_FORMATTED_SIZE);
num_to_str!(u8, u8_to_str, U8_FORMATTED_SIZE);

#[inline(never)]
/// Converts an integer number string
/// to a fixed point number string, in place
///
/// Leading zeros are removed, as well as the trailing zeros of the fractional part
/// and the decimal point itself when the fraction is entirely zero.
///
/// Returns Ok(subslice) which is the subslice with actual content,
/// trimming excess bytes
pub fn intstr_to_fpstr_inplace(
    s: &mut [u8],
    decimals: usize,
) -> Result<&mut [u8], IntStrToFpStrError> {
    if s.is_empty() {
        return Err(IntStrToFpStrError::BufferTooShort);
    }

    //find the length of the string
    // if no 0s are found then the entire string is full with digits
    // so we return error
    let mut num_chars = strlen(s);
    if num_chars == s.len() {
        return Err(IntStrToFpStrError::BufferFull);
    }

    //empty input string
    // let's just write a 0
    if num_chars == 0 {
        s[0] = b'0';
        num_chars = 1;
    }

    let mut first_digit_idx = None;
    for (i, c) in s[..num_chars].iter().enumerate() {
        if !c.is_ascii_digit() {
            return Err(IntStrToFpStrError::NotAllDigitsAreNumbers(i));
        }

        if first_digit_idx.is_none() && *c != b'0' {
            first_digit_idx = Some(i);
        }
    }

    match first_digit_idx {
        Some(idx) => {
            //move first_digit.. to the front
            s.copy_within(idx..num_chars, 0);
            num_chars -= idx;
            s[num_chars..].fill(0);
        }
        None => {
            //it's just all 0s, keep one
            s[1..].fill(0);
            num_chars = 1;
        }
    }

    if decimals == 0 {
        return Ok(&mut s[..num_chars]);
    }

    // digits, the decimal point and at least one leading zero
    if s.len() < num_chars.max(decimals + 1) + 1 {
        return Err(IntStrToFpStrError::BufferTooShort);
    }

    //        0123456789012     <-decimal places
    //        abcd              < numChars = 4
    //                 abcd     < shift
    //        000000000abcd     < fill
    //        0.00000000abcd    < add decimal point
    if num_chars < decimals + 1 {
        let padding = decimals + 1 - num_chars;
        s.copy_within(..num_chars, padding);
        s[..padding].fill(b'0');
        num_chars = decimals + 1;
    }

    let point_position = num_chars - decimals;
    s.copy_within(point_position..num_chars, point_position + 1);
    s[point_position] = b'.';
    num_chars += 1;

    // 0.00500 -> 0.005 and 2000.00 -> 2000
    let mut len = num_chars;
    while len > point_position + 1 && s[len - 1] == b'0' {
        len -= 1;
    }
    if len == point_position + 1 {
        len = point_position;
    }
    s[len..].fill(0);

    Ok(&mut s[..len])
}

/// Joins `left` and `right` separated by a single space
pub fn join_with_space<const N: usize>(
    left: &[u8],
    right: &[u8],
) -> Result<ArrayVec<u8, N>, ParserError> {
    let mut out = ArrayVec::new();
    out.try_extend_from_slice(left)?;
    if !right.is_empty() {
        out.try_push(b' ')?;
        out.try_extend_from_slice(right)?;
    }

    Ok(out)
}

/// Renders the decimal string `digits` with `decimals` implied
/// fractional places, followed by ` symbol` when a symbol is given
pub fn fpstr_with_symbol<const N: usize>(
    digits: &[u8],
    decimals: usize,
    symbol: &[u8],
) -> Result<ArrayVec<u8, N>, ParserError> {
    let mut buffer = [0u8; N];
    // room for the leading zeros, the point and the terminator
    if digits.len().max(decimals + 1) + 2 > N {
        return Err(ParserError::BufferTooSmall);
    }
    buffer[..digits.len()].copy_from_slice(digits);

    let number = intstr_to_fpstr_inplace(&mut buffer, decimals)?;
    join_with_space(number, symbol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use std::{format, string::String, vec::Vec};

    const SUITE: &[(&[u8], usize, &str)] = &[
        //NORMAL
        (b"1", 0, "1"),
        (b"123", 0, "123"),
        (b"123", 5, "0.00123"),
        (b"100000", 9, "0.0001"),
        (b"1234", 5, "0.01234"),
        (b"12345", 5, "0.12345"),
        (b"123456", 5, "1.23456"),
        (b"1234567", 5, "12.34567"),
        //EXTRA
        (b"12345", 2, "123.45"),
        (b"12", 1, "1.2"),
        (b"012", 1, "1.2"),
        (b"0012345", 3, "12.345"),
        (b"9", 6, "0.000009"),
        (b"1000000", 6, "1"),
        (b"1500000", 6, "1.5"),
        // TRIM LEADING
        (b"0", 0, "0"),
        (b"00", 0, "0"),
        (b"00", 2, "0"),
        (b"00001", 0, "1"),
        (b"10000", 0, "10000"),
        (b"2000000000000", 9, "2000"),
        //EMPTY
        (b"", 0, "0"),
        (b"", 1, "0"),
        (b"", 10, "0"),
    ];

    fn create_number_table() -> Vec<(u64, String)> {
        let mut rng = rand::thread_rng();
        (0..200)
            .map(|_| {
                let num = rng.gen_range(0..u64::MAX);
                (num, format!("{}", num))
            })
            .collect()
    }

    #[test]
    fn int_to_str() {
        let mut output = [0; U64_FORMATTED_SIZE];
        for (number, dat) in create_number_table() {
            let res = u64_to_str(number, &mut output[..]).unwrap();
            assert_eq!(dat, core::str::from_utf8(res).unwrap());
            output.iter_mut().for_each(|v| *v = 0);
        }

        let mut output = [0; U8_FORMATTED_SIZE];
        assert_eq!(u8_to_str(255, &mut output).unwrap(), b"255");
        let mut output = [0; U32_FORMATTED_SIZE];
        assert_eq!(u32_to_str(0, &mut output).unwrap(), b"0");
    }

    #[test]
    fn intstr_to_fpstr_inplace_test() {
        for &(input, decimals, expected_output) in SUITE.iter() {
            std::dbg!(
                "SUITE:",
                (
                    core::str::from_utf8(input).unwrap(),
                    decimals,
                    expected_output
                )
            );

            let mut input = Vec::from(input);
            input.resize(input.len() + decimals + 2, 0);

            let out = intstr_to_fpstr_inplace(&mut input, decimals).unwrap();
            assert_eq!(core::str::from_utf8(out).unwrap(), expected_output);
        }
    }

    #[test]
    fn intstr_to_fpstr_rejects() {
        let mut full = *b"1234";
        assert_eq!(
            intstr_to_fpstr_inplace(&mut full, 2).unwrap_err(),
            IntStrToFpStrError::BufferFull
        );

        let mut short = *b"12\0\0";
        assert_eq!(
            intstr_to_fpstr_inplace(&mut short, 5).unwrap_err(),
            IntStrToFpStrError::BufferTooShort
        );

        let mut not_digits = *b"12a4\0\0\0";
        assert_eq!(
            intstr_to_fpstr_inplace(&mut not_digits, 2).unwrap_err(),
            IntStrToFpStrError::NotAllDigitsAreNumbers(2)
        );
    }

    #[test]
    fn symbol_is_joined_with_a_space() {
        let out = fpstr_with_symbol::<32>(b"1000000", 6, b"SEI").unwrap();
        assert_eq!(&out[..], b"1 SEI");

        let out = fpstr_with_symbol::<32>(b"1", 6, b"SEI").unwrap();
        assert_eq!(&out[..], b"0.000001 SEI");

        let out = fpstr_with_symbol::<32>(b"42", 0, b"").unwrap();
        assert_eq!(&out[..], b"42");

        assert_eq!(
            fpstr_with_symbol::<8>(b"1", 18, b"SEI").unwrap_err(),
            ParserError::BufferTooSmall
        );
        assert_eq!(
            fpstr_with_symbol::<10>(b"1", 6, b"SEI").unwrap_err(),
            ParserError::BufferTooSmall
        );
    }
}
