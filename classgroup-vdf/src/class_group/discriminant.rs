// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use crate::error::VdfError::InvalidGroup;
use crate::error::{VdfError, VdfResult};
use crate::math::hash_prime::hash_prime_default;
use crate::math::parameterized_group::{Parameter, ToBytes};
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::Signed;
use tracing::debug;

/// A discriminant for an imaginary class group. The discriminant is a negative integer congruent to
/// 1 mod 8.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Discriminant(BigInt);

fn validate(discriminant: &BigInt) -> VdfResult<()> {
    if !discriminant.is_negative() || discriminant.mod_floor(&BigInt::from(8)) != BigInt::from(1) {
        return Err(InvalidGroup);
    }
    Ok(())
}

impl TryFrom<BigInt> for Discriminant {
    type Error = VdfError;

    fn try_from(value: BigInt) -> VdfResult<Self> {
        validate(&value)?;
        Ok(Self(value))
    }
}

impl Discriminant {
    /// Return the number of bits needed to represent this discriminant, not including the sign bit.
    pub fn bits(&self) -> u64 {
        self.0.bits()
    }

    /// The number of bytes used to encode each coefficient of a quadratic form with this
    /// discriminant.
    pub fn int_size(&self) -> usize {
        (self.0.bits() as usize + 16) >> 4
    }

    /// The length of the encoding of a quadratic form with this discriminant.
    pub fn element_size(&self) -> usize {
        2 * self.int_size()
    }

    /// Borrow a reference to the underlying big integer.
    pub(crate) fn as_bigint(&self) -> &BigInt {
        &self.0
    }
}

impl Parameter for Discriminant {
    /// Compute a valid discriminant (aka a negative prime equal to 1 mod 8) based on the given seed.
    /// The size_in_bits must be a positive multiple of 8.
    fn from_seed(seed: &[u8], size_in_bits: usize) -> VdfResult<Discriminant> {
        if size_in_bits == 0 || size_in_bits % 8 != 0 {
            return Err(InvalidGroup);
        }
        // Set the lower three bits to ensure that the prime is 7 mod 8 which makes the discriminant 1 mod 8.
        let prime = hash_prime_default(seed, size_in_bits / 8, &[0, 1, 2, size_in_bits - 1])
            .ok_or(InvalidGroup)?;
        debug!(size_in_bits, "Derived class group discriminant from seed");
        Self::try_from(-BigInt::from(prime))
    }
}

impl ToBytes for Discriminant {
    /// Big-endian encoding of the absolute value.
    fn to_bytes(&self) -> Vec<u8> {
        self.0.to_bytes_be().1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discriminant_validation() {
        assert!(Discriminant::try_from(BigInt::from(-1)).is_err());
        assert!(Discriminant::try_from(BigInt::from(-7)).is_ok());
        assert!(Discriminant::try_from(BigInt::from(7)).is_err());
        assert!(Discriminant::try_from(BigInt::from(-223)).is_ok());
    }

    #[test]
    fn test_discriminant_to_bytes() {
        let discriminant = Discriminant::try_from(BigInt::from(-223)).unwrap();
        assert_eq!(vec![223u8], discriminant.to_bytes());

        let discriminant = Discriminant::from_seed(&[0x01, 0x02, 0x03], 512).unwrap();
        let bytes = discriminant.to_bytes();
        assert_eq!(64, bytes.len());
        assert_eq!(
            discriminant,
            Discriminant::try_from(-BigInt::from_bytes_be(num_bigint::Sign::Plus, &bytes)).unwrap()
        );
    }

    #[test]
    fn test_from_seed() {
        let discriminant = Discriminant::from_seed(b"seed", 1024).unwrap();
        assert_eq!(1024, discriminant.bits());
        assert_eq!(discriminant, Discriminant::from_seed(b"seed", 1024).unwrap());
        assert_ne!(discriminant, Discriminant::from_seed(b"other seed", 1024).unwrap());

        assert_eq!(Err(InvalidGroup), Discriminant::from_seed(b"seed", 1023));
        assert_eq!(Err(InvalidGroup), Discriminant::from_seed(b"seed", 0));
    }

    #[test]
    fn test_element_size() {
        let discriminant = Discriminant::from_seed(&[0u8; 32], 2048).unwrap();
        assert_eq!(2048, discriminant.bits());
        assert_eq!(129, discriminant.int_size());
        assert_eq!(258, discriminant.element_size());
    }
}
