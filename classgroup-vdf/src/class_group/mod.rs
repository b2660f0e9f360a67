// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! This module contains implementation of imaginary class groups. Elements are represented by
//! binary quadratic forms which forms a group under composition. Here we use additive notation
//! for the composition, so squaring is [Doubling::double] and exponentiation is
//! [ParameterizedGroupElement::mul].

use crate::class_group::discriminant::Discriminant;
use crate::error::VdfError::{InputLengthWrong, InvalidEncoding};
use crate::error::VdfResult;
use crate::math::extended_gcd::{extended_euclidean_algorithm, EuclideanAlgorithmOutput};
use crate::math::parameterized_group::{
    Doubling, ParameterizedGroupElement, ToBytes, UnknownOrderGroupElement,
};
use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{One, Signed, Zero};
use std::cmp::Ordering;
use std::mem::swap;
use std::ops::{Add, AddAssign, Shl, Shr};

pub mod discriminant;


/// A binary quadratic form, (a, b, c) for arbitrary integers a, b, and c.
///
/// The `partial_gcd_limit` variable must be equal to `|discriminant|^{1/4}` and is used to speed up
/// the composition algorithm.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct QuadraticForm {
    a: BigInt,
    b: BigInt,
    c: BigInt,
    partial_gcd_limit: BigInt,
}

impl QuadraticForm {
    /// Create a new quadratic form given only the a and b coefficients and the discriminant.
    pub fn from_a_b_discriminant(
        a: BigInt,
        b: BigInt,
        discriminant: &Discriminant,
    ) -> VdfResult<Self> {
        if !a.is_positive() {
            return Err(InvalidEncoding);
        }
        let numerator = b.pow(2) - discriminant.as_bigint();
        let denominator = &a << 2;
        if !numerator.is_multiple_of(&denominator) {
            return Err(InvalidEncoding);
        }
        let c = numerator / denominator;
        Ok(Self::from_coefficients(a, b, c, discriminant))
    }

    fn from_coefficients(a: BigInt, b: BigInt, c: BigInt, discriminant: &Discriminant) -> Self {
        Self {
            a,
            b,
            c,
            // This limit is used by the partial euclidean algorithm in compose and double.
            partial_gcd_limit: discriminant.as_bigint().abs().nth_root(4),
        }
    }

    /// Compute the discriminant `b^2 - 4ac` for this quadratic form.
    fn discriminant_value(&self) -> BigInt {
        self.b.pow(2) - ((&self.a * &self.c) << 2)
    }

    /// Return true if this form is in normal form: -a < b <= a.
    fn is_normal(&self) -> bool {
        match self.b.magnitude().cmp(self.a.magnitude()) {
            Ordering::Less => true,
            Ordering::Equal => !self.b.is_negative(),
            Ordering::Greater => false,
        }
    }

    /// Return a normalized form equivalent to this quadratic form. See [`QuadraticForm::is_normal`].
    fn normalize(&mut self) {
        // See section 5 in https://github.com/Chia-Network/chiavdf/blob/main/classgroups.pdf.
        if self.is_normal() {
            return;
        }
        let r = (&self.a - &self.b).div_floor(&self.a).shr(1);
        let ra: BigInt = &r * &self.a;
        self.c.add_assign((&ra + &self.b) * &r);
        self.b.add_assign(&ra.shl(1));
    }

    /// Return true if this form is reduced: A form is reduced if it is normal (see
    /// [`QuadraticForm::is_normal`]) and a <= c and if a == c then b >= 0.
    fn is_reduced(&self) -> bool {
        self.is_normal() && self.is_reduced_assuming_normal()
    }

    fn is_reduced_assuming_normal(&self) -> bool {
        match self.a.cmp(&self.c) {
            Ordering::Less => true,
            Ordering::Equal => !self.b.is_negative(),
            Ordering::Greater => false,
        }
    }

    /// Return a reduced form (see [`QuadraticForm::is_reduced`]) equivalent to this quadratic form.
    fn reduce(&mut self) {
        // See section 5 in https://github.com/Chia-Network/chiavdf/blob/main/classgroups.pdf.
        self.normalize();
        while !self.is_reduced_assuming_normal() {
            let s = (&self.b + &self.c).div_floor(&self.c).shr(1);
            let cs: BigInt = &self.c * &s;
            swap(&mut self.a, &mut self.c);
            self.c += (&cs - &self.b) * &s;
            self.b = cs.shl(1) - &self.b;
        }
    }

    /// Compute the composition of this quadratic form with another quadratic form.
    pub fn compose(&self, rhs: &QuadraticForm) -> QuadraticForm {
        // Slightly optimised version of Algorithm 1 from Jacobson, Jr, Michael & Poorten, Alfred
        // (2002). "Computational aspects of NUCOMP", Lecture Notes in Computer Science.
        // (https://www.researchgate.net/publication/221451638_Computational_aspects_of_NUCOMP)
        // The paragraph numbers and variable names follow the paper.

        let u1 = &self.a;
        let v1 = &self.b;
        let w1 = &self.c;
        let u2 = &rhs.a;
        let v2 = &rhs.b;
        let w2 = &rhs.c;

        // 1.
        let s: BigInt = (v1 + v2) >> 1;
        let m = v2 - &s;

        // 2.
        let EuclideanAlgorithmOutput {
            gcd: f,
            x: b,
            y: c,
            a_divided_by_gcd: mut capital_cy,
            b_divided_by_gcd: mut capital_by,
        } = extended_euclidean_algorithm(u2, u1);

        let (q, r) = s.div_rem(&f);
        let (g, capital_bx, capital_dy) = if r.is_zero() {
            (f, &m * &b, q)
        } else {
            // 3.
            let EuclideanAlgorithmOutput {
                gcd: g,
                x: _,
                y,
                a_divided_by_gcd: h,
                b_divided_by_gcd,
            } = extended_euclidean_algorithm(&f, &s);
            capital_by *= &h;
            capital_cy *= &h;

            // 4.
            let l = (&y * (&b * (w1.mod_floor(&h)) + &c * (w2.mod_floor(&h)))).mod_floor(&h);
            (
                g,
                &b * (&m / &h) + &l * (&capital_by / &h),
                b_divided_by_gcd,
            )
        };

        // 5. (partial xgcd)
        let mut bx = capital_bx.mod_floor(&capital_by);
        let mut by = capital_by.clone();

        let mut x = BigInt::one();
        let mut y = BigInt::zero();
        let mut z = 0u32;

        while by.abs() > self.partial_gcd_limit && !bx.is_zero() {
            let (q, t) = by.div_rem(&bx);
            by = bx;
            bx = t;
            swap(&mut x, &mut y);
            x -= &q * &y;
            z += 1;
        }

        if z.is_odd() {
            by = -by;
            y = -y;
        }

        let u3: BigInt;
        let w3: BigInt;
        let v3: BigInt;

        if z == 0 {
            // 6.
            let q = &capital_cy * &bx;
            let cx = (&q - &m) / &capital_by;
            let dx = (&bx * &capital_dy - w2) / &capital_by;
            u3 = &by * &capital_cy;
            w3 = &bx * &cx - &g * &dx;
            v3 = v2 - (&q << 1);
        } else {
            // 7.
            let cx = (&capital_cy * &bx - &m * &x) / &capital_by;
            let q1 = &by * &cx;
            let q2 = &q1 + &m;
            let dx = (&capital_dy * &bx - w2 * &x) / &capital_by;
            let q3 = &y * &dx;
            let q4 = &q3 + &capital_dy;
            let dy = &q4 / &x;
            let cy = if !b.is_zero() {
                &q2 / &bx
            } else {
                (&cx * &dy - w1) / &dx
            };

            u3 = &by * &cy - &g * &y * &dy;
            w3 = &bx * &cx - &g * &x * &dx;
            v3 = &g * (&q3 + &q4) - &q1 - &q2;
        }

        let mut form = QuadraticForm {
            a: u3,
            b: v3,
            c: w3,
            partial_gcd_limit: self.partial_gcd_limit.clone(),
        };
        form.reduce();
        form
    }

    /// The number of bytes used per coefficient in the encoding of this form.
    fn int_size(&self) -> usize {
        (self.discriminant_value().bits() as usize + 16) >> 4
    }
}

/// Encode `value` as signed big-endian bytes left-padded with its sign to `length` bytes.
fn to_signed_bytes_be_padded(value: &BigInt, length: usize) -> Vec<u8> {
    let bytes = value.to_signed_bytes_be();
    debug_assert!(bytes.len() <= length);
    let padding = if value.is_negative() { 0xff } else { 0x00 };
    let mut result = vec![padding; length.saturating_sub(bytes.len())];
    result.extend_from_slice(&bytes);
    result
}

impl Doubling for QuadraticForm {
    fn double(&self) -> Self {
        // Slightly optimised version of Algorithm 2 from Jacobson, Jr, Michael & Poorten, Alfred
        // (2002). "Computational aspects of NUCOMP", Lecture Notes in Computer Science.
        // (https://www.researchgate.net/publication/221451638_Computational_aspects_of_NUCOMP)
        // The paragraph numbers and variable names follow the paper.

        let u = &self.a;
        let v = &self.b;
        let w = &self.c;

        let EuclideanAlgorithmOutput {
            gcd: g,
            x: _,
            y,
            a_divided_by_gcd: capital_by,
            b_divided_by_gcd: capital_dy,
        } = extended_euclidean_algorithm(u, v);

        let mut bx = (&y * w).mod_floor(&capital_by);
        let mut by = capital_by.clone();

        let mut x = BigInt::one();
        let mut y = BigInt::zero();
        let mut z = 0u32;

        while by.abs() > self.partial_gcd_limit && !bx.is_zero() {
            let (q, t) = by.div_rem(&bx);
            by = bx;
            bx = t;
            swap(&mut x, &mut y);
            x -= &q * &y;
            z += 1;
        }

        if z.is_odd() {
            by = -by;
            y = -y;
        }

        let mut u3: BigInt;
        let mut w3: BigInt;
        let mut v3: BigInt;

        if z == 0 {
            let dx = (&bx * &capital_dy - w) / &capital_by;
            u3 = &by * &by;
            w3 = &bx * &bx;
            let s = &bx + &by;
            v3 = v - &s * &s + &u3 + &w3;
            w3 = &w3 - &g * &dx;
        } else {
            let dx = (&bx * &capital_dy - w * &x) / &capital_by;
            let q1 = &dx * &y;
            let mut dy = &q1 + &capital_dy;
            v3 = &g * (&dy + &q1);
            dy = &dy / &x;
            u3 = &by * &by;
            w3 = &bx * &bx;
            v3 = &v3 - (&bx + &by).pow(2) + &u3 + &w3;

            u3 = &u3 - &g * &y * &dy;
            w3 = &w3 - &g * &x * &dx;
        }

        let mut form = QuadraticForm {
            a: u3,
            b: v3,
            c: w3,
            partial_gcd_limit: self.partial_gcd_limit.clone(),
        };
        form.reduce();
        form
    }
}

impl ParameterizedGroupElement for QuadraticForm {
    /// The discriminant of a quadratic form defines the class group.
    type ParameterType = Discriminant;

    /// The form `(1, 1, (1 - discriminant) / 4)`.
    fn zero(discriminant: &Discriminant) -> Self {
        let c = (BigInt::one() - discriminant.as_bigint()) >> 2;
        Self::from_coefficients(BigInt::one(), BigInt::one(), c, discriminant)
    }

    /// The form `(2, 1, (1 - discriminant) / 8)`. This is an element with a presumed large order
    /// which exists because the discriminant is 1 mod 8.
    fn generator(discriminant: &Discriminant) -> Self {
        let c = (BigInt::one() - discriminant.as_bigint()) >> 3;
        Self::from_coefficients(BigInt::from(2), BigInt::one(), c, discriminant)
    }

    fn mul(&self, scale: &BigUint) -> Self {
        if scale.is_zero() {
            let c = (BigInt::one() - self.discriminant_value()) >> 2;
            return Self {
                a: BigInt::one(),
                b: BigInt::one(),
                c,
                partial_gcd_limit: self.partial_gcd_limit.clone(),
            };
        }

        let mut result = self.clone();
        for i in (0..scale.bits() - 1).rev() {
            result = result.double();
            if scale.bit(i) {
                result = result + self;
            }
        }
        result
    }

    fn is_in_group(&self, discriminant: &Discriminant) -> bool {
        self.discriminant_value() == *discriminant.as_bigint()
    }

    /// Deserialize a quadratic form. The format is `a || b` where each coefficient is encoded as
    /// signed big-endian bytes, left-padded with the sign to [Discriminant::int_size] bytes. The c
    /// coefficient is computed from a, b and the discriminant.
    ///
    /// Only reduced forms are accepted, so every group element has exactly one encoding.
    ///
    /// See also [`ToBytes::to_bytes`].
    fn from_bytes(bytes: &[u8], discriminant: &Discriminant) -> VdfResult<Self> {
        let int_size = discriminant.int_size();
        if bytes.len() != 2 * int_size {
            return Err(InputLengthWrong(2 * int_size));
        }
        let (a_bytes, b_bytes) = bytes.split_at(int_size);
        let form = Self::from_a_b_discriminant(
            BigInt::from_signed_bytes_be(a_bytes),
            BigInt::from_signed_bytes_be(b_bytes),
            discriminant,
        )?;
        if !form.is_reduced() {
            return Err(InvalidEncoding);
        }
        Ok(form)
    }
}

impl Add<&QuadraticForm> for QuadraticForm {
    type Output = QuadraticForm;

    fn add(self, rhs: &QuadraticForm) -> Self::Output {
        self.compose(rhs)
    }
}

impl Add<&QuadraticForm> for &QuadraticForm {
    type Output = QuadraticForm;

    fn add(self, rhs: &QuadraticForm) -> Self::Output {
        self.compose(rhs)
    }
}

impl ToBytes for QuadraticForm {
    /// Serialize this form as `a || b`. See [`ParameterizedGroupElement::from_bytes`] for the format.
    fn to_bytes(&self) -> Vec<u8> {
        let int_size = self.int_size();
        let mut result = to_signed_bytes_be_padded(&self.a, int_size);
        result.extend(to_signed_bytes_be_padded(&self.b, int_size));
        result
    }
}

impl UnknownOrderGroupElement for QuadraticForm {}
