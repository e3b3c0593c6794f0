//! Traits for the coefficient rings that matrices are eliminated over.
//! Implementations are provided for machine integers, [`BigInt`], rationals and prime fields up to 251.

use std::fmt::{Debug, Display};
use std::ops::{Add, Div, Mul, Neg, Sub};

use num::bigint::Sign;
use num::rational::Ratio;
use num::{BigInt, BigUint, Integer, One, Signed, Zero};

/// A commutative ring with identity.
///
/// `zero`, `one` and `is_zero` come from [`num::Zero`] and [`num::One`].
pub trait Ring:
    Clone
    + PartialEq
    + Debug
    + Display
    + Zero
    + One
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Neg<Output = Self>
    + Send
    + Sync
    + 'static
{
    /// Multiplicative inverse, if there is one.
    fn inverse(&self) -> Option<Self>;

    fn is_invertible(&self) -> bool {
        self.inverse().is_some()
    }

    /// Short name used when printing modules, e.g. `Z` or `F2`.
    fn symbol() -> String;

    /// `self + other`. All entry arithmetic of matrices and eliminations goes through
    /// `add_ref` and `mul_ref`, so fixed-width integers can refuse to wrap around.
    fn add_ref(&self, other: &Self) -> Self {
        self.clone() + other.clone()
    }

    /// `self * other`, see [`Ring::add_ref`].
    fn mul_ref(&self, other: &Self) -> Self {
        self.clone() * other.clone()
    }
}

/// A ring with division with remainder.
///
/// Implementors must guarantee that for `(q, r) = a.euc_div(b)` with `b != 0` we have
/// `a == q * b + r` and either `r == 0` or `r.degree() < b.degree()`.
/// Elimination only terminates because of this, it is never checked at runtime.
pub trait EuclideanRing: Ring {
    /// Weight used to choose pivots. Must be minimal (and only) for zero.
    type Degree: Ord + Clone + Debug;

    fn euc_div(&self, other: &Self) -> (Self, Self);

    fn degree(&self) -> Self::Degree;

    /// A unit `u` such that `u * self` is the canonical associate of `self`.
    fn normalizing_unit(&self) -> Self;

    fn is_normalized(&self) -> bool {
        self.normalizing_unit().is_one()
    }

    fn divides(&self, other: &Self) -> bool {
        if self.is_zero() {
            return other.is_zero();
        }
        other.euc_div(self).1.is_zero()
    }
}

// ========= Integers ==========================================

/// Entries of fixed-width integer matrices must stay within range during elimination, which
/// can need far larger intermediate values than the input has. Use [`BigInt`] when in doubt.
#[cold]
fn integer_overflow<T: Display>(ty: &str, op: &str, a: &T, b: &T) -> ! {
    panic!("integer overflow in {a} {op} {b} over {ty}, use BigInt for matrices of this size")
}

macro_rules! impl_integer_ring {
    ($int:ty, $deg:ty) => {
        impl Ring for $int {
            fn inverse(&self) -> Option<Self> {
                if *self == 1 || *self == -1 {
                    Some(*self)
                } else {
                    None
                }
            }

            fn symbol() -> String {
                "Z".to_string()
            }

            fn add_ref(&self, other: &Self) -> Self {
                self.checked_add(*other)
                    .unwrap_or_else(|| integer_overflow(stringify!($int), "+", self, other))
            }

            fn mul_ref(&self, other: &Self) -> Self {
                self.checked_mul(*other)
                    .unwrap_or_else(|| integer_overflow(stringify!($int), "*", self, other))
            }
        }

        impl EuclideanRing for $int {
            type Degree = $deg;

            // Truncating division, so the remainder takes the sign of `self`
            fn euc_div(&self, other: &Self) -> (Self, Self) {
                assert!(*other != 0, "Division by zero");
                let q = self
                    .checked_div(*other)
                    .unwrap_or_else(|| integer_overflow(stringify!($int), "/", self, other));
                (q, self - q.mul_ref(other))
            }

            fn degree(&self) -> Self::Degree {
                self.unsigned_abs()
            }

            fn normalizing_unit(&self) -> Self {
                if *self < 0 {
                    -1
                } else {
                    1
                }
            }
        }
    };
}

impl_integer_ring!(i32, u32);
impl_integer_ring!(i64, u64);
impl_integer_ring!(i128, u128);

impl Ring for BigInt {
    fn inverse(&self) -> Option<Self> {
        if self.magnitude().is_one() {
            Some(self.clone())
        } else {
            None
        }
    }

    fn symbol() -> String {
        "Z".to_string()
    }
}

impl EuclideanRing for BigInt {
    type Degree = BigUint;

    fn euc_div(&self, other: &Self) -> (Self, Self) {
        let q = self / other;
        let r = self - &q * other;
        (q, r)
    }

    fn degree(&self) -> Self::Degree {
        self.magnitude().clone()
    }

    fn normalizing_unit(&self) -> Self {
        match self.sign() {
            Sign::Minus => -BigInt::one(),
            _ => BigInt::one(),
        }
    }
}

// ========= Rationals =========================================

impl<T> Ring for Ratio<T>
where
    T: Clone + Integer + Signed + Debug + Display + Send + Sync + 'static,
{
    fn inverse(&self) -> Option<Self> {
        if self.is_zero() {
            None
        } else {
            Some(self.recip())
        }
    }

    fn symbol() -> String {
        "Q".to_string()
    }
}

impl<T> EuclideanRing for Ratio<T>
where
    T: Clone + Integer + Signed + Debug + Display + Send + Sync + 'static,
{
    type Degree = u8;

    fn euc_div(&self, other: &Self) -> (Self, Self) {
        (self.clone().div(other.clone()), Self::zero())
    }

    fn degree(&self) -> Self::Degree {
        u8::from(!self.is_zero())
    }

    fn normalizing_unit(&self) -> Self {
        self.inverse().unwrap_or_else(Self::one)
    }
}

// ========= Prime fields ======================================

/// Const generic struct for the finite field `Z_p`.
/// `P` should be prime, this is not checked.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Zp<const P: u8>(u8);

pub type F2 = Zp<2>;
pub type F3 = Zp<3>;
pub type F5 = Zp<5>;
pub type F7 = Zp<7>;
pub type F11 = Zp<11>;
pub type F13 = Zp<13>;

impl<const P: u8> Zp<P> {
    pub fn new(value: i64) -> Self {
        Self(value.rem_euclid(i64::from(P)) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl<const P: u8> From<i64> for Zp<P> {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl<const P: u8> Debug for Zp<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl<const P: u8> Display for Zp<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl<const P: u8> Add for Zp<P> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(((u16::from(self.0) + u16::from(rhs.0)) % u16::from(P)) as u8)
    }
}

impl<const P: u8> Neg for Zp<P> {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self((P - self.0) % P)
    }
}

impl<const P: u8> Sub for Zp<P> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        self + (-rhs)
    }
}

impl<const P: u8> Mul for Zp<P> {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Self(((u16::from(self.0) * u16::from(rhs.0)) % u16::from(P)) as u8)
    }
}

impl<const P: u8> Zero for Zp<P> {
    fn zero() -> Self {
        Self(0)
    }

    fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl<const P: u8> One for Zp<P> {
    fn one() -> Self {
        Self(1 % P)
    }
}

impl<const P: u8> Ring for Zp<P> {
    // Fermat: a^(p-2) = a^-1
    fn inverse(&self) -> Option<Self> {
        if self.is_zero() {
            return None;
        }
        let mut result = Self::one();
        let mut base = *self;
        let mut exp = P - 2;
        while exp > 0 {
            if exp & 1 == 1 {
                result = result * base;
            }
            base = base * base;
            exp >>= 1;
        }
        Some(result)
    }

    fn symbol() -> String {
        format!("F{P}")
    }
}

impl<const P: u8> EuclideanRing for Zp<P> {
    type Degree = u8;

    fn euc_div(&self, other: &Self) -> (Self, Self) {
        match other.inverse() {
            Some(inv) => (*self * inv, Self::zero()),
            None => panic!("Division by zero in F{P}"),
        }
    }

    fn degree(&self) -> Self::Degree {
        u8::from(!self.is_zero())
    }

    fn normalizing_unit(&self) -> Self {
        self.inverse().unwrap_or_else(Self::one)
    }
}
