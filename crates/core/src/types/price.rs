//! Dish price using decimal arithmetic.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// Zero or negative amounts are not sellable.
    #[error("price must be greater than zero")]
    NotPositive,

    /// More fractional digits than the stored column keeps.
    #[error("price can have at most 2 decimal places")]
    TooPrecise,

    /// At or above [`Price::MAX_EXCLUSIVE`].
    #[error("price is too large")]
    TooLarge,
}

/// Fractional digits kept for a price (`NUMERIC(12, 2)`).
pub const MAX_SCALE: u32 = 2;

/// Price of a dish in the restaurant's currency.
///
/// Serialized as a decimal string (`"12.50"`) so no precision is lost in
/// transit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Smallest amount that no longer fits ten integer digits.
    pub const MAX_EXCLUSIVE: Decimal = Decimal::from_parts(0x540B_E400, 2, 0, false, 0); // 10^10

    /// Build a price that every store can hold exactly.
    ///
    /// Trailing zeros do not count towards the scale, so `"12.500"` is
    /// accepted as `12.50`.
    ///
    /// # Errors
    ///
    /// - [`PriceError::NotPositive`] if `amount <= 0`
    /// - [`PriceError::TooPrecise`] for more than two decimal places
    /// - [`PriceError::TooLarge`] if `amount >= 10^10`
    pub fn parse_positive(mut amount: Decimal) -> Result<Self, PriceError> {
        if amount <= Decimal::ZERO {
            return Err(PriceError::NotPositive);
        }
        if amount.normalize().scale() > MAX_SCALE {
            return Err(PriceError::TooPrecise);
        }
        if amount >= Self::MAX_EXCLUSIVE {
            return Err(PriceError::TooLarge);
        }
        amount.rescale(MAX_SCALE);
        Ok(Self(amount))
    }

    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(amount))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}
