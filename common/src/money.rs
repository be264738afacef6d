//! [`Money`]-related definitions.

use std::{fmt, str::FromStr};

use rust_decimal::{
    prelude::ToPrimitive as _, Decimal, RoundingStrategy,
};

use crate::define_kind;

/// Amount of money in some [`Currency`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Money {
    /// Amount of this [`Money`].
    pub amount: Decimal,

    /// [`Currency`] of this amount.
    pub currency: Currency,
}

impl Money {
    /// Rounds this [`Money`] to whole currency units, half away from zero.
    ///
    /// Fees are charged in integer currency units, so every derived amount
    /// passes through this before being persisted or displayed.
    #[must_use]
    pub fn round_to_unit(self) -> Self {
        Self {
            amount: self
                .amount
                .round_dp_with_strategy(
                    0,
                    RoundingStrategy::MidpointAwayFromZero,
                ),
            currency: self.currency,
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { amount, currency } = self;
        if amount.is_integer() {
            write!(f, "{}{currency}", amount.to_i128().expect("integer"))
        } else {
            write!(f, "{amount}{currency}")
        }
    }
}

impl FromStr for Money {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() < 4 {
            return Err("too short");
        }

        let (amount, currency) = s.split_at(s.len() - 3);
        let amount = Decimal::from_str(amount).map_err(|_| "invalid amount")?;
        let currency =
            Currency::from_str(currency).map_err(|_| "invalid currency")?;

        Ok(Self { amount, currency })
    }
}

define_kind! {
    #[doc = "Currency of a [`Money`] amount."]
    enum Currency {
        #[doc = "Vietnamese Dong."]
        Vnd = 1,

        #[doc = "US Dollar."]
        Usd = 2,
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use rust_decimal::Decimal;

    use super::{Currency, Money};

    fn decimal(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn vnd(s: &str) -> Money {
        Money {
            amount: decimal(s),
            currency: Currency::Vnd,
        }
    }

    #[test]
    fn from_str() {
        assert_eq!(Money::from_str("50000VND").unwrap(), vnd("50000"));
        assert_eq!(
            Money::from_str("123.45USD").unwrap(),
            Money {
                amount: decimal("123.45"),
                currency: Currency::Usd,
            },
        );

        assert!(Money::from_str("123.45").is_err());
        assert!(Money::from_str("123.45Vn").is_err());
        assert!(Money::from_str("123.45Vndong").is_err());

        assert!(Money::from_str("123.00VND").is_ok());
        assert!(Money::from_str("123.0VND").is_ok());
        assert!(Money::from_str("123VND").is_ok());
    }

    #[test]
    fn to_string() {
        assert_eq!(vnd("50000").to_string(), "50000VND");
        assert_eq!(vnd("50000.5").to_string(), "50000.5VND");
        assert_eq!(vnd("123.00").to_string(), "123VND");
        assert_eq!(
            Money {
                amount: decimal("123.45"),
                currency: Currency::Usd,
            }
            .to_string(),
            "123.45USD",
        );
    }

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(vnd("100000.5").round_to_unit(), vnd("100001"));
        assert_eq!(vnd("100000.49").round_to_unit(), vnd("100000"));
        assert_eq!(vnd("100000").round_to_unit(), vnd("100000"));
        assert_eq!(vnd("-0.5").round_to_unit(), vnd("-1"));
    }
}
