//! Pricing of [`Booking`]s.
//!
//! [`Booking`]: crate::domain::Booking

use common::{Date, Money, Percent};
use rust_decimal::Decimal;
use smart_default::SmartDefault;

/// Returns the number of nights between the provided `check_in` and
/// `check_out` [`Date`]s.
///
/// Zero or negative when `check_out` is not after `check_in`.
#[must_use]
pub fn nights(check_in: Date, check_out: Date) -> i64 {
    check_in.days_until(check_out)
}

/// Fixed fee schedule applied on top of a nightly rate.
#[derive(Clone, Copy, Debug, SmartDefault)]
pub struct Fees {
    /// Cleaning fee charged per unit per night.
    #[default(Money::from(40_i64))]
    pub cleaning: Money,

    /// Flat service fee charged once per booking.
    #[default(Money::from(160_i64))]
    pub service: Money,
}

impl Fees {
    /// Computes an itemised [`Quote`] for the provided nightly `rate`.
    ///
    /// Degenerate `nights` are not corrected: zero nights result in the
    /// service fee only, negative ones in a total below it.
    ///
    /// [`None`] if any amount overflows.
    #[must_use]
    pub fn quote(&self, rate: Money, nights: i64, units: u16) -> Option<Quote> {
        let unit_nights = nights.checked_mul(i64::from(units))?;

        let accommodation = rate.checked_mul(unit_nights)?;
        let cleaning = self.cleaning.checked_mul(unit_nights)?;
        let service = self.service;

        Some(Quote {
            nights,
            units,
            accommodation,
            cleaning,
            service,
            total: accommodation.checked_add(cleaning)?.checked_add(service)?,
        })
    }

    /// Computes the total price for the provided nightly `rate`.
    ///
    /// [`None`] if it overflows.
    #[must_use]
    pub fn total(&self, rate: Money, nights: i64, units: u16) -> Option<Money> {
        self.quote(rate, nights, units).map(|q| q.total)
    }
}

/// Itemised price of a stay.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Quote {
    /// Number of nights quoted.
    pub nights: i64,

    /// Number of units quoted.
    pub units: u16,

    /// Nightly rate multiplied by nights and units.
    pub accommodation: Money,

    /// Cleaning fee multiplied by nights and units.
    pub cleaning: Money,

    /// Flat service fee.
    pub service: Money,

    /// Sum of all the above.
    pub total: Money,
}

/// Display-time breakdown of taxes and fees on top of a stored total.
///
/// Never persisted.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Charges {
    /// Stored total the breakdown is computed from.
    pub subtotal: Money,

    /// Value added tax.
    pub tax: Money,

    /// Tourism fee.
    pub tourism: Money,

    /// Municipality fee.
    pub municipality: Money,

    /// Sum of all the above.
    pub total: Money,
}

impl Charges {
    /// Value added tax rate.
    #[expect(unsafe_code, reason = "value is within bounds")]
    pub const TAX: Percent = unsafe {
        Percent::new_unchecked(Decimal::from_parts(7, 0, 0, false, 0))
    };

    /// Tourism fee per unit per night.
    pub const TOURISM_FEE: Money = Money::new(Decimal::TEN);

    /// Municipality fee rate.
    #[expect(unsafe_code, reason = "value is within bounds")]
    pub const MUNICIPALITY: Percent = unsafe {
        Percent::new_unchecked(Decimal::from_parts(5, 0, 0, false, 0))
    };

    /// Computes [`Charges`] for the provided stored `total`.
    ///
    /// Each item and the grand total are rounded to whole units, with
    /// midpoints away from zero.
    ///
    /// [`None`] if any amount overflows.
    #[must_use]
    pub fn new(total: Money, nights: i64, units: u16) -> Option<Self> {
        let unit_nights = nights.checked_mul(i64::from(units))?;

        let tax = Self::TAX.of(total).round();
        let tourism = Self::TOURISM_FEE.checked_mul(unit_nights)?.round();
        let municipality = Self::MUNICIPALITY.of(total).round();

        let grand_total = total
            .checked_add(tax)?
            .checked_add(tourism)?
            .checked_add(municipality)?
            .round();

        Some(Self {
            subtotal: total,
            tax,
            tourism,
            municipality,
            total: grand_total,
        })
    }
}

#[cfg(test)]
mod spec {
    use common::{Date, Money};
    use rust_decimal::Decimal;

    use super::{nights, Charges, Fees};

    fn money(v: i64) -> Money {
        Money::from(v)
    }

    #[test]
    fn default_fees() {
        let fees = Fees::default();

        assert_eq!(fees.cleaning, money(40));
        assert_eq!(fees.service, money(160));
    }

    #[test]
    fn total() {
        let fees = Fees::default();

        assert_eq!(fees.total(money(100), 3, 1), Some(money(580)));
        assert_eq!(fees.total(money(100), 3, 2), Some(money(1000)));
        assert_eq!(fees.total(money(0), 2, 1), Some(money(240)));
    }

    #[test]
    fn total_never_below_service_fee() {
        let fees = Fees::default();

        for rate in [0, 1, 99, 1000] {
            for n in 0..10 {
                for units in 1..4 {
                    let total = fees.total(money(rate), n, units).unwrap();
                    let expected = money(rate) * (n * i64::from(units))
                        + money(40) * (n * i64::from(units))
                        + money(160);

                    assert_eq!(total, expected);
                    assert!(total >= fees.service);
                }
            }
        }
    }

    #[test]
    fn same_day_stay_costs_service_fee_only() {
        let day: Date = "2024-01-10".parse().unwrap();
        let n = nights(day, day);

        assert_eq!(n, 0);
        assert_eq!(Fees::default().total(money(100), n, 1), Some(money(160)));
    }

    #[test]
    fn negative_nights_are_not_corrected() {
        let n = nights(
            "2024-01-13".parse().unwrap(),
            "2024-01-10".parse().unwrap(),
        );

        assert_eq!(n, -3);
        assert_eq!(Fees::default().total(money(100), n, 1), Some(money(-260)));
    }

    #[test]
    fn quote_is_itemised() {
        let quote = Fees::default().quote(money(100), 3, 2).unwrap();

        assert_eq!(quote.accommodation, money(600));
        assert_eq!(quote.cleaning, money(240));
        assert_eq!(quote.service, money(160));
        assert_eq!(quote.total, money(1000));
    }

    #[test]
    fn quote_overflow_is_none() {
        let n = nights(
            "0001-01-01".parse().unwrap(),
            "9999-12-31".parse().unwrap(),
        );
        let fees = Fees::default();

        assert!(fees.quote(money(i64::MAX), n, u16::MAX).is_none());
        assert!(fees.total(money(i64::MAX), n, u16::MAX).is_none());
        assert!(fees.total(Money::new(Decimal::MAX), 1, 1).is_none());
        assert!(fees.total(money(i64::MAX), 3, 1).is_some());
    }

    #[test]
    fn charges() {
        let charges = Charges::new(money(580), 3, 1).unwrap();

        assert_eq!(charges.subtotal, money(580));
        assert_eq!(charges.tax, money(41));
        assert_eq!(charges.tourism, money(30));
        assert_eq!(charges.municipality, money(29));
        assert_eq!(charges.total, money(680));
    }

    #[test]
    fn charges_round_fractional_subtotal() {
        let subtotal = Money::new(Decimal::new(57997, 2));
        let charges = Charges::new(subtotal, 3, 1).unwrap();

        assert_eq!(charges.subtotal, subtotal);
        assert_eq!(charges.tax, money(41));
        assert_eq!(charges.tourism, money(30));
        assert_eq!(charges.municipality, money(29));
        assert_eq!(charges.total, money(680));
    }

    #[test]
    fn charges_scale_tourism_by_units() {
        let charges = Charges::new(money(1000), 3, 2).unwrap();

        assert_eq!(charges.tax, money(70));
        assert_eq!(charges.tourism, money(60));
        assert_eq!(charges.municipality, money(50));
        assert_eq!(charges.total, money(1180));
    }

    #[test]
    fn charges_overflow_is_none() {
        assert!(Charges::new(Money::new(Decimal::MAX), 3, 1).is_none());
    }
}
