//! Fare computation for a booking.
//!
//! `charge = (seat + meal) * 1.15 - discount`, where the discount is 10% of the
//! seat price capped at 600 and only applies to discount-eligible passengers
//! in Economy. All arithmetic is fixed-point.

use crate::models::passenger::{MealChoice, Passenger, PassengerCategory};
use crate::models::seat_class::{Cabin, SeatClass};
use crate::utils::error::{AppError, AppResult};
use rust_decimal::Decimal;
use std::str::FromStr;

pub fn tax_multiplier() -> Decimal {
    Decimal::new(115, 2)
}

pub fn discount_rate() -> Decimal {
    Decimal::new(10, 2)
}

pub fn discount_cap() -> Decimal {
    Decimal::new(600, 0)
}

fn invalid_prices() -> AppError {
    AppError::ValidationError("Invalid price values found for seat or food.".into())
}

/// Charge for one passenger against the flight's seat class.
pub fn passenger_charge(passenger: &Passenger, seat_class: &SeatClass) -> AppResult<Decimal> {
    let cabin = Cabin::from_str(&passenger.seat_class).map_err(|_| {
        AppError::ValidationError(format!("Invalid seat class '{}'.", passenger.seat_class))
    })?;
    let fare = seat_class.fare(cabin);

    if fare.seat_price.is_sign_negative() || fare.food_price.is_sign_negative() {
        return Err(invalid_prices());
    }

    let meal = match MealChoice::from_str(&passenger.food) {
        Ok(MealChoice::Yes) => fare.food_price,
        _ => Decimal::ZERO,
    };

    // unknown categories simply get no discount
    let eligible = PassengerCategory::from_str(&passenger.category)
        .map(PassengerCategory::is_discount_eligible)
        .unwrap_or(false);
    let discount = if cabin == Cabin::Economy && eligible {
        fare.seat_price
            .checked_mul(discount_rate())
            .ok_or_else(invalid_prices)?
            .min(discount_cap())
    } else {
        Decimal::ZERO
    };

    fare.seat_price
        .checked_add(meal)
        .and_then(|subtotal| subtotal.checked_mul(tax_multiplier()))
        .and_then(|taxed| taxed.checked_sub(discount))
        .ok_or_else(invalid_prices)
}

/// Sum of the per-passenger charges.
pub fn booking_total(passengers: &[Passenger], seat_class: &SeatClass) -> AppResult<Decimal> {
    passengers
        .iter()
        .try_fold(Decimal::ZERO, |total, passenger| {
            let charge = passenger_charge(passenger, seat_class)?;
            total.checked_add(charge).ok_or_else(|| {
                AppError::ValidationError("Booking total exceeds the supported range.".into())
            })
        })
}
