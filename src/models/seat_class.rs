use super::{decimal_column, EntityStatus};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sqlx::any::AnyRow;
use sqlx::{FromRow, Row};
use strum_macros::{Display, EnumString};
use validator::Validate;

/// Cabin a passenger travels in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Display, EnumString)]
pub enum Cabin {
    Economy,
    Business,
    First,
}

/// Prices and capacity of one cabin in a seat class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CabinFare {
    pub seat_price: Decimal,
    pub food_price: Decimal,
    pub available_seats: i64,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SeatClass {
    pub id: String,
    pub seat_class_name: String,

    pub economy_seats: i64,
    pub economy_seat_price: Decimal,
    pub economy_food_price: Decimal,
    pub economy_available_seats: i64,

    pub business_seats: i64,
    pub business_seat_price: Decimal,
    pub business_food_price: Decimal,
    pub business_available_seats: i64,

    pub first_class_seats: i64,
    pub first_class_seat_price: Decimal,
    pub first_class_food_price: Decimal,
    pub first_class_available_seats: i64,

    pub total_seats: i64,
    pub total_available_seats: i64,

    pub status: EntityStatus,
}

impl SeatClass {
    /// Totals are always derived from the cabins, never taken from callers.
    pub fn recompute_totals(&mut self) -> Result<(), String> {
        let sum = |counts: [i64; 3]| {
            counts
                .iter()
                .try_fold(0i64, |total, n| total.checked_add(*n))
                .ok_or_else(|| "Seat counts are too large".to_string())
        };
        self.total_seats = sum([self.economy_seats, self.business_seats, self.first_class_seats])?;
        self.total_available_seats = sum([
            self.economy_available_seats,
            self.business_available_seats,
            self.first_class_available_seats,
        ])?;
        Ok(())
    }

    pub fn fare(&self, cabin: Cabin) -> CabinFare {
        match cabin {
            Cabin::Economy => CabinFare {
                seat_price: self.economy_seat_price,
                food_price: self.economy_food_price,
                available_seats: self.economy_available_seats,
            },
            Cabin::Business => CabinFare {
                seat_price: self.business_seat_price,
                food_price: self.business_food_price,
                available_seats: self.business_available_seats,
            },
            Cabin::First => CabinFare {
                seat_price: self.first_class_seat_price,
                food_price: self.first_class_food_price,
                available_seats: self.first_class_available_seats,
            },
        }
    }

    pub fn apply(&mut self, update: SeatClassUpdateRequest) -> Result<(), String> {
        if let Some(name) = update.seat_class_name {
            self.seat_class_name = name;
        }
        macro_rules! assign {
            ($($field:ident),* $(,)?) => {
                $(if let Some(value) = update.$field {
                    self.$field = value;
                })*
            };
        }
        assign!(
            economy_seats,
            economy_seat_price,
            economy_food_price,
            economy_available_seats,
            business_seats,
            business_seat_price,
            business_food_price,
            business_available_seats,
            first_class_seats,
            first_class_seat_price,
            first_class_food_price,
            first_class_available_seats,
        );
        self.recompute_totals()
    }

    pub fn validate_figures(&self) -> Result<(), String> {
        let counts = [
            self.economy_seats,
            self.economy_available_seats,
            self.business_seats,
            self.business_available_seats,
            self.first_class_seats,
            self.first_class_available_seats,
        ];
        if counts.iter().any(|n| *n < 0) {
            return Err("Seat counts cannot be negative".into());
        }
        let cabins = [
            (Cabin::Economy, self.economy_available_seats, self.economy_seats),
            (Cabin::Business, self.business_available_seats, self.business_seats),
            (Cabin::First, self.first_class_available_seats, self.first_class_seats),
        ];
        if let Some((cabin, _, _)) = cabins.iter().find(|(_, available, seats)| available > seats) {
            return Err(format!("{} available seats cannot exceed its seat count", cabin));
        }
        let prices = [
            self.economy_seat_price,
            self.economy_food_price,
            self.business_seat_price,
            self.business_food_price,
            self.first_class_seat_price,
            self.first_class_food_price,
        ];
        if prices.iter().any(|p| p.is_sign_negative()) {
            return Err("Prices cannot be negative".into());
        }
        Ok(())
    }
}

impl<'r> FromRow<'r, AnyRow> for SeatClass {
    fn from_row(row: &'r AnyRow) -> Result<Self, sqlx::Error> {
        Ok(SeatClass {
            id: row.try_get("id")?,
            seat_class_name: row.try_get("seat_class_name")?,
            economy_seats: row.try_get("economy_seats")?,
            economy_seat_price: decimal_column(row, "economy_seat_price")?,
            economy_food_price: decimal_column(row, "economy_food_price")?,
            economy_available_seats: row.try_get("economy_available_seats")?,
            business_seats: row.try_get("business_seats")?,
            business_seat_price: decimal_column(row, "business_seat_price")?,
            business_food_price: decimal_column(row, "business_food_price")?,
            business_available_seats: row.try_get("business_available_seats")?,
            first_class_seats: row.try_get("first_class_seats")?,
            first_class_seat_price: decimal_column(row, "first_class_seat_price")?,
            first_class_food_price: decimal_column(row, "first_class_food_price")?,
            first_class_available_seats: row.try_get("first_class_available_seats")?,
            total_seats: row.try_get("total_seats")?,
            total_available_seats: row.try_get("total_available_seats")?,
            status: super::enum_column(row, "status")?,
        })
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SeatClassCreateRequest {
    #[validate(length(min = 1, message = "Seat class name is required"))]
    pub seat_class_name: String,

    #[serde(default)]
    pub economy_seats: i64,
    #[serde(default)]
    pub economy_seat_price: Decimal,
    #[serde(default)]
    pub economy_food_price: Decimal,
    pub economy_available_seats: i64,

    #[serde(default)]
    pub business_seats: i64,
    #[serde(default)]
    pub business_seat_price: Decimal,
    #[serde(default)]
    pub business_food_price: Decimal,
    pub business_available_seats: i64,

    #[serde(default)]
    pub first_class_seats: i64,
    #[serde(default)]
    pub first_class_seat_price: Decimal,
    #[serde(default)]
    pub first_class_food_price: Decimal,
    pub first_class_available_seats: i64,

    #[validate(length(min = 1, message = "Service provider ID is required"))]
    pub service_provider_id: String,
}

/// Partial update; absent fields keep their stored value. Totals are ignored
/// if sent and recomputed instead.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SeatClassUpdateRequest {
    pub seat_class_name: Option<String>,
    pub economy_seats: Option<i64>,
    pub economy_seat_price: Option<Decimal>,
    pub economy_food_price: Option<Decimal>,
    pub economy_available_seats: Option<i64>,
    pub business_seats: Option<i64>,
    pub business_seat_price: Option<Decimal>,
    pub business_food_price: Option<Decimal>,
    pub business_available_seats: Option<i64>,
    pub first_class_seats: Option<i64>,
    pub first_class_seat_price: Option<Decimal>,
    pub first_class_food_price: Option<Decimal>,
    pub first_class_available_seats: Option<i64>,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SeatClassResponse {
    pub seat_class: SeatClass,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SeatClassListResponse {
    pub seat_classes: Vec<SeatClass>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SeatClass {
        SeatClass {
            id: "sc-1".into(),
            seat_class_name: "AI-101".into(),
            economy_seats: 100,
            economy_seat_price: Decimal::new(1000, 0),
            economy_food_price: Decimal::new(200, 0),
            economy_available_seats: 90,
            business_seats: 20,
            business_seat_price: Decimal::new(5000, 0),
            business_food_price: Decimal::new(500, 0),
            business_available_seats: 20,
            first_class_seats: 8,
            first_class_seat_price: Decimal::new(9000, 0),
            first_class_food_price: Decimal::new(900, 0),
            first_class_available_seats: 7,
            total_seats: 0,
            total_available_seats: 0,
            status: EntityStatus::AwaitingApproval,
        }
    }

    #[test]
    fn totals_are_recomputed_from_cabins() {
        let mut seat_class = sample();
        seat_class.total_seats = 9999;
        seat_class.recompute_totals().unwrap();
        assert_eq!(seat_class.total_seats, 128);
        assert_eq!(seat_class.total_available_seats, 117);
    }

    #[test]
    fn update_recomputes_totals() {
        let mut seat_class = sample();
        seat_class.apply(SeatClassUpdateRequest {
            economy_seats: Some(150),
            economy_available_seats: Some(150),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(seat_class.total_seats, 178);
        assert_eq!(seat_class.total_available_seats, 177);
    }

    #[test]
    fn negative_figures_are_rejected() {
        let mut seat_class = sample();
        seat_class.business_seat_price = Decimal::new(-1, 0);
        assert!(seat_class.validate_figures().is_err());
    }

    #[test]
    fn overflowing_counts_are_rejected() {
        let mut seat_class = sample();
        seat_class.economy_seats = i64::MAX;
        assert!(seat_class.recompute_totals().is_err());

        let mut seat_class = sample();
        let result = seat_class.apply(SeatClassUpdateRequest {
            first_class_available_seats: Some(i64::MAX),
            ..Default::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn available_cannot_exceed_capacity() {
        let mut seat_class = sample();
        seat_class.business_available_seats = 21;
        let err = seat_class.validate_figures().unwrap_err();
        assert!(err.contains("Business"));

        seat_class.business_available_seats = 20;
        assert!(seat_class.validate_figures().is_ok());
    }
}
