use airline_backoffice::{
    models::booking::{Booking, BookingCreateRequest, BookingStatus},
    models::payment::{PaymentCreateRequest, PaymentMethod, PaymentStatus},
    services::booking_service::BookingService,
    services::payment_service::PaymentService,
    utils::error::AppError,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use test_context::{test_context, AsyncTestContext};

mod common;
use common::test_utils::{self, TestDb};

struct PaymentContext {
    test_db: TestDb,
    payment_service: PaymentService,
    booking_service: BookingService,
    user_id: String,
    booking: Booking,
}

#[async_trait]
impl AsyncTestContext for PaymentContext {
    async fn setup() -> Self {
        let test_db = TestDb::new().await.expect("Failed to create test database");
        let pool = test_db.pool.clone();

        let user = test_utils::register_user(&pool, "payer@example.com")
            .await
            .expect("Failed to register user");
        let provider = test_utils::register_provider(&pool, "ops@skyair.example.com")
            .await
            .expect("Failed to register provider");
        let flight = test_utils::create_flight(&pool, "SA-303", &provider.id, "Daily")
            .await
            .expect("Failed to create flight");
        let passenger = test_utils::create_passenger(&pool, "Asha", "Economy", "No", "Student")
            .await
            .expect("Failed to create passenger");

        let booking_service = BookingService::new(pool.clone());
        let booking = booking_service
            .create_booking(BookingCreateRequest {
                flight: flight.id,
                user_id: Some(user.id.clone()),
                passenger: vec![passenger.id],
                specific_date: NaiveDate::from_ymd_opt(2024, 12, 2).unwrap(),
            })
            .await
            .expect("Failed to create booking");

        PaymentContext {
            payment_service: PaymentService::new(pool),
            booking_service,
            test_db,
            user_id: user.id,
            booking,
        }
    }

    async fn teardown(self) {}
}

fn pay(booking_id: &str, method: &str) -> PaymentCreateRequest {
    PaymentCreateRequest {
        booking_id: booking_id.to_string(),
        payment_method: method.to_string(),
    }
}

#[test_context(PaymentContext)]
#[tokio::test]
async fn test_payment_folds_fee_into_booking(ctx: &PaymentContext) -> Result<(), AppError> {
    assert_eq!(ctx.booking.total_price, Decimal::new(1050, 0));

    let payment = ctx
        .payment_service
        .create_payment(pay(&ctx.booking.id, "UPI"))
        .await?;

    // 1050 + 5%
    assert_eq!(payment.amount, Decimal::new(11025, 1));
    assert_eq!(payment.payment_method, PaymentMethod::Upi);
    assert_eq!(payment.status, PaymentStatus::Paid);
    assert_eq!(payment.user_id, ctx.user_id);

    let booking = ctx.booking_service.get_booking(&ctx.booking.id).await?.booking;
    assert_eq!(booking.status, BookingStatus::Paid);
    assert_eq!(booking.total_price, payment.amount);
    Ok(())
}

#[test_context(PaymentContext)]
#[tokio::test]
async fn test_second_payment_is_conflict(ctx: &PaymentContext) -> Result<(), AppError> {
    ctx.payment_service
        .create_payment(pay(&ctx.booking.id, "Card"))
        .await?;

    let result = ctx
        .payment_service
        .create_payment(pay(&ctx.booking.id, "Net Banking"))
        .await;

    match result {
        Err(AppError::Conflict(message)) => {
            assert_eq!(message, "Payment for this booking already exists.")
        }
        other => panic!("expected Conflict, got {:?}", other),
    }
    assert_eq!(ctx.test_db.count("payments").await?, 1);
    Ok(())
}

#[test_context(PaymentContext)]
#[tokio::test]
async fn test_payment_rejects_bad_input(ctx: &PaymentContext) -> Result<(), AppError> {
    assert!(matches!(
        ctx.payment_service
            .create_payment(pay(&ctx.booking.id, "Cash"))
            .await,
        Err(AppError::ValidationError(_))
    ));
    assert!(matches!(
        ctx.payment_service
            .create_payment(pay("no-such-booking", "Card"))
            .await,
        Err(AppError::NotFound(_))
    ));
    assert_eq!(ctx.test_db.count("payments").await?, 0);

    let booking = ctx.booking_service.get_booking(&ctx.booking.id).await?.booking;
    assert_eq!(booking.status, BookingStatus::Pending);
    assert_eq!(booking.total_price, Decimal::new(1050, 0));
    Ok(())
}

#[test_context(PaymentContext)]
#[tokio::test]
async fn test_listing_and_deleting_payments(ctx: &PaymentContext) -> Result<(), AppError> {
    assert!(ctx.payment_service.list_payments().await?.is_empty());
    assert!(ctx
        .payment_service
        .list_payments_by_user(&ctx.user_id)
        .await?
        .is_empty());

    let payment = ctx
        .payment_service
        .create_payment(pay(&ctx.booking.id, "Card"))
        .await?;

    let mine = ctx.payment_service.list_payments_by_user(&ctx.user_id).await?;
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].id, payment.id);
    assert!(ctx
        .payment_service
        .list_payments_by_user("someone-else")
        .await?
        .is_empty());

    ctx.payment_service.delete_payment(&payment.id).await?;
    assert!(ctx.payment_service.list_payments().await?.is_empty());
    assert!(matches!(
        ctx.payment_service.delete_payment(&payment.id).await,
        Err(AppError::NotFound(_))
    ));
    Ok(())
}
