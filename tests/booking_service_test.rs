use airline_backoffice::{
    models::booking::{BookingCreateRequest, BookingStatus},
    services::booking_service::BookingService,
    services::user_service::UserService,
    utils::error::AppError,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use test_context::{test_context, AsyncTestContext};
use tokio::task::JoinSet;

mod common;
use common::test_utils::{self, FileTestDb, TestDb};

struct BookingContext {
    test_db: TestDb,
    booking_service: BookingService,
    user_service: UserService,
    user_id: String,
    flight_id: String,
}

#[async_trait]
impl AsyncTestContext for BookingContext {
    async fn setup() -> Self {
        let test_db = TestDb::new().await.expect("Failed to create test database");
        let pool = test_db.pool.clone();

        let user = test_utils::register_user(&pool, "traveller@example.com")
            .await
            .expect("Failed to register user");
        let provider = test_utils::register_provider(&pool, "ops@skyair.example.com")
            .await
            .expect("Failed to register provider");
        // Weekly on Monday
        let flight = test_utils::create_flight(&pool, "SA-101", &provider.id, "Weekly:Monday")
            .await
            .expect("Failed to create flight");

        BookingContext {
            booking_service: BookingService::new(pool.clone()),
            user_service: UserService::new(pool),
            test_db,
            user_id: user.id,
            flight_id: flight.id,
        }
    }

    async fn teardown(self) {}
}

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 12, 2).unwrap()
}

fn tuesday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 12, 3).unwrap()
}

fn request(ctx: &BookingContext, passengers: Vec<String>, date: NaiveDate) -> BookingCreateRequest {
    BookingCreateRequest {
        flight: ctx.flight_id.clone(),
        user_id: Some(ctx.user_id.clone()),
        passenger: passengers,
        specific_date: date,
    }
}

#[test_context(BookingContext)]
#[tokio::test]
async fn test_create_booking_prices_and_links_to_user(ctx: &BookingContext) -> Result<(), AppError> {
    let pool = &ctx.test_db.pool;
    let student = test_utils::create_passenger(pool, "Asha", "Economy", "No", "Student").await?;
    let adult = test_utils::create_passenger(pool, "Ravi", "Economy", "Yes", "Normal").await?;

    let booking = ctx
        .booking_service
        .create_booking(request(ctx, vec![student.id.clone(), adult.id.clone()], monday()))
        .await?;

    // 1000 * 1.15 - 100 for the student, (1000 + 250) * 1.15 for the adult
    assert_eq!(booking.total_price, Decimal::new(24875, 1));
    assert_eq!(booking.status, BookingStatus::Pending);
    assert_eq!(booking.passenger_ids, vec![student.id, adult.id]);
    assert_eq!(booking.specific_date, monday());

    let user = ctx.user_service.get_user(&ctx.user_id).await?;
    assert_eq!(user.bookings, vec![booking.id.clone()]);

    let stored = ctx.booking_service.get_booking(&booking.id).await?;
    assert_eq!(stored.booking.total_price, booking.total_price);
    assert_eq!(stored.passengers.len(), 2);
    Ok(())
}

#[test_context(BookingContext)]
#[tokio::test]
async fn test_create_booking_requires_user(ctx: &BookingContext) -> Result<(), AppError> {
    let passenger =
        test_utils::create_passenger(&ctx.test_db.pool, "Asha", "Economy", "No", "Normal").await?;

    for user_id in [None, Some("   ".to_string())] {
        let mut req = request(ctx, vec![passenger.id.clone()], monday());
        req.user_id = user_id;
        let result = ctx.booking_service.create_booking(req).await;
        assert!(matches!(result, Err(AppError::MissingUser)));
    }
    assert_eq!(ctx.test_db.count("bookings").await?, 0);
    Ok(())
}

#[test_context(BookingContext)]
#[tokio::test]
async fn test_unknown_flight_persists_nothing(ctx: &BookingContext) -> Result<(), AppError> {
    let passenger =
        test_utils::create_passenger(&ctx.test_db.pool, "Asha", "Economy", "No", "Normal").await?;
    let mut req = request(ctx, vec![passenger.id], monday());
    req.flight = "no-such-flight".to_string();

    let result = ctx.booking_service.create_booking(req).await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert_eq!(ctx.test_db.count("bookings").await?, 0);
    let user = ctx.user_service.get_user(&ctx.user_id).await?;
    assert!(user.bookings.is_empty());
    Ok(())
}

#[test_context(BookingContext)]
#[tokio::test]
async fn test_flight_not_operating_on_date(ctx: &BookingContext) -> Result<(), AppError> {
    let passenger =
        test_utils::create_passenger(&ctx.test_db.pool, "Asha", "Economy", "No", "Normal").await?;

    let result = ctx
        .booking_service
        .create_booking(request(ctx, vec![passenger.id], tuesday()))
        .await;

    match result {
        Err(AppError::Unavailable(message)) => {
            assert_eq!(message, "Flight cannot be booked on this date.")
        }
        other => panic!("expected Unavailable, got {:?}", other),
    }
    assert_eq!(ctx.test_db.count("bookings").await?, 0);
    Ok(())
}

#[test_context(BookingContext)]
#[tokio::test]
async fn test_missing_passengers_are_listed(ctx: &BookingContext) -> Result<(), AppError> {
    let passenger =
        test_utils::create_passenger(&ctx.test_db.pool, "Asha", "Economy", "No", "Normal").await?;

    let result = ctx
        .booking_service
        .create_booking(request(
            ctx,
            vec![
                "ghost-a".to_string(),
                passenger.id,
                "ghost-b".to_string(),
                "ghost-a".to_string(),
            ],
            monday(),
        ))
        .await;

    // each unknown id is reported once, in request order
    match result {
        Err(AppError::NotFound(message)) => {
            assert_eq!(message, "Passenger IDs not found: ghost-a, ghost-b")
        }
        other => panic!("expected NotFound, got {:?}", other),
    }
    assert_eq!(ctx.test_db.count("bookings").await?, 0);
    Ok(())
}

#[test_context(BookingContext)]
#[tokio::test]
async fn test_booking_for_unknown_user_rolls_back(ctx: &BookingContext) -> Result<(), AppError> {
    let passenger =
        test_utils::create_passenger(&ctx.test_db.pool, "Asha", "Economy", "No", "Normal").await?;
    let mut req = request(ctx, vec![passenger.id], monday());
    req.user_id = Some("no-such-user".to_string());

    let result = ctx.booking_service.create_booking(req).await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert_eq!(ctx.test_db.count("bookings").await?, 0);
    Ok(())
}

#[test_context(BookingContext)]
#[tokio::test]
async fn test_delete_booking_unlinks_user(ctx: &BookingContext) -> Result<(), AppError> {
    let pool = &ctx.test_db.pool;
    let first = test_utils::create_passenger(pool, "Asha", "Economy", "No", "Normal").await?;
    let second = test_utils::create_passenger(pool, "Ravi", "Business", "No", "Normal").await?;

    let kept = ctx
        .booking_service
        .create_booking(request(ctx, vec![first.id], monday()))
        .await?;
    let removed = ctx
        .booking_service
        .create_booking(request(ctx, vec![second.id], monday()))
        .await?;

    ctx.booking_service.delete_booking(&removed.id).await?;

    let user = ctx.user_service.get_user(&ctx.user_id).await?;
    assert_eq!(user.bookings, vec![kept.id.clone()]);
    assert!(matches!(
        ctx.booking_service.get_booking(&removed.id).await,
        Err(AppError::NotFound(_))
    ));
    assert_eq!(ctx.test_db.count("bookings").await?, 1);
    Ok(())
}

#[test_context(BookingContext)]
#[tokio::test]
async fn test_delete_unknown_booking(ctx: &BookingContext) {
    let result = ctx.booking_service.delete_booking("no-such-booking").await;
    match result {
        Err(AppError::NotFound(message)) => assert_eq!(message, "Booking not found."),
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[test_context(BookingContext)]
#[tokio::test]
async fn test_list_bookings_empty_is_not_found(ctx: &BookingContext) {
    let result = ctx.booking_service.list_bookings().await;
    match result {
        Err(AppError::NotFound(message)) => assert_eq!(message, "No Bookings found."),
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[test_context(BookingContext)]
#[tokio::test]
async fn test_booking_detail_skips_replaced_passengers(ctx: &BookingContext) -> Result<(), AppError> {
    let pool = &ctx.test_db.pool;
    let passenger = test_utils::create_passenger(pool, "Asha", "Economy", "No", "Normal").await?;
    let booking = ctx
        .booking_service
        .create_booking(request(ctx, vec![passenger.id.clone()], monday()))
        .await?;

    // same name, age and gender replaces the earlier record
    let replacement = test_utils::create_passenger(pool, "Asha", "First", "Yes", "Normal").await?;
    assert_ne!(replacement.id, passenger.id);

    let detail = ctx.booking_service.get_booking(&booking.id).await?;
    assert_eq!(detail.booking.passenger_ids, vec![passenger.id]);
    assert!(detail.passengers.is_empty());
    Ok(())
}

#[test_context(BookingContext)]
#[tokio::test]
async fn test_create_gives_up_when_user_keeps_changing(ctx: &BookingContext) -> Result<(), AppError> {
    let pool = &ctx.test_db.pool;
    let passenger = test_utils::create_passenger(pool, "Asha", "Economy", "No", "Normal").await?;
    let before = ctx.user_service.get_user(&ctx.user_id).await?;

    // every inserted booking bumps the owner's version, so the list write is always stale
    sqlx::query(
        "CREATE TRIGGER bump_user_version AFTER INSERT ON bookings
         BEGIN UPDATE users SET version = version + 1 WHERE id = NEW.user_id; END",
    )
    .execute(pool)
    .await?;

    let result = ctx
        .booking_service
        .create_booking(request(ctx, vec![passenger.id], monday()))
        .await;

    match result {
        Err(AppError::Conflict(message)) => {
            assert_eq!(message, "Creating booking failed after 3 attempts.")
        }
        other => panic!("expected Conflict, got {:?}", other),
    }
    assert_eq!(ctx.test_db.count("bookings").await?, 0);
    let after = ctx.user_service.get_user(&ctx.user_id).await?;
    assert!(after.bookings.is_empty());
    assert_eq!(after.version, before.version);
    Ok(())
}

#[test_context(BookingContext)]
#[tokio::test]
async fn test_delete_gives_up_when_row_never_goes(ctx: &BookingContext) -> Result<(), AppError> {
    let pool = &ctx.test_db.pool;
    let passenger = test_utils::create_passenger(pool, "Asha", "Economy", "No", "Normal").await?;
    let booking = ctx
        .booking_service
        .create_booking(request(ctx, vec![passenger.id], monday()))
        .await?;

    // the DELETE silently skips the row, as if another writer got there first
    sqlx::query("CREATE TRIGGER keep_bookings BEFORE DELETE ON bookings BEGIN SELECT RAISE(IGNORE); END")
        .execute(pool)
        .await?;

    match ctx.booking_service.delete_booking(&booking.id).await {
        Err(AppError::Conflict(message)) => {
            assert_eq!(message, "Deleting booking failed after 3 attempts.")
        }
        other => panic!("expected Conflict, got {:?}", other),
    }
    // the unlink was rolled back with the failed delete
    let user = ctx.user_service.get_user(&ctx.user_id).await?;
    assert_eq!(user.bookings, vec![booking.id.clone()]);
    assert_eq!(ctx.test_db.count("bookings").await?, 1);

    sqlx::query("DROP TRIGGER keep_bookings").execute(pool).await?;
    ctx.booking_service.delete_booking(&booking.id).await?;
    assert!(ctx.user_service.get_user(&ctx.user_id).await?.bookings.is_empty());
    Ok(())
}

struct SharedUserContext {
    test_db: FileTestDb,
    booking_service: BookingService,
    user_service: UserService,
    user_id: String,
    flight_id: String,
    passenger_id: String,
}

#[async_trait]
impl AsyncTestContext for SharedUserContext {
    async fn setup() -> Self {
        let test_db = FileTestDb::new(4).await.expect("Failed to create test database");
        let pool = test_db.pool.clone();

        let user = test_utils::register_user(&pool, "family@example.com")
            .await
            .expect("Failed to register user");
        let provider = test_utils::register_provider(&pool, "ops@skyair.example.com")
            .await
            .expect("Failed to register provider");
        let flight = test_utils::create_flight(&pool, "SA-303", &provider.id, "Daily")
            .await
            .expect("Failed to create flight");
        let passenger = test_utils::create_passenger(&pool, "Asha", "Economy", "No", "Normal")
            .await
            .expect("Failed to create passenger");

        SharedUserContext {
            booking_service: BookingService::new(pool.clone()),
            user_service: UserService::new(pool),
            test_db,
            user_id: user.id,
            flight_id: flight.id,
            passenger_id: passenger.id,
        }
    }

    async fn teardown(self) {
        self.test_db.remove().await;
    }
}

#[test_context(SharedUserContext)]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_bookings_keep_user_list_complete(
    ctx: &SharedUserContext,
) -> Result<(), AppError> {
    let mut join_set = JoinSet::new();
    for _ in 0..4 {
        let booking_service = ctx.booking_service.clone();
        let booking_request = BookingCreateRequest {
            flight: ctx.flight_id.clone(),
            user_id: Some(ctx.user_id.clone()),
            passenger: vec![ctx.passenger_id.clone()],
            specific_date: monday(),
        };
        join_set.spawn(async move { booking_service.create_booking(booking_request).await });
    }

    let mut created = Vec::new();
    while let Some(result) = join_set.join_next().await {
        match result.expect("booking task panicked") {
            Ok(booking) => created.push(booking.id),
            // losing every retry is allowed, any other failure is not
            Err(AppError::Conflict(message)) => {
                assert_eq!(message, "Creating booking failed after 3 attempts.")
            }
            Err(other) => panic!("unexpected booking failure: {:?}", other),
        }
    }
    assert!(!created.is_empty());

    let rows: Vec<(String,)> = sqlx::query_as("SELECT id FROM bookings WHERE user_id = ?")
        .bind(&ctx.user_id)
        .fetch_all(&ctx.test_db.pool)
        .await?;
    let mut stored: Vec<String> = rows.into_iter().map(|(id,)| id).collect();
    let mut linked = ctx.user_service.get_user(&ctx.user_id).await?.bookings;

    // no booking row without a link, and no link lost to an overwrite
    created.sort();
    stored.sort();
    linked.sort();
    assert_eq!(stored, created);
    assert_eq!(linked, created);
    Ok(())
}
