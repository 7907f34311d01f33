//! Live-database tests. They run only when `LIGHTBNB_TEST_DATABASE_URL`
//! points at a disposable Postgres database, and are skipped otherwise.

use chrono::NaiveDate;
use configuration::{DatabaseSettings, GatewaySettings};
use core_types::{NewProperty, NewUser, PropertySearch};
use database::{connect, run_migrations, DbRepository, QueryGateway};
use rust_decimal::Decimal;
use std::time::{SystemTime, UNIX_EPOCH};

async fn gateway() -> Option<QueryGateway<DbRepository>> {
    let Ok(url) = std::env::var("LIGHTBNB_TEST_DATABASE_URL") else {
        eprintln!("LIGHTBNB_TEST_DATABASE_URL not set; skipping live database test");
        return None;
    };
    let settings = DatabaseSettings {
        url,
        ..DatabaseSettings::default()
    };
    let pool = connect(&settings).await.expect("connect to test database");
    run_migrations(&pool).await.expect("apply migrations");
    Some(QueryGateway::new(
        DbRepository::new(pool),
        GatewaySettings::default(),
    ))
}

/// A suffix that keeps rows from separate runs apart.
fn unique() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{nanos}")
}

fn property(owner_id: i32, city: &str, cost_per_night: i32) -> NewProperty {
    NewProperty {
        owner_id,
        title: format!("Test stay {city}"),
        description: "integration".to_string(),
        thumbnail_photo_url: String::new(),
        cover_photo_url: String::new(),
        cost_per_night,
        parking_spaces: 0,
        number_of_bathrooms: 1,
        number_of_bedrooms: 1,
        country: "Canada".to_string(),
        street: "1 Test Way".to_string(),
        city: city.to_string(),
        province: "BC".to_string(),
        post_code: "V0V".to_string(),
        active: true,
    }
}

#[tokio::test]
async fn user_round_trip_and_duplicate_email() {
    let Some(gateway) = gateway().await else { return };
    let email = format!("ana-{}@x.com", unique());
    let user = NewUser {
        name: "Ana".to_string(),
        email: email.clone(),
        password: "pw".to_string(),
    };

    let created = gateway.add_user(&user).await.unwrap();
    let found = gateway.get_user_with_email(&email).await.unwrap();
    assert_eq!(found, created);
    assert_eq!(gateway.get_user_with_id(created.id).await.unwrap(), created);

    assert!(gateway.get_user_with_id(i32::MAX).await.unwrap_err().is_not_found());
    assert!(gateway.add_user(&user).await.unwrap_err().is_constraint_violation());
}

#[tokio::test]
async fn search_filters_by_city_and_price() {
    let Some(gateway) = gateway().await else { return };
    let tag = unique();
    let owner = gateway
        .add_user(&NewUser {
            name: "Owner".to_string(),
            email: format!("owner-{tag}@x.com"),
            password: "pw".to_string(),
        })
        .await
        .unwrap();
    let city = format!("Testville{tag}");
    for cost in [4_000, 6_000, 14_000, 20_000] {
        gateway.add_property(&property(owner.id, &city, cost)).await.unwrap();
    }

    let by_city = gateway
        .get_all_properties(
            &PropertySearch {
                city: Some(city.to_uppercase()),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();
    assert_eq!(by_city.len(), 4);

    let by_price = gateway
        .get_all_properties(
            &PropertySearch {
                city: Some(city.clone()),
                minimum_price_per_night: Some(50),
                maximum_price_per_night: Some(150),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();
    let costs: Vec<i32> = by_price.iter().map(|l| l.property.cost_per_night).collect();
    assert_eq!(costs, vec![6_000, 14_000]);
}

#[tokio::test]
async fn reservations_are_ordered_by_start_date() {
    let Some(gateway) = gateway().await else { return };
    let tag = unique();
    let guest = gateway
        .add_user(&NewUser {
            name: "Guest".to_string(),
            email: format!("guest-{tag}@x.com"),
            password: "pw".to_string(),
        })
        .await
        .unwrap();
    let stay = gateway
        .add_property(&property(guest.id, &format!("Resville{tag}"), 9_900))
        .await
        .unwrap();

    for (start, end) in [((2024, 5, 1), (2024, 5, 3)), ((2023, 1, 1), (2023, 1, 4))] {
        sqlx::query(
            "INSERT INTO reservations (guest_id, property_id, start_date, end_date) VALUES ($1, $2, $3, $4)",
        )
        .bind(guest.id)
        .bind(stay.id)
        .bind(NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap())
        .bind(NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap())
        .execute(gateway.store().pool())
        .await
        .unwrap();
    }

    let reservations = gateway.get_all_reservations(guest.id, Some(10)).await.unwrap();
    assert_eq!(reservations.len(), 2);
    assert!(reservations[0].reservation.start_date < reservations[1].reservation.start_date);
    assert_eq!(reservations[0].cost_per_night, 9_900);
    assert!(reservations[0].average_rating.is_none());

    for rating in [5_i16, 2] {
        sqlx::query(
            "INSERT INTO property_reviews (guest_id, property_id, reservation_id, rating, message) VALUES ($1, $2, $3, $4, '')",
        )
        .bind(guest.id)
        .bind(stay.id)
        .bind(reservations[0].reservation.id)
        .bind(rating)
        .execute(gateway.store().pool())
        .await
        .unwrap();
    }

    let reviewed = gateway.get_all_reservations(guest.id, Some(10)).await.unwrap();
    assert_eq!(reviewed.len(), 2);
    assert!(reviewed
        .iter()
        .all(|r| r.average_rating == Some(Decimal::new(35, 1))));
}
