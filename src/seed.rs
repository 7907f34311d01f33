//! Loads the JSON user and property fixtures into the store.
//!
//! Property fixtures name their owner by 1-based position in the user
//! fixture file; those positions are remapped to the ids the store assigns.

use anyhow::{Context, Result};
use core_types::{NewProperty, NewUser};
use database::{DbError, ListingStore, QueryGateway};
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub users_created: usize,
    pub users_existing: usize,
    pub properties_created: usize,
}

async fn read_fixture<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read fixture {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse fixture {}", path.display()))
}

pub async fn seed<S: ListingStore>(
    gateway: &QueryGateway<S>,
    users_path: &Path,
    properties_path: &Path,
) -> Result<SeedReport> {
    let users: Vec<NewUser> = read_fixture(users_path).await?;
    let properties: Vec<NewProperty> = read_fixture(properties_path).await?;

    let progress_bar = ProgressBar::new((users.len() + properties.len()) as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let mut report = SeedReport::default();

    // Users go first so property owners can be resolved.
    progress_bar.set_message("users");
    let results = join_all(users.iter().map(|user| gateway.add_user(user))).await;
    let mut owner_ids = HashMap::new();
    for (position, (user, result)) in users.iter().zip(results).enumerate() {
        let id = match result {
            Ok(created) => {
                report.users_created += 1;
                created.id
            }
            // Already seeded: reuse the stored row.
            Err(DbError::ConstraintViolation { .. }) => {
                report.users_existing += 1;
                gateway.get_user_with_email(&user.email).await?.id
            }
            Err(e) => return Err(e).context(format!("failed to add user {}", user.email)),
        };
        owner_ids.insert(position as i32 + 1, id);
        progress_bar.inc(1);
    }

    progress_bar.set_message("properties");
    let remapped = properties
        .into_iter()
        .map(|mut property| {
            let owner_id = *owner_ids.get(&property.owner_id).with_context(|| {
                format!(
                    "property '{}' names owner {} which is not in the user fixtures",
                    property.title, property.owner_id
                )
            })?;
            property.owner_id = owner_id;
            Ok(property)
        })
        .collect::<Result<Vec<_>>>()?;

    let pb = &progress_bar;
    let results = join_all(remapped.iter().map(|property| async move {
        let result = gateway.add_property(property).await;
        pb.inc(1);
        result
    }))
    .await;
    for (property, result) in remapped.iter().zip(results) {
        result.with_context(|| format!("failed to add property '{}'", property.title))?;
        report.properties_created += 1;
    }

    progress_bar.finish_with_message("seeding complete");
    tracing::info!(?report, "Fixtures loaded.");
    Ok(report)
}
