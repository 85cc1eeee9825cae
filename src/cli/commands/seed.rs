//! `devcamper seed --dir <path>`: bulk import of JSON fixture files.
//!
//! Each of `users.json`, `bootcamps.json`, `courses.json` and `reviews.json`
//! is an optional array. Records may carry their own `id` so that references
//! between files resolve; user passwords are plaintext and hashed on import.
//! Every record goes through the same validation as the HTTP API.

use anyhow::{bail, Context};
use clap::Args;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

use super::open_store;
use crate::auth::CredentialService;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::models::{
    Bootcamp, BootcampInput, Course, CourseInput, Location, Review, ReviewInput, Role, User, UserInput,
};
use crate::services::aggregates::{recompute_average_cost, recompute_average_rating};
use crate::services::{slugify, Geocoder, MapQuestGeocoder};
use crate::store::{DocumentStore, Repository};

/// Fixture files may create any role, admins included.
const SEED_ROLES: [Role; 3] = [Role::User, Role::Publisher, Role::Admin];

/// A record with a stored location does not need an address to geocode.
const ADDRESS_REQUIRED: &str = "Please enter a valid address";

#[derive(Args)]
pub struct SeedArgs {
    #[arg(long, help = "Directory holding the JSON files", default_value = "./_data")]
    pub dir: PathBuf,
}

#[derive(Debug, Deserialize)]
struct SeedUser {
    id: Option<Uuid>,
    #[serde(flatten)]
    input: UserInput,
}

#[derive(Debug, Deserialize)]
struct SeedBootcamp {
    id: Option<Uuid>,
    user: Uuid,
    location: Option<Location>,
    #[serde(flatten)]
    input: BootcampInput,
}

#[derive(Debug, Deserialize)]
struct SeedCourse {
    id: Option<Uuid>,
    bootcamp: Uuid,
    user: Uuid,
    #[serde(flatten)]
    input: CourseInput,
}

#[derive(Debug, Deserialize)]
struct SeedReview {
    id: Option<Uuid>,
    bootcamp: Uuid,
    user: Uuid,
    #[serde(flatten)]
    input: ReviewInput,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub users: usize,
    pub bootcamps: usize,
    pub courses: usize,
    pub reviews: usize,
}

/// Missing files read as empty collections.
fn read_records<T: DeserializeOwned>(dir: &Path, file: &str) -> anyhow::Result<Vec<T>> {
    let path = dir.join(file);
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no seed file");
        return Ok(Vec::new());
    }
    let text = std::fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}

fn ensure_record_valid(file: &str, index: usize, errors: Vec<String>) -> anyhow::Result<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        bail!("{file}[{index}]: {}", errors.join("; "))
    }
}

pub async fn seed_directory(
    store: Arc<dyn DocumentStore>,
    credentials: &CredentialService,
    geocoder: &dyn Geocoder,
    dir: &Path,
) -> anyhow::Result<SeedReport> {
    let users: Vec<SeedUser> = read_records(dir, "users.json")?;
    let bootcamps: Vec<SeedBootcamp> = read_records(dir, "bootcamps.json")?;
    let courses: Vec<SeedCourse> = read_records(dir, "courses.json")?;
    let reviews: Vec<SeedReview> = read_records(dir, "reviews.json")?;
    let mut report = SeedReport::default();

    let user_repo = Repository::<User>::new(store.clone());
    for (index, seed) in users.into_iter().enumerate() {
        ensure_record_valid("users.json", index, seed.input.validate_new(&SEED_ROLES))?;

        let input = &seed.input;
        let digest = credentials
            .hash_password(input.password.as_deref().unwrap_or_default())
            .await?;
        let mut user = User::new(
            input.name.as_deref().unwrap_or_default().trim().to_string(),
            input.email.as_deref().unwrap_or_default().trim().to_string(),
            input.role_or_default(),
            digest,
        );
        if let Some(id) = seed.id {
            user.id = id;
        }
        user_repo.insert(&user).await.with_context(|| format!("failed to import user {}", user.email))?;
        report.users += 1;
    }

    let bootcamp_repo = Repository::<Bootcamp>::new(store.clone());
    for (index, seed) in bootcamps.into_iter().enumerate() {
        let mut errors = seed.input.validate_new();
        if seed.location.is_some() {
            errors.retain(|e| e != ADDRESS_REQUIRED);
        }
        ensure_record_valid("bootcamps.json", index, errors)?;

        let mut bootcamp = Bootcamp::from_input(&seed.input, seed.user);
        if let Some(id) = seed.id {
            bootcamp.id = id;
        }
        bootcamp.slug = slugify(&bootcamp.name);
        bootcamp.location = match (seed.location, seed.input.address.as_deref()) {
            (Some(location), _) => Some(location),
            (None, Some(address)) => match geocoder.geocode(address).await {
                Ok(location) => Some(location),
                Err(e) => {
                    tracing::warn!(bootcamp = %bootcamp.name, error = %e, "geocoding failed, importing without location");
                    None
                }
            },
            (None, None) => None,
        };
        bootcamp_repo
            .insert(&bootcamp)
            .await
            .with_context(|| format!("failed to import bootcamp {}", bootcamp.name))?;
        report.bootcamps += 1;
    }

    let mut touched_costs = BTreeSet::new();
    let course_repo = Repository::<Course>::new(store.clone());
    for (index, seed) in courses.into_iter().enumerate() {
        ensure_record_valid("courses.json", index, seed.input.validate_new())?;
        let mut course = Course::from_input(&seed.input, seed.bootcamp, seed.user);
        if let Some(id) = seed.id {
            course.id = id;
        }
        course_repo.insert(&course).await.with_context(|| format!("failed to import course {}", course.title))?;
        touched_costs.insert(course.bootcamp);
        report.courses += 1;
    }

    let mut touched_ratings = BTreeSet::new();
    let review_repo = Repository::<Review>::new(store.clone());
    for (index, seed) in reviews.into_iter().enumerate() {
        ensure_record_valid("reviews.json", index, seed.input.validate_new())?;
        let mut review = Review::from_input(&seed.input, seed.bootcamp, seed.user);
        if let Some(id) = seed.id {
            review.id = id;
        }
        review_repo.insert(&review).await.with_context(|| format!("failed to import review {}", review.title))?;
        touched_ratings.insert(review.bootcamp);
        report.reviews += 1;
    }

    for bootcamp_id in touched_costs {
        recompute_average_cost(store.clone(), bootcamp_id).await?;
    }
    for bootcamp_id in touched_ratings {
        recompute_average_rating(store.clone(), bootcamp_id).await?;
    }

    Ok(report)
}

pub async fn handle(args: SeedArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let (config, store) = open_store().await?;
    let credentials = CredentialService::new(&config.security)?;
    let geocoder = MapQuestGeocoder::new(&config.geocoder);

    let report = seed_directory(store, &credentials, &geocoder, &args.dir).await?;
    tracing::info!(?report, dir = %args.dir.display(), "seeded collections");

    output_success(
        output_format,
        "Data imported",
        Some(json!({
            "users": report.users,
            "bootcamps": report.bootcamps,
            "courses": report.courses,
            "reviews": report.reviews,
        })),
    )
}
