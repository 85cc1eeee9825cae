use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::present;
use crate::store::Model;

const MAX_TITLE_LEN: usize = 100;
const RATING_RANGE: std::ops::RangeInclusive<i64> = 1..=10;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub title: String,
    pub text: String,
    pub rating: i64,
    #[serde(with = "super::timestamp")]
    pub created_at: DateTime<Utc>,
    pub bootcamp: Uuid,
    pub user: Uuid,
}

impl Model for Review {
    const COLLECTION: &'static str = "reviews";
    const LABEL: &'static str = "Review";

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewInput {
    pub title: Option<String>,
    pub text: Option<String>,
    pub rating: Option<i64>,
}

impl ReviewInput {
    pub fn validate_new(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if present(&self.title).is_none() {
            errors.push("Review title is required".to_string());
        }
        if present(&self.text).is_none() {
            errors.push("Text is required".to_string());
        }
        if self.rating.is_none() {
            errors.push("Please choose a rating between 1 and 10".to_string());
        }
        errors.extend(self.validate_present());
        errors
    }

    pub fn validate_patch(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.title.is_some() && present(&self.title).is_none() {
            errors.push("Review title is required".to_string());
        }
        if self.text.is_some() && present(&self.text).is_none() {
            errors.push("Text is required".to_string());
        }
        errors.extend(self.validate_present());
        errors
    }

    fn validate_present(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if present(&self.title).is_some_and(|t| t.chars().count() > MAX_TITLE_LEN) {
            errors.push(format!("Title cannot exceed {MAX_TITLE_LEN} characters"));
        }
        if self.rating.is_some_and(|r| !RATING_RANGE.contains(&r)) {
            errors.push("Please choose a rating between 1 and 10".to_string());
        }
        errors
    }
}

impl Review {
    pub fn from_input(input: &ReviewInput, bootcamp: Uuid, author: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: present(&input.title).unwrap_or_default().to_string(),
            text: input.text.clone().unwrap_or_default(),
            rating: input.rating.unwrap_or(*RATING_RANGE.start()),
            created_at: Utc::now(),
            bootcamp,
            user: author,
        }
    }

    pub fn apply(&mut self, patch: &ReviewInput) {
        if let Some(title) = present(&patch.title) {
            self.title = title.to_string();
        }
        if let Some(text) = &patch.text {
            self.text = text.clone();
        }
        if let Some(rating) = patch.rating {
            self.rating = rating;
        }
    }
}
