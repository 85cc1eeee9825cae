use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{present, EMAIL_PATTERN, URL_PATTERN};
use crate::store::Model;

pub const DEFAULT_PHOTO: &str = "no-photo.jpg";
const MAX_NAME_LEN: usize = 50;
const MAX_DESCRIPTION_LEN: usize = 500;
const MAX_PHONE_LEN: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Career {
    #[serde(rename = "Web Development")]
    WebDevelopment,
    #[serde(rename = "Mobile Development")]
    MobileDevelopment,
    #[serde(rename = "UI/UX")]
    UiUx,
    #[serde(rename = "Data Science")]
    DataScience,
    #[serde(rename = "Business")]
    Business,
    #[serde(rename = "Other")]
    Other,
}

impl Career {
    pub const ALL: [Career; 6] = [
        Career::WebDevelopment,
        Career::MobileDevelopment,
        Career::UiUx,
        Career::DataScience,
        Career::Business,
        Career::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Career::WebDevelopment => "Web Development",
            Career::MobileDevelopment => "Mobile Development",
            Career::UiUx => "UI/UX",
            Career::DataScience => "Data Science",
            Career::Business => "Business",
            Career::Other => "Other",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == raw)
    }
}

/// GeoJSON point plus the address parts the geocoder returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(rename = "type")]
    pub kind: String,
    /// `[longitude, latitude]`
    pub coordinates: [f64; 2],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zipcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl Location {
    pub fn point(longitude: f64, latitude: f64) -> Self {
        Self {
            kind: "Point".to_string(),
            coordinates: [longitude, latitude],
            formatted_address: None,
            street: None,
            city: None,
            state: None,
            zipcode: None,
            country: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bootcamp {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    pub careers: Vec<Career>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_cost: Option<f64>,
    pub photo: String,
    pub housing: bool,
    pub job_assistance: bool,
    pub job_guarantee: bool,
    pub accept_gi: bool,
    #[serde(with = "super::timestamp")]
    pub created_at: DateTime<Utc>,
    /// Owning identity.
    pub user: Uuid,
}

impl Model for Bootcamp {
    const COLLECTION: &'static str = "bootcamps";
    const LABEL: &'static str = "Bootcamp";

    fn id(&self) -> Uuid {
        self.id
    }
}

/// Create/update body. The address is only used for geocoding and is never stored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BootcampInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub careers: Option<Vec<String>>,
    pub housing: Option<bool>,
    pub job_assistance: Option<bool>,
    pub job_guarantee: Option<bool>,
    pub accept_gi: Option<bool>,
}

impl BootcampInput {
    pub fn validate_new(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if present(&self.name).is_none() {
            errors.push("Please enter a name".to_string());
        }
        if present(&self.description).is_none() {
            errors.push("Please add a description".to_string());
        }
        if present(&self.address).is_none() {
            errors.push("Please enter a valid address".to_string());
        }
        if self.careers.as_ref().map_or(true, Vec::is_empty) {
            errors.push("Please add at least one career".to_string());
        }
        errors.extend(self.validate_present());
        errors
    }

    pub fn validate_patch(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.name.is_some() && present(&self.name).is_none() {
            errors.push("Please enter a name".to_string());
        }
        if self.description.is_some() && present(&self.description).is_none() {
            errors.push("Please add a description".to_string());
        }
        if self.address.is_some() && present(&self.address).is_none() {
            errors.push("Please enter a valid address".to_string());
        }
        if self.careers.as_ref().is_some_and(Vec::is_empty) {
            errors.push("Please add at least one career".to_string());
        }
        errors.extend(self.validate_present());
        errors
    }

    fn validate_present(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if present(&self.name).is_some_and(|n| n.chars().count() > MAX_NAME_LEN) {
            errors.push(format!("Name cannot exceed {MAX_NAME_LEN} characters"));
        }
        if present(&self.description).is_some_and(|d| d.chars().count() > MAX_DESCRIPTION_LEN) {
            errors.push(format!("Description cannot exceed {MAX_DESCRIPTION_LEN} characters"));
        }
        if present(&self.website).is_some_and(|w| !URL_PATTERN.is_match(w)) {
            errors.push("Please use a valid URL e.g. https://www.example.com".to_string());
        }
        if present(&self.phone).is_some_and(|p| p.chars().count() > MAX_PHONE_LEN) {
            errors.push(format!("Phone number cannot exceed {MAX_PHONE_LEN} characters"));
        }
        if present(&self.email).is_some_and(|e| !EMAIL_PATTERN.is_match(e)) {
            errors.push("Please enter a valid email".to_string());
        }
        for career in self.careers.iter().flatten() {
            if Career::parse(career).is_none() {
                errors.push(format!("`{career}` is not a valid career"));
            }
        }
        errors
    }

    /// Parsed careers. Call after validation.
    pub fn parsed_careers(&self) -> Option<Vec<Career>> {
        self.careers
            .as_ref()
            .map(|list| list.iter().filter_map(|c| Career::parse(c)).collect())
    }
}

impl Bootcamp {
    /// Builds a new bootcamp from a validated input. Slug and location are
    /// filled by the caller.
    pub fn from_input(input: &BootcampInput, owner: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: present(&input.name).unwrap_or_default().to_string(),
            slug: String::new(),
            description: input.description.clone().unwrap_or_default(),
            website: present(&input.website).map(str::to_string),
            phone: present(&input.phone).map(str::to_string),
            email: present(&input.email).map(str::to_string),
            location: None,
            careers: input.parsed_careers().unwrap_or_default(),
            average_rating: None,
            average_cost: None,
            photo: DEFAULT_PHOTO.to_string(),
            housing: input.housing.unwrap_or(false),
            job_assistance: input.job_assistance.unwrap_or(false),
            job_guarantee: input.job_guarantee.unwrap_or(false),
            accept_gi: input.accept_gi.unwrap_or(false),
            created_at: Utc::now(),
            user: owner,
        }
    }

    /// Copies the fields present in a validated patch. Returns whether the
    /// name changed so the caller can re-derive the slug.
    pub fn apply(&mut self, patch: &BootcampInput) -> bool {
        let mut renamed = false;
        if let Some(name) = present(&patch.name) {
            renamed = name != self.name;
            self.name = name.to_string();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if patch.website.is_some() {
            self.website = present(&patch.website).map(str::to_string);
        }
        if patch.phone.is_some() {
            self.phone = present(&patch.phone).map(str::to_string);
        }
        if patch.email.is_some() {
            self.email = present(&patch.email).map(str::to_string);
        }
        if let Some(careers) = patch.parsed_careers() {
            self.careers = careers;
        }
        if let Some(v) = patch.housing {
            self.housing = v;
        }
        if let Some(v) = patch.job_assistance {
            self.job_assistance = v;
        }
        if let Some(v) = patch.job_guarantee {
            self.job_guarantee = v;
        }
        if let Some(v) = patch.accept_gi {
            self.accept_gi = v;
        }
        renamed
    }
}
