use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::present;
use crate::store::Model;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MinimumSkill {
    Beginner,
    Intermediate,
    Advanced,
}

impl MinimumSkill {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "beginner" => Some(MinimumSkill::Beginner),
            "intermediate" => Some(MinimumSkill::Intermediate),
            "advanced" => Some(MinimumSkill::Advanced),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub weeks: String,
    pub tuition: f64,
    pub minimum_skill: MinimumSkill,
    pub scholarships_available: bool,
    #[serde(with = "super::timestamp")]
    pub created_at: DateTime<Utc>,
    pub bootcamp: Uuid,
    pub user: Uuid,
}

impl Model for Course {
    const COLLECTION: &'static str = "courses";
    const LABEL: &'static str = "Course";

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseInput {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Accepts `"8"` or `8`.
    pub weeks: Option<Value>,
    pub tuition: Option<f64>,
    pub minimum_skill: Option<String>,
    pub scholarships_available: Option<bool>,
}

impl CourseInput {
    fn weeks_text(&self) -> Option<String> {
        match self.weeks.as_ref()? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn validate_new(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if present(&self.title).is_none() {
            errors.push("Course title is required".to_string());
        }
        if present(&self.description).is_none() {
            errors.push("Course description is required".to_string());
        }
        if self.weeks_text().is_none() {
            errors.push("Course duration must be specified".to_string());
        }
        if self.tuition.is_none() {
            errors.push("Tuition cost is required".to_string());
        }
        if self.minimum_skill.is_none() {
            errors.push("Please specify the level of skill".to_string());
        }
        errors.extend(self.validate_present());
        errors
    }

    pub fn validate_patch(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.title.is_some() && present(&self.title).is_none() {
            errors.push("Course title is required".to_string());
        }
        if self.description.is_some() && present(&self.description).is_none() {
            errors.push("Course description is required".to_string());
        }
        if self.weeks.is_some() && self.weeks_text().is_none() {
            errors.push("Course duration must be specified".to_string());
        }
        errors.extend(self.validate_present());
        errors
    }

    fn validate_present(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.tuition.is_some_and(|t| t < 0.0) {
            errors.push("Tuition cannot be negative".to_string());
        }
        if let Some(skill) = self.minimum_skill.as_deref() {
            if MinimumSkill::parse(skill).is_none() {
                errors.push("Minimum skill must be beginner, intermediate or advanced".to_string());
            }
        }
        errors
    }
}

impl Course {
    pub fn from_input(input: &CourseInput, bootcamp: Uuid, owner: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: present(&input.title).unwrap_or_default().to_string(),
            description: input.description.clone().unwrap_or_default(),
            weeks: input.weeks_text().unwrap_or_default(),
            tuition: input.tuition.unwrap_or_default(),
            minimum_skill: input
                .minimum_skill
                .as_deref()
                .and_then(MinimumSkill::parse)
                .unwrap_or(MinimumSkill::Beginner),
            scholarships_available: input.scholarships_available.unwrap_or(true),
            created_at: Utc::now(),
            bootcamp,
            user: owner,
        }
    }

    pub fn apply(&mut self, patch: &CourseInput) {
        if let Some(title) = present(&patch.title) {
            self.title = title.to_string();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(weeks) = patch.weeks_text() {
            self.weeks = weeks;
        }
        if let Some(tuition) = patch.tuition {
            self.tuition = tuition;
        }
        if let Some(skill) = patch.minimum_skill.as_deref().and_then(MinimumSkill::parse) {
            self.minimum_skill = skill;
        }
        if let Some(v) = patch.scholarships_available {
            self.scholarships_available = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_weeks_are_accepted() {
        let input: CourseInput = serde_json::from_value(json!({
            "title": "Front End Web Development",
            "description": "HTML, CSS and JavaScript",
            "weeks": 8,
            "tuition": 8000,
            "minimumSkill": "beginner"
        }))
        .unwrap();
        assert!(input.validate_new().is_empty());

        let course = Course::from_input(&input, Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(course.weeks, "8");
        assert!(course.scholarships_available);
    }

    #[test]
    fn missing_fields() {
        let errors = CourseInput::default().validate_new();
        assert_eq!(errors.len(), 5);
        assert_eq!(errors[0], "Course title is required");
    }

    #[test]
    fn unknown_skill_is_rejected() {
        let input = CourseInput { minimum_skill: Some("expert".into()), ..Default::default() };
        assert_eq!(input.validate_patch().len(), 1);
    }
}
