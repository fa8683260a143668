//! Candidate profile domain types.
//!
//! A `Profile` is a root record owning four sub-record collections
//! (projects, educations, experiences, skills). The root exclusively owns
//! its collections — sub-records are always loaded with, and never outlive,
//! the root fetch.
//!
//! Two serialization views exist:
//! - the *full* view: `Profile` itself, serialized with serde. This is what
//!   the caller receives in `users` / `users_found` events.
//! - the *compact* view: [`Profile::for_llm`], denormalized human-readable
//!   strings per sub-record. Used only inside reasoning-history text.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A candidate's full profile with eagerly loaded sub-records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pfp_url: Option<String>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub educations: Vec<Education>,
    #[serde(default)]
    pub experiences: Vec<Experience>,
    #[serde(default)]
    pub skills: Vec<Skill>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub project_id: String,
    pub user_id: String,
    pub project_name: String,
    #[serde(default)]
    pub project_description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Education {
    pub education_id: String,
    pub user_id: String,
    pub institution_name: String,
    pub degree_type: String,
    pub degree_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrollment_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graduation_date: Option<NaiveDate>,
}

impl Education {
    fn format_period(&self) -> String {
        match (self.enrollment_date, self.graduation_date) {
            (Some(start), Some(end)) => format!("From {start} to {end}"),
            _ => String::new(),
        }
    }

    /// One-line description for the compact view.
    pub fn description(&self) -> String {
        let base = format!(
            "{} in {} at {}",
            self.degree_type, self.degree_name, self.institution_name
        );
        let period = self.format_period();
        if period.is_empty() {
            base
        } else {
            format!("{base}. {period}")
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Experience {
    pub experience_id: String,
    pub user_id: String,
    pub company_name: String,
    pub job_title: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub experience_description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

impl Experience {
    fn format_period(&self) -> String {
        let Some(start) = self.start_date else {
            return String::new();
        };
        let end = self
            .end_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "Present".to_string());
        format!("From {start} to {end}")
    }

    /// One-line description for the compact view.
    pub fn description(&self) -> String {
        let base = format!("{} at {}", self.job_title, self.company_name);
        let period = self.format_period();
        if period.is_empty() {
            base
        } else {
            format!(
                "{base}. {period}. Description: {}",
                self.experience_description
            )
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Skill {
    pub skill_id: String,
    pub user_id: String,
    pub skill_name: String,
}

/// The LLM-compact view of a profile.
///
/// Denormalized strings keep reasoning-history text small and readable.
/// This view is never returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompactProfile {
    pub user_id: String,
    pub name: String,
    pub contact: String,
    pub projects: Vec<CompactProject>,
    pub experiences: Vec<String>,
    pub educations: Vec<String>,
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompactProject {
    pub project_id: String,
    pub project_name: String,
    pub project_description: String,
}

impl Profile {
    /// Produce the compact view used inside reasoning-history text.
    pub fn for_llm(&self) -> CompactProfile {
        CompactProfile {
            user_id: self.user_id.clone(),
            name: format!("{} {}", self.first_name, self.last_name),
            contact: self.email.clone(),
            projects: self
                .projects
                .iter()
                .map(|p| CompactProject {
                    project_id: p.project_id.clone(),
                    project_name: p.project_name.clone(),
                    project_description: p.project_description.clone(),
                })
                .collect(),
            experiences: self.experiences.iter().map(|e| e.description()).collect(),
            educations: self.educations.iter().map(|e| e.description()).collect(),
            skills: self.skills.iter().map(|s| s.skill_name.clone()).collect(),
        }
    }
}
