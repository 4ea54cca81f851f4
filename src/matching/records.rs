//! Domain records supplied by the service layer.

use serde::{Deserialize, Serialize};

/// A candidate profile reduced to the fields the matcher reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Candidate {
    pub id: String,
    pub name: String,
    /// Headline title, e.g. "Senior Backend Engineer".
    pub title: String,
    pub skills: Vec<String>,
    pub years_experience: f64,
    pub location: String,
    /// Working arrangement, e.g. "full-time", "contract, part-time".
    pub availability: String,
    /// Average client rating on a 0-5 scale.
    pub rating: f64,
    pub verified: bool,
    pub completed_projects: u32,
    pub certifications: u32,
}

impl Candidate {
    /// Create a candidate with only an id and name set.
    pub fn new<S: Into<String>>(id: S, name: S) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_title<S: Into<String>>(mut self, title: S) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skills = skills.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_experience(mut self, years: f64) -> Self {
        self.years_experience = years;
        self
    }

    pub fn with_location<S: Into<String>>(mut self, location: S) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_availability<S: Into<String>>(mut self, availability: S) -> Self {
        self.availability = availability.into();
        self
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = rating;
        self
    }

    pub fn verified(mut self, verified: bool) -> Self {
        self.verified = verified;
        self
    }

    pub fn with_projects(mut self, completed_projects: u32) -> Self {
        self.completed_projects = completed_projects;
        self
    }

    pub fn with_certifications(mut self, certifications: u32) -> Self {
        self.certifications = certifications;
        self
    }
}

/// A job posting candidates can be ranked against.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobPosting {
    pub id: String,
    pub title: String,
    pub required_skills: Vec<String>,
    pub location: Option<String>,
    /// Free-form level, e.g. "Senior", "Entry level".
    pub experience_level: Option<String>,
    /// Free-form arrangement, e.g. "Full-time", "Contract".
    pub job_type: Option<String>,
}
