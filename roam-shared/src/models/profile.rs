use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPreference {
    Low,
    #[default]
    Medium,
    High,
}

impl BudgetPreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetPreference::Low => "low",
            BudgetPreference::Medium => "medium",
            BudgetPreference::High => "high",
        }
    }
}

impl std::str::FromStr for BudgetPreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(BudgetPreference::Low),
            "medium" => Ok(BudgetPreference::Medium),
            "high" => Ok(BudgetPreference::High),
            other => Err(format!("unknown budget preference: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub id: Uuid,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub extended_bio: Option<String>,
    #[serde(default)]
    pub is_creator: bool,
    #[serde(default)]
    pub travel_styles: Vec<String>,
    #[serde(default)]
    pub budget_preference: BudgetPreference,
    #[serde(default)]
    pub follower_count: i32,
    #[serde(default)]
    pub following_count: i32,
    pub years_traveling: Option<i32>,
    pub cities_visited: Option<i32>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub specialized_places: Vec<String>,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub social_links: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial profile update. `updated_at` is stamped on every apply, even when empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProfilePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extended_bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_creator: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travel_styles: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_preference: Option<BudgetPreference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub years_traveling: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cities_visited: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub languages: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialized_places: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlights: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_links: Option<BTreeMap<String, String>>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        *self == ProfilePatch::default()
    }

    pub fn apply(self, profile: &mut Profile, now: DateTime<Utc>) {
        if let Some(v) = self.username {
            profile.username = v;
        }
        if let Some(v) = self.display_name {
            profile.display_name = Some(v);
        }
        if let Some(v) = self.avatar_url {
            profile.avatar_url = Some(v);
        }
        if let Some(v) = self.bio {
            profile.bio = Some(v);
        }
        if let Some(v) = self.extended_bio {
            profile.extended_bio = Some(v);
        }
        if let Some(v) = self.is_creator {
            profile.is_creator = v;
        }
        if let Some(v) = self.travel_styles {
            profile.travel_styles = v;
        }
        if let Some(v) = self.budget_preference {
            profile.budget_preference = v;
        }
        if let Some(v) = self.years_traveling {
            profile.years_traveling = Some(v);
        }
        if let Some(v) = self.cities_visited {
            profile.cities_visited = Some(v);
        }
        if let Some(v) = self.languages {
            profile.languages = v;
        }
        if let Some(v) = self.specialized_places {
            profile.specialized_places = v;
        }
        if let Some(v) = self.highlights {
            profile.highlights = v;
        }
        if let Some(v) = self.social_links {
            profile.social_links = v;
        }
        profile.updated_at = now;
    }
}
