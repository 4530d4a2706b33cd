use serde::{Deserialize, Serialize};

/// The logged-in user's profile as the client keeps it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct UserProfile {
    pub id: String,
    #[serde(rename = "fullName")]
    pub full_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(rename = "skillsOffered", default)]
    pub skills_offered: Vec<String>,
    #[serde(rename = "skillsWanted", default)]
    pub skills_wanted: Vec<String>,
    #[serde(default)]
    pub availability: Vec<String>,
    #[serde(rename = "profilePicture", default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
}

impl UserProfile {
    /// Shallow merge: every field present in `patch` replaces the current one.
    pub fn apply(&mut self, patch: ProfilePatch) {
        if let Some(id) = patch.id {
            self.id = id;
        }
        if let Some(full_name) = patch.full_name {
            self.full_name = full_name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(location) = patch.location {
            self.location = Some(location);
        }
        if let Some(skills) = patch.skills_offered {
            self.skills_offered = skills;
        }
        if let Some(skills) = patch.skills_wanted {
            self.skills_wanted = skills;
        }
        if let Some(availability) = patch.availability {
            self.availability = availability;
        }
        if let Some(picture) = patch.profile_picture {
            self.profile_picture = Some(picture);
        }
    }
}

/// Partial profile for `SessionStore::update_user`. Absent fields are left
/// untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ProfilePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "fullName", default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(rename = "skillsOffered", default, skip_serializing_if = "Option::is_none")]
    pub skills_offered: Option<Vec<String>>,
    #[serde(rename = "skillsWanted", default, skip_serializing_if = "Option::is_none")]
    pub skills_wanted: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability: Option<Vec<String>>,
    #[serde(rename = "profilePicture", default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// User record as the backend sends it. Older deployments use snake_case
/// names for some fields, so both spellings are accepted.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawUser {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(rename = "_id", default)]
    pub object_id: Option<serde_json::Value>,
    #[serde(rename = "fullName", default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(rename = "skillsOffered", default)]
    pub skills_offered: Option<Vec<String>>,
    #[serde(default)]
    pub offered_skills: Option<Vec<String>>,
    #[serde(rename = "skillsWanted", default)]
    pub skills_wanted: Option<Vec<String>>,
    #[serde(default)]
    pub wanted_skills: Option<Vec<String>>,
    #[serde(default)]
    pub availability: Option<Availability>,
    #[serde(rename = "profilePicture", default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub profile_pic_url: Option<String>,
}

/// Availability arrives either as a list or as a single free-text string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Availability {
    List(Vec<String>),
    Text(String),
}

impl Availability {
    fn into_list(self) -> Vec<String> {
        match self {
            Availability::List(items) => items,
            Availability::Text(text) if text.trim().is_empty() => Vec::new(),
            Availability::Text(text) => vec![text],
        }
    }
}

/// First non-absent value wins.
fn first_present<T: Clone>(candidates: &[&Option<T>]) -> Option<T> {
    candidates.iter().find_map(|c| (*c).clone())
}

fn id_string(id: &serde_json::Value) -> Option<String> {
    match id {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Map a backend user record onto `UserProfile`.
///
/// Source order per field:
/// - `id`: `id`, `_id`
/// - `fullName`: `fullName`, `name`
/// - `skillsOffered`: `skillsOffered`, `offered_skills`
/// - `skillsWanted`: `skillsWanted`, `wanted_skills`
/// - `profilePicture`: `profilePicture`, `profile_pic_url`
///
/// Missing lists become empty and missing strings become empty.
pub fn normalize_user(raw: &RawUser) -> UserProfile {
    UserProfile {
        id: [&raw.id, &raw.object_id]
            .into_iter()
            .flatten()
            .find_map(id_string)
            .unwrap_or_default(),
        full_name: first_present(&[&raw.full_name, &raw.name]).unwrap_or_default(),
        email: raw.email.clone().unwrap_or_default(),
        location: raw.location.clone(),
        skills_offered: first_present(&[&raw.skills_offered, &raw.offered_skills])
            .unwrap_or_default(),
        skills_wanted: first_present(&[&raw.skills_wanted, &raw.wanted_skills]).unwrap_or_default(),
        availability: raw
            .availability
            .clone()
            .map(Availability::into_list)
            .unwrap_or_default(),
        profile_picture: first_present(&[&raw.profile_picture, &raw.profile_pic_url]),
    }
}
