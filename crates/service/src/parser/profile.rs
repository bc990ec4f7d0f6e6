use chrono::{DateTime, NaiveDate, Utc};
use serde::ser::Error as _;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::user::UserSummary;
use crate::error::ServiceError;
use crate::store::{Document, PROFILES};
use crate::validation::{present, Validator};

/// Platform name (`twitter`, `linkedin`, ...) to URL.
pub type SocialLinks = BTreeMap<String, String>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub from: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<NaiveDate>,
    #[serde(default)]
    pub current: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Education {
    pub id: Uuid,
    pub school: String,
    pub degree: String,
    pub fieldofstudy: String,
    pub from: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<NaiveDate>,
    #[serde(default)]
    pub current: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One profile per user, stored under the owner's id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub user: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub status: String,
    pub skills: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub githubusername: Option<String>,
    #[serde(default)]
    pub social: SocialLinks,
    #[serde(default)]
    pub experience: Vec<Experience>,
    #[serde(default)]
    pub education: Vec<Education>,
    pub date: DateTime<Utc>,
}

/// Profile as read back. On the wire `user` holds the owner's id, name and
/// avatar, or just the id when the account is gone.
#[derive(Clone, Debug, PartialEq)]
pub struct ProfileView {
    pub profile: Profile,
    pub owner: Option<UserSummary>,
}

impl Serialize for ProfileView {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut value = serde_json::to_value(&self.profile).map_err(S::Error::custom)?;
        if let (Some(owner), Some(fields)) = (&self.owner, value.as_object_mut()) {
            let owner = serde_json::to_value(owner).map_err(S::Error::custom)?;
            fields.insert("user".to_string(), owner);
        }
        value.serialize(serializer)
    }
}

/// Body of `POST /api/profile`, exactly as the client sends it.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ProfileInput {
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub status: Option<String>,
    pub githubusername: Option<String>,
    pub skills: Option<String>,
    pub youtube: Option<String>,
    pub twitter: Option<String>,
    pub instagram: Option<String>,
    pub linkedin: Option<String>,
    pub facebook: Option<String>,
}

/// The fields a profile write actually touches. Absent fields are left alone.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProfilePatch {
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub status: Option<String>,
    pub githubusername: Option<String>,
    pub skills: Option<Vec<String>>,
    pub social: SocialLinks,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ExperienceInput {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub current: Option<bool>,
    pub description: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct EducationInput {
    pub school: Option<String>,
    pub degree: Option<String>,
    pub fieldofstudy: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub current: Option<bool>,
    pub description: Option<String>,
}

/// `"rust, go ,sql"` becomes `["rust", "go", "sql"]`.
pub fn split_skills(skills: &str) -> Vec<String> {
    skills
        .split(',')
        .map(str::trim)
        .filter(|skill| !skill.is_empty())
        .map(str::to_string)
        .collect()
}

impl ProfileInput {
    pub fn into_patch(self) -> ProfilePatch {
        let mut social = SocialLinks::new();
        for (platform, url) in [
            ("youtube", self.youtube),
            ("twitter", self.twitter),
            ("instagram", self.instagram),
            ("linkedin", self.linkedin),
            ("facebook", self.facebook),
        ] {
            if let Some(url) = present(url) {
                social.insert(platform.to_string(), url);
            }
        }

        ProfilePatch {
            company: present(self.company),
            website: present(self.website),
            location: present(self.location),
            bio: present(self.bio),
            status: present(self.status),
            githubusername: present(self.githubusername),
            skills: present(self.skills)
                .map(|s| split_skills(&s))
                .filter(|skills| !skills.is_empty()),
            social,
        }
    }
}

impl Profile {
    /// First write for `owner`. Status and skills are mandatory here.
    pub fn create(owner: Uuid, patch: ProfilePatch) -> Result<Self, ServiceError> {
        let mut check = Validator::default();
        let status = check.required("status", patch.status.clone(), "Status is required");
        if patch.skills.is_none() {
            check.required("skills", None, "Skills are required");
        }

        let (Some(status), Some(skills)) = (status, patch.skills.clone()) else {
            return Err(check.into_error());
        };

        let mut profile = Profile {
            id: Uuid::new_v4(),
            user: owner,
            company: None,
            website: None,
            location: None,
            status,
            skills,
            bio: None,
            githubusername: None,
            social: SocialLinks::new(),
            experience: Vec::new(),
            education: Vec::new(),
            date: Utc::now(),
        };
        profile.apply(patch);
        Ok(profile)
    }

    /// Merges `patch` in place. Only present fields overwrite.
    pub fn apply(&mut self, patch: ProfilePatch) {
        fn set<T>(field: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *field = value;
            }
        }

        set(&mut self.company, patch.company);
        set(&mut self.website, patch.website);
        set(&mut self.location, patch.location);
        set(&mut self.bio, patch.bio);
        set(&mut self.githubusername, patch.githubusername);
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(skills) = patch.skills {
            self.skills = skills;
        }
        self.social.extend(patch.social);
    }

    pub fn with_owner(self, owner: Option<UserSummary>) -> ProfileView {
        ProfileView {
            profile: self,
            owner,
        }
    }
}

impl Document for Profile {
    const TABLE: &'static str = PROFILES;

    fn key(&self) -> String {
        self.user.to_string()
    }
}

impl ExperienceInput {
    pub fn validate(self) -> Result<Experience, ServiceError> {
        let mut check = Validator::default();
        let title = check.required("title", self.title, "Title is required");
        let company = check.required("company", self.company, "Company is required");
        let from = check.required_date("from", self.from, "From Date is required");
        let to = check.optional_date("to", self.to);

        match (title, company, from) {
            (Some(title), Some(company), Some(from)) if check.is_clean() => Ok(Experience {
                id: Uuid::new_v4(),
                title,
                company,
                location: present(self.location),
                from,
                to,
                current: self.current.unwrap_or(false),
                description: present(self.description),
            }),
            _ => Err(check.into_error()),
        }
    }
}

impl EducationInput {
    pub fn validate(self) -> Result<Education, ServiceError> {
        let mut check = Validator::default();
        let school = check.required("school", self.school, "School is required");
        let degree = check.required("degree", self.degree, "Degree is required");
        let fieldofstudy = check.required("fieldofstudy", self.fieldofstudy, "Field of Study is required");
        let from = check.required_date("from", self.from, "From Date is required");
        let to = check.optional_date("to", self.to);

        match (school, degree, fieldofstudy, from) {
            (Some(school), Some(degree), Some(fieldofstudy), Some(from)) if check.is_clean() => Ok(Education {
                id: Uuid::new_v4(),
                school,
                degree,
                fieldofstudy,
                from,
                to,
                current: self.current.unwrap_or(false),
                description: present(self.description),
            }),
            _ => Err(check.into_error()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(status: &str, skills: &str) -> ProfileInput {
        ProfileInput {
            status: Some(status.to_string()),
            skills: Some(skills.to_string()),
            ..ProfileInput::default()
        }
    }

    fn params(err: ServiceError) -> Vec<String> {
        match err {
            ServiceError::Validation(errors) => errors.into_iter().map(|e| e.param).collect(),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn skills_are_split_and_trimmed() {
        assert_eq!(split_skills(" rust,  go ,,sql "), vec!["rust", "go", "sql"]);
    }

    #[test]
    fn blank_input_fields_stay_out_of_the_patch() {
        let patch = ProfileInput {
            company: Some(String::new()),
            twitter: Some("https://twitter.com/ada".to_string()),
            youtube: Some("  ".to_string()),
            ..input("Developer", "rust")
        }
        .into_patch();

        assert_eq!(patch.company, None);
        assert_eq!(patch.social.len(), 1);
        assert_eq!(patch.social.get("twitter").map(String::as_str), Some("https://twitter.com/ada"));
    }

    #[test]
    fn create_requires_status_and_skills() {
        let err = Profile::create(Uuid::new_v4(), ProfilePatch::default());
        assert_eq!(params(err.unwrap_err()), vec!["status", "skills"]);

        let err = Profile::create(Uuid::new_v4(), input("Developer", " , ").into_patch());
        assert_eq!(params(err.unwrap_err()), vec!["skills"]);
    }

    #[test]
    fn apply_keeps_fields_the_patch_omits() -> Result<(), ServiceError> {
        let owner = Uuid::new_v4();
        let mut profile = Profile::create(
            owner,
            ProfileInput {
                bio: Some("Writes compilers".to_string()),
                linkedin: Some("https://linkedin.com/in/ada".to_string()),
                ..input("Developer", "rust")
            }
            .into_patch(),
        )?;

        profile.apply(
            ProfileInput {
                twitter: Some("https://twitter.com/ada".to_string()),
                ..input("Lead", "rust, go")
            }
            .into_patch(),
        );

        assert_eq!(profile.user, owner);
        assert_eq!(profile.bio.as_deref(), Some("Writes compilers"));
        assert_eq!(profile.status, "Lead");
        assert_eq!(profile.skills, vec!["rust", "go"]);
        assert_eq!(profile.social.len(), 2);
        Ok(())
    }

    #[test]
    fn experience_needs_title_company_and_from() {
        let err = ExperienceInput {
            company: Some("Acme".to_string()),
            from: Some("not a date".to_string()),
            ..ExperienceInput::default()
        }
        .validate();

        assert_eq!(params(err.unwrap_err()), vec!["title", "from"]);
    }

    #[test]
    fn education_builds_an_entry() -> Result<(), ServiceError> {
        let education = EducationInput {
            school: Some("MIT".to_string()),
            degree: Some("BSc".to_string()),
            fieldofstudy: Some("CS".to_string()),
            from: Some("2015-09-01".to_string()),
            to: Some("2019-06-01".to_string()),
            ..EducationInput::default()
        }
        .validate()?;

        assert_eq!(education.school, "MIT");
        assert_eq!(education.to, NaiveDate::from_ymd_opt(2019, 6, 1));
        assert!(!education.current);
        Ok(())
    }

    #[test]
    fn view_replaces_user_id_with_owner_details() -> Result<(), Box<dyn std::error::Error>> {
        let owner = Uuid::new_v4();
        let profile = Profile::create(owner, input("Developer", "rust").into_patch())?;
        let summary = UserSummary {
            id: owner,
            name: "Ada".to_string(),
            avatar: "//avatar/ada".to_string(),
        };

        let json = serde_json::to_value(profile.clone().with_owner(Some(summary)))?;
        assert_eq!(json["user"]["id"], owner.to_string());
        assert_eq!(json["user"]["name"], "Ada");
        assert_eq!(json["user"]["avatar"], "//avatar/ada");
        assert_eq!(json["status"], "Developer");
        assert!(json.get("owner").is_none());

        let orphan = serde_json::to_value(profile.with_owner(None))?;
        assert_eq!(orphan["user"], owner.to_string());
        Ok(())
    }
}
