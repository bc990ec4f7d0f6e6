use connector_database::basic_db::SafeDatabase;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ServiceError;
use crate::parser::post::Post;
use crate::parser::profile::{EducationInput, ExperienceInput, Profile, ProfileInput, ProfileView};
use crate::parser::user::User;
use crate::store::DocumentStore;

/// Reads, upserts and edits the sub-documents of user profiles.
///
/// Every edit is a read-modify-write of the whole profile document. Two
/// concurrent edits to the same profile are last-write-wins.
#[derive(Clone)]
pub struct ProfileEditor<D> {
    store: DocumentStore<D>,
}

impl<D: SafeDatabase> ProfileEditor<D> {
    pub fn new(database: D) -> Self {
        Self {
            store: DocumentStore::new(database),
        }
    }

    fn owned_profile(&self, owner: Uuid) -> Result<Profile, ServiceError> {
        self.store
            .find(&owner.to_string())?
            .ok_or_else(|| ServiceError::not_found("User has no profile"))
    }

    fn view(&self, profile: Profile) -> Result<ProfileView, ServiceError> {
        let owner = self
            .store
            .find::<User>(&profile.user.to_string())?
            .map(|user| user.summary());
        Ok(profile.with_owner(owner))
    }

    pub fn me(&self, owner: Uuid) -> Result<ProfileView, ServiceError> {
        let profile = self
            .store
            .find(&owner.to_string())?
            .ok_or_else(|| ServiceError::not_found("There is no profile for this user"))?;
        self.view(profile)
    }

    /// Public listing, oldest profile first.
    pub fn all(&self) -> Result<Vec<ProfileView>, ServiceError> {
        let mut profiles = self.store.all::<Profile>()?;
        profiles.sort_by_key(|profile| profile.date);
        profiles.into_iter().map(|profile| self.view(profile)).collect()
    }

    /// `user_id` comes straight from the URL; anything that is not a UUID is
    /// reported the same as a missing profile.
    pub fn by_user(&self, user_id: &str) -> Result<ProfileView, ServiceError> {
        let owner = Uuid::parse_str(user_id).map_err(|_| ServiceError::not_found("Profile not found"))?;
        let profile = self
            .store
            .find(&owner.to_string())?
            .ok_or_else(|| ServiceError::not_found("Profile not found"))?;
        self.view(profile)
    }

    /// Creates the owner's profile or merges `input` into the existing one.
    pub fn upsert(&self, owner: Uuid, input: ProfileInput) -> Result<Profile, ServiceError> {
        let patch = input.into_patch();

        let profile = match self.store.find::<Profile>(&owner.to_string())? {
            Some(mut profile) => {
                profile.apply(patch);
                info!(%owner, "updating profile");
                profile
            }
            None => {
                let profile = Profile::create(owner, patch)?;
                info!(%owner, profile = %profile.id, "creating profile");
                profile
            }
        };

        self.store.save(&profile)?;
        Ok(profile)
    }

    /// Removes the profile, the user's posts and the user.
    pub fn delete_account(&self, owner: Uuid) -> Result<(), ServiceError> {
        let key = owner.to_string();
        self.store.remove::<Profile>(&key)?;

        for post in self.store.all::<Post>()? {
            if post.user == owner {
                self.store.remove::<Post>(&post.id.to_string())?;
            }
        }

        if !self.store.remove::<User>(&key)? {
            warn!(%owner, "account delete for unknown user");
            return Err(ServiceError::NothingToDelete("No user to delete".to_string()));
        }

        info!(%owner, "account deleted");
        Ok(())
    }

    pub fn add_experience(&self, owner: Uuid, input: ExperienceInput) -> Result<Profile, ServiceError> {
        let entry = input.validate()?;
        let mut profile = self.owned_profile(owner)?;

        profile.experience.insert(0, entry);
        self.store.save(&profile)?;
        Ok(profile)
    }

    pub fn remove_experience(&self, owner: Uuid, entry_id: &str) -> Result<Profile, ServiceError> {
        let mut profile = self.owned_profile(owner)?;
        let position = Uuid::parse_str(entry_id)
            .ok()
            .and_then(|id| profile.experience.iter().position(|entry| entry.id == id))
            .ok_or_else(|| ServiceError::not_found("No Experience to delete"))?;

        profile.experience.remove(position);
        self.store.save(&profile)?;
        Ok(profile)
    }

    pub fn add_education(&self, owner: Uuid, input: EducationInput) -> Result<Profile, ServiceError> {
        let entry = input.validate()?;
        let mut profile = self.owned_profile(owner)?;

        profile.education.insert(0, entry);
        self.store.save(&profile)?;
        Ok(profile)
    }

    pub fn remove_education(&self, owner: Uuid, entry_id: &str) -> Result<Profile, ServiceError> {
        let mut profile = self.owned_profile(owner)?;
        let position = Uuid::parse_str(entry_id)
            .ok()
            .and_then(|id| profile.education.iter().position(|entry| entry.id == id))
            .ok_or_else(|| ServiceError::not_found("No Education to delete"))?;

        profile.education.remove(position);
        self.store.save(&profile)?;
        Ok(profile)
    }
}
