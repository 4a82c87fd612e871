//! Profile - the signed-in user's display name and bio.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;

use blogspace_core::DomainError;
use blogspace_core::domain::{Profile, ProfileChanges};
use blogspace_core::ports::ProfileRepository;

use super::{discard, long_date, report, write_error};
use crate::auth_context::AuthContext;
use crate::lifecycle::MountToken;

pub struct ProfilePage {
    profiles: Arc<dyn ProfileRepository>,
    auth: Arc<AuthContext>,
    token: MountToken,
    pub loading: bool,
    pub profile: Option<Profile>,
    pub saved: bool,
    pub error: Option<String>,
}

impl ProfilePage {
    pub fn new(profiles: Arc<dyn ProfileRepository>, auth: Arc<AuthContext>, token: MountToken) -> Self {
        Self {
            profiles,
            auth,
            token,
            loading: true,
            profile: None,
            saved: false,
            error: None,
        }
    }

    pub async fn load(&mut self) {
        let Some(user) = self.auth.user() else {
            return;
        };

        let result = self.profiles.find_by_id(user.id).await;
        if !self.token.is_live() {
            return discard("profile", "profile");
        }

        match result {
            Ok(Some(profile)) => {
                self.profile = Some(profile);
                self.error = None;
            }
            Ok(None) => self.error = Some("Profile not found".to_string()),
            Err(e) => self.error = Some(report("profile", "load profile", &e)),
        }
        self.loading = false;
    }

    /// Store the edited fields and refresh the shared auth state.
    pub async fn save(&mut self, display_name: &str, bio: &str) {
        self.saved = false;
        let Some(id) = self.profile.as_ref().map(|p| p.id) else {
            self.error = Some("Profile not loaded".to_string());
            return;
        };
        let display_name = display_name.trim();
        if display_name.is_empty() {
            self.error = Some(DomainError::Validation("display name is required".to_string()).to_string());
            return;
        }

        let changes = ProfileChanges {
            display_name: display_name.to_string(),
            bio: bio.trim().to_string(),
            updated_at: Utc::now(),
        };
        let result = self.profiles.update(id, changes).await;
        if !self.token.is_live() {
            return discard("profile", "saved profile");
        }

        match result {
            Ok(profile) => {
                tracing::info!(user_id = %profile.id, "Profile updated");
                self.profile = Some(profile);
                self.saved = true;
                self.error = None;
                self.auth.refresh_profile().await;
            }
            Err(e) => self.error = Some(report("profile", "save profile", &e)),
        }
    }
}

impl fmt::Display for ProfilePage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Your Profile")?;
        write_error(f, &self.error)?;
        if self.loading {
            return writeln!(f, "Loading...");
        }
        let Some(profile) = &self.profile else {
            return Ok(());
        };

        writeln!(f, "Display name: {}", profile.display_name)?;
        writeln!(f, "Email:        {}", profile.email)?;
        let bio = if profile.bio.is_empty() { "(none)" } else { &profile.bio };
        writeln!(f, "Bio:          {bio}")?;
        writeln!(f, "Member since {}", long_date(&profile.created_at))?;
        if self.saved {
            writeln!(f, "Profile saved.")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::Mounts;
    use crate::state::AppState;

    #[tokio::test]
    async fn test_save_refreshes_auth_context() {
        let (state, _) = AppState::in_memory();
        let ctx = Arc::new(AuthContext::new(state.auth.clone(), state.profiles.clone()));
        ctx.start().await.unwrap();
        ctx.sign_up("ada@example.com", "secret1", "Ada").await.unwrap();

        let mut page = ProfilePage::new(state.profiles.clone(), ctx.clone(), Mounts::new().mount());
        page.load().await;
        assert_eq!(page.profile.as_ref().unwrap().email, "ada@example.com");

        page.save("Ada L.", "Mathematician").await;
        assert!(page.saved);
        assert_eq!(page.profile.as_ref().unwrap().bio, "Mathematician");

        let profile = ctx.snapshot().profile.unwrap();
        assert_eq!(profile.display_name, "Ada L.");
    }

    #[tokio::test]
    async fn test_empty_display_name_rejected() {
        let (state, _) = AppState::in_memory();
        let ctx = Arc::new(AuthContext::new(state.auth.clone(), state.profiles.clone()));
        ctx.start().await.unwrap();
        ctx.sign_up("ada@example.com", "secret1", "Ada").await.unwrap();

        let mut page = ProfilePage::new(state.profiles.clone(), ctx.clone(), Mounts::new().mount());
        page.load().await;
        page.save("   ", "").await;

        assert!(!page.saved);
        assert!(page.error.is_some());
        assert_eq!(ctx.snapshot().profile.unwrap().display_name, "Ada");
    }
}
