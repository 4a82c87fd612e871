//! Sign-in form.

use std::fmt;
use std::sync::Arc;

use super::{report, write_error};
use crate::auth_context::AuthContext;
use crate::router::{Navigation, Page};

pub struct SignInPage {
    auth: Arc<AuthContext>,
    pub email: String,
    pub loading: bool,
    pub error: Option<String>,
}

impl SignInPage {
    pub fn new(auth: Arc<AuthContext>) -> Self {
        Self {
            auth,
            email: String::new(),
            loading: false,
            error: None,
        }
    }

    /// Sign in; lands on the dashboard on success.
    pub async fn submit(&mut self, email: &str, password: &str) -> Option<Navigation> {
        self.email = email.trim().to_string();
        if self.email.is_empty() || password.is_empty() {
            self.error = Some("Email and password are required".to_string());
            return None;
        }

        self.loading = true;
        let result = self.auth.sign_in(&self.email, password).await;
        self.loading = false;

        match result {
            Ok(()) => {
                self.error = None;
                Some(Navigation::to(Page::Dashboard))
            }
            Err(e) => {
                self.error = Some(report("signin", "sign in", &e));
                None
            }
        }
    }

    pub fn sign_up(&self) -> Navigation {
        Navigation::to(Page::SignUp)
    }
}

impl fmt::Display for SignInPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Welcome Back")?;
        writeln!(f, "Sign in to continue to your blog")?;
        write_error(f, &self.error)?;
        if self.loading {
            writeln!(f, "Signing in...")?;
        }
        writeln!(f, "Don't have an account? Sign up")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;
    use blogspace_core::ports::AuthService;

    async fn context(state: &AppState) -> Arc<AuthContext> {
        let ctx = Arc::new(AuthContext::new(state.auth.clone(), state.profiles.clone()));
        ctx.start().await.unwrap();
        ctx
    }

    #[tokio::test]
    async fn test_success_goes_to_dashboard() {
        let (state, auth) = AppState::in_memory();
        auth.sign_up("ada@example.com", "secret1", "Ada").await.unwrap();
        auth.sign_out().await.unwrap();
        let ctx = context(&state).await;

        let mut page = SignInPage::new(ctx.clone());
        let nav = page.submit(" ada@example.com ", "secret1").await;

        assert_eq!(nav, Some(Navigation::to(Page::Dashboard)));
        assert!(page.error.is_none());
        assert_eq!(ctx.user().unwrap().email, "ada@example.com");
    }

    #[tokio::test]
    async fn test_failure_is_visible() {
        let (state, _) = AppState::in_memory();
        let ctx = context(&state).await;

        let mut page = SignInPage::new(ctx.clone());
        assert!(page.submit("nobody@example.com", "secret1").await.is_none());
        assert!(page.to_string().contains("Invalid login credentials"));
        assert!(ctx.user().is_none());

        assert!(page.submit("", "").await.is_none());
        assert!(page.error.as_deref().unwrap().contains("required"));
    }
}
