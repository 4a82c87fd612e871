//! Sign-up form.

use std::fmt;
use std::sync::Arc;

use blogspace_core::domain::SignUpOutcome;

use super::{report, write_error};
use crate::auth_context::AuthContext;
use crate::router::{Navigation, Page};

pub struct SignUpPage {
    auth: Arc<AuthContext>,
    pub loading: bool,
    /// Set when the backend wants the address confirmed first.
    pub confirmation_sent_to: Option<String>,
    pub error: Option<String>,
}

impl SignUpPage {
    pub fn new(auth: Arc<AuthContext>) -> Self {
        Self {
            auth,
            loading: false,
            confirmation_sent_to: None,
            error: None,
        }
    }

    pub async fn submit(
        &mut self,
        display_name: &str,
        email: &str,
        password: &str,
    ) -> Option<Navigation> {
        let (display_name, email) = (display_name.trim(), email.trim());
        if display_name.is_empty() || email.is_empty() || password.is_empty() {
            self.error = Some("Display name, email and password are required".to_string());
            return None;
        }

        self.loading = true;
        let result = self.auth.sign_up(email, password, display_name).await;
        self.loading = false;

        match result {
            Ok(SignUpOutcome::SignedIn(_)) => {
                self.error = None;
                Some(Navigation::to(Page::Dashboard))
            }
            Ok(SignUpOutcome::ConfirmationRequired { user }) => {
                tracing::info!(user_id = %user.id, "Sign-up awaiting email confirmation");
                self.error = None;
                self.confirmation_sent_to = Some(user.email);
                None
            }
            Err(e) => {
                self.error = Some(report("signup", "sign up", &e));
                None
            }
        }
    }
}

impl fmt::Display for SignUpPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Create Your Account")?;
        writeln!(f, "Start your blogging journey today")?;
        write_error(f, &self.error)?;
        if let Some(email) = &self.confirmation_sent_to {
            writeln!(f, "Check your email: a confirmation link was sent to {email}.")?;
        }
        if self.loading {
            writeln!(f, "Creating account...")?;
        }
        writeln!(f, "Already have an account? Sign in")
    }
}
