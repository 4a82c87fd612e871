//! Page controllers.
//!
//! Each page loads what it needs when mounted, keeps its own view state and
//! reports navigation requests to the router as [`Navigation`] values.
//!
//! [`Navigation`]: crate::router::Navigation

mod dashboard;
mod editor;
mod home;
mod post_view;
mod profile;
mod sign_in;
mod sign_up;

#[cfg(test)]
pub(crate) mod tests_support;

pub use dashboard::{Confirm, DashboardPage};
pub use editor::EditorPage;
pub use home::HomePage;
pub use post_view::PostViewPage;
pub use profile::ProfilePage;
pub use sign_in::SignInPage;
pub use sign_up::SignUpPage;

use std::fmt;

use chrono::{DateTime, Utc};

/// Log a failed operation and produce the message shown on the page.
fn report(page: &'static str, action: &str, err: &dyn fmt::Display) -> String {
    tracing::warn!(page, action, error = %err, "Operation failed");
    format!("Could not {action}: {err}")
}

/// Log that a response arrived for a view that is no longer mounted.
fn discard(page: &'static str, what: &str) {
    tracing::debug!(page, what, "Discarding response for unmounted view");
}

/// Short date, e.g. `3/7/2025`.
fn short_date(at: &DateTime<Utc>) -> String {
    at.format("%-m/%-d/%Y").to_string()
}

/// Long date, e.g. `March 7, 2025`.
fn long_date(at: &DateTime<Utc>) -> String {
    at.format("%B %-d, %Y").to_string()
}

fn write_error(f: &mut fmt::Formatter<'_>, error: &Option<String>) -> fmt::Result {
    match error {
        Some(message) => writeln!(f, "! {message}"),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_date_formats() {
        let at = Utc.with_ymd_and_hms(2025, 3, 7, 12, 0, 0).unwrap();
        assert_eq!(short_date(&at), "3/7/2025");
        assert_eq!(long_date(&at), "March 7, 2025");
    }
}
