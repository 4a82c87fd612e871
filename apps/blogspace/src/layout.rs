//! Layout - the nav bar and footer around every page but the editor.

use crate::auth_context::AuthSnapshot;
use crate::router::Page;

const BRAND: &str = "BlogSpace";
const FOOTER: &str = "© 2025 BlogSpace. A modern blogging platform.";

/// Nav items that can be highlighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavItem {
    Home,
    Dashboard,
    Profile,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub label: String,
    pub target: Link,
    pub active: bool,
}

/// What a nav link does when followed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link {
    Go(Page),
    SignOut,
}

pub struct Layout {
    links: Vec<NavLink>,
}

impl Layout {
    pub fn new(auth: &AuthSnapshot, current: Option<NavItem>) -> Self {
        let link = |label: &str, target, item: Option<NavItem>| NavLink {
            label: label.to_string(),
            target,
            active: item.is_some() && item == current,
        };

        let links = if auth.user.is_some() {
            let name = auth
                .profile
                .as_ref()
                .map(|p| p.display_name.as_str())
                .unwrap_or_default();
            vec![
                link("Home", Link::Go(Page::Home), Some(NavItem::Home)),
                link("My Blogs", Link::Go(Page::Dashboard), Some(NavItem::Dashboard)),
                link(name, Link::Go(Page::Profile), Some(NavItem::Profile)),
                link("Sign Out", Link::SignOut, None),
            ]
        } else {
            vec![
                link("Sign In", Link::Go(Page::SignIn), None),
                link("Get Started", Link::Go(Page::SignUp), None),
            ]
        };

        Self { links }
    }

    pub fn links(&self) -> &[NavLink] {
        &self.links
    }

    /// Put the page body between the nav bar and the footer.
    pub fn wrap(&self, body: &str) -> String {
        let nav = self
            .links
            .iter()
            .enumerate()
            .map(|(i, l)| {
                if l.active {
                    format!("{}.[{}]", i + 1, l.label)
                } else {
                    format!("{}.{}", i + 1, l.label)
                }
            })
            .collect::<Vec<_>>()
            .join(" | ");

        let rule = "-".repeat(60);
        format!("{BRAND}    {nav}\n{rule}\n{body}{rule}\n{FOOTER}\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blogspace_core::domain::{AuthUser, Profile};
    use chrono::Utc;
    use uuid::Uuid;

    fn signed_in() -> AuthSnapshot {
        let id = Uuid::new_v4();
        AuthSnapshot {
            user: Some(AuthUser {
                id,
                email: "ada@example.com".into(),
            }),
            profile: Some(Profile {
                id,
                email: "ada@example.com".into(),
                display_name: "Ada".into(),
                bio: String::new(),
                avatar_url: String::new(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            }),
            loading: false,
        }
    }

    #[test]
    fn test_visitor_links() {
        let visitor = AuthSnapshot {
            loading: false,
            ..Default::default()
        };
        let layout = Layout::new(&visitor, Some(NavItem::Home));
        let labels: Vec<_> = layout.links().iter().map(|l| l.label.as_str()).collect();
        assert_eq!(labels, ["Sign In", "Get Started"]);
        assert!(layout.links().iter().all(|l| !l.active));
    }

    #[test]
    fn test_signed_in_links_highlight_current() {
        let layout = Layout::new(&signed_in(), Some(NavItem::Dashboard));
        let active: Vec<_> = layout
            .links()
            .iter()
            .filter(|l| l.active)
            .map(|l| l.target)
            .collect();
        assert_eq!(active, [Link::Go(Page::Dashboard)]);
        assert_eq!(layout.links()[2].label, "Ada");

        let page = layout.wrap("body\n");
        assert!(page.starts_with("BlogSpace"));
        assert!(page.contains("[My Blogs]"));
        assert!(page.ends_with(&format!("{FOOTER}\n")));
    }

    #[test]
    fn test_no_highlight_outside_nav_pages() {
        let layout = Layout::new(&signed_in(), Page::Post.nav_item());
        assert!(layout.links().iter().all(|l| !l.active));
    }
}
