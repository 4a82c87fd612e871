//! View router - which page is mounted, and the guard in front of it.
//!
//! Navigation is a value: pages hand back a [`Navigation`] and the router
//! decides where the user actually lands. While the auth context is still
//! resolving the session every navigation is deferred; protected pages
//! redirect signed-out users to sign-in before any page state is set.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use uuid::Uuid;

use crate::auth_context::AuthContext;
use crate::layout::{Layout, NavItem};
use crate::lifecycle::Mounts;
use crate::pages::{
    DashboardPage, EditorPage, HomePage, PostViewPage, ProfilePage, SignInPage, SignUpPage,
};
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Page {
    #[default]
    Home,
    SignIn,
    SignUp,
    Dashboard,
    Editor,
    Post,
    Profile,
}

impl Page {
    pub fn as_str(&self) -> &'static str {
        match self {
            Page::Home => "home",
            Page::SignIn => "signin",
            Page::SignUp => "signup",
            Page::Dashboard => "dashboard",
            Page::Editor => "editor",
            Page::Post => "post",
            Page::Profile => "profile",
        }
    }

    /// Pages that need a signed-in user.
    pub fn is_protected(&self) -> bool {
        matches!(self, Page::Dashboard | Page::Editor | Page::Profile)
    }

    /// The layout item highlighted while this page is shown.
    pub fn nav_item(&self) -> Option<NavItem> {
        match self {
            Page::Home => Some(NavItem::Home),
            Page::Dashboard => Some(NavItem::Dashboard),
            Page::Profile => Some(NavItem::Profile),
            _ => None,
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("Unknown page: {0}")]
pub struct UnknownPage(String);

impl FromStr for Page {
    type Err = UnknownPage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "home" => Ok(Page::Home),
            "signin" => Ok(Page::SignIn),
            "signup" => Ok(Page::SignUp),
            "dashboard" => Ok(Page::Dashboard),
            "editor" => Ok(Page::Editor),
            "post" => Ok(Page::Post),
            "profile" => Ok(Page::Profile),
            other => Err(UnknownPage(other.to_string())),
        }
    }
}

/// Navigation payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavData {
    pub blog_id: Option<Uuid>,
    pub post_id: Option<Uuid>,
}

/// A navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigation {
    pub page: Page,
    pub data: Option<NavData>,
}

impl Navigation {
    pub fn to(page: Page) -> Self {
        Self { page, data: None }
    }

    pub fn with(page: Page, data: NavData) -> Self {
        Self {
            page,
            data: Some(data),
        }
    }
}

/// Where a navigation request ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    /// Auth is still loading; nothing changed.
    Deferred,
    Arrived(Page),
    Redirected { requested: Page, to: Page },
}

/// The mounted page controller.
pub enum View {
    Home(HomePage),
    SignIn(SignInPage),
    SignUp(SignUpPage),
    Dashboard(DashboardPage),
    Editor(EditorPage),
    Post(PostViewPage),
    Profile(ProfilePage),
}

impl View {
    async fn load(&mut self) {
        match self {
            View::Home(page) => page.load().await,
            View::Dashboard(page) => page.load().await,
            View::Editor(page) => page.load().await,
            View::Post(page) => page.load().await,
            View::Profile(page) => page.load().await,
            View::SignIn(_) | View::SignUp(_) => {}
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::Home(page) => page.fmt(f),
            View::SignIn(page) => page.fmt(f),
            View::SignUp(page) => page.fmt(f),
            View::Dashboard(page) => page.fmt(f),
            View::Editor(page) => page.fmt(f),
            View::Post(page) => page.fmt(f),
            View::Profile(page) => page.fmt(f),
        }
    }
}

pub struct App {
    state: AppState,
    auth: Arc<AuthContext>,
    page: Page,
    nav: NavData,
    mounts: Mounts,
    view: Option<View>,
    // user the mounted view was built for
    seen_user: Option<Uuid>,
}

impl App {
    pub fn new(state: AppState, auth: Arc<AuthContext>) -> Self {
        Self {
            state,
            auth,
            page: Page::Home,
            nav: NavData::default(),
            mounts: Mounts::new(),
            view: None,
            seen_user: None,
        }
    }

    pub fn page(&self) -> Page {
        self.page
    }

    #[cfg(test)]
    pub fn nav_data(&self) -> NavData {
        self.nav
    }

    pub fn auth(&self) -> &Arc<AuthContext> {
        &self.auth
    }

    #[cfg(test)]
    pub fn view(&self) -> Option<&View> {
        self.view.as_ref()
    }

    pub fn view_mut(&mut self) -> Option<&mut View> {
        self.view.as_mut()
    }

    /// Go to `page`, replacing the payload with `data` (or an empty one).
    pub async fn navigate(&mut self, page: Page, data: Option<NavData>) -> NavOutcome {
        if self.auth.is_loading() {
            tracing::debug!(page = %page, "Navigation deferred while auth loads");
            return NavOutcome::Deferred;
        }

        let outcome = if page.is_protected() && self.auth.user().is_none() {
            self.page = Page::SignIn;
            self.nav = NavData::default();
            NavOutcome::Redirected {
                requested: page,
                to: Page::SignIn,
            }
        } else {
            self.page = page;
            self.nav = data.unwrap_or_default();
            NavOutcome::Arrived(page)
        };

        tracing::debug!(page = %self.page, outcome = ?outcome, "Navigated");
        self.mount().await;
        outcome
    }

    /// Follow a navigation request returned by a page, if any.
    pub async fn follow(&mut self, navigation: Option<Navigation>) -> Option<NavOutcome> {
        let navigation = navigation?;
        Some(self.navigate(navigation.page, navigation.data).await)
    }

    /// React to an auth state change.
    ///
    /// Mounts the first view once loading ends, sends a signed-out user
    /// away from a protected page, and hands a new user to the dashboard.
    pub async fn sync_auth(&mut self) -> Option<NavOutcome> {
        if self.auth.is_loading() {
            return None;
        }

        let user = self.auth.user();
        let user_id = user.as_ref().map(|u| u.id);
        if self.view.is_none() {
            return Some(self.navigate(self.page, Some(self.nav)).await);
        }
        if user_id == self.seen_user {
            return None;
        }

        if self.page.is_protected() && user.is_none() {
            tracing::info!(page = %self.page, "Signed out on a protected page");
            return Some(self.navigate(self.page, None).await);
        }

        self.seen_user = user_id;
        if let Some(View::Dashboard(page)) = self.view.as_mut() {
            page.set_user(user).await;
        }
        None
    }

    /// Sign out from the layout.
    ///
    /// A backend failure is logged and does not navigate home, but the
    /// local session is gone either way, so a protected page still
    /// redirects to sign-in.
    pub async fn sign_out(&mut self) -> Option<NavOutcome> {
        if let Err(e) = self.auth.sign_out().await {
            tracing::error!(error = %e, "Error signing out");
            return self.sync_auth().await;
        }
        Some(self.navigate(Page::Home, None).await)
    }

    /// The layout around the current page; the editor has none.
    pub fn layout(&self) -> Option<Layout> {
        if self.page == Page::Editor {
            return None;
        }
        Some(Layout::new(&self.auth.snapshot(), self.page.nav_item()))
    }

    async fn mount(&mut self) {
        // invalidate the old view before building the next one
        self.view = None;
        let token = self.mounts.mount();
        let user = self.auth.user();
        self.seen_user = user.as_ref().map(|u| u.id);
        let state = &self.state;

        let mut view = match self.page {
            Page::Home => View::Home(HomePage::new(state.posts.clone(), token)),
            Page::SignIn => View::SignIn(SignInPage::new(self.auth.clone())),
            Page::SignUp => View::SignUp(SignUpPage::new(self.auth.clone())),
            Page::Dashboard => View::Dashboard(DashboardPage::new(
                state.blogs.clone(),
                state.posts.clone(),
                user,
                token,
            )),
            Page::Editor => View::Editor(EditorPage::new(
                state.posts.clone(),
                user,
                self.nav.blog_id,
                self.nav.post_id,
                token,
            )),
            Page::Post => View::Post(PostViewPage::new(
                state.posts.clone(),
                state.blogs.clone(),
                state.profiles.clone(),
                self.nav.blog_id,
                self.nav.post_id,
                token,
            )),
            Page::Profile => View::Profile(ProfilePage::new(
                state.profiles.clone(),
                self.auth.clone(),
                token,
            )),
        };
        view.load().await;
        self.view = Some(view);
    }

    /// Render the current screen. The editor is shown without the layout.
    pub fn render(&self) -> String {
        let Some(view) = self.view.as_ref().filter(|_| !self.auth.is_loading()) else {
            return "Loading...\n".to_string();
        };

        let body = view.to_string();
        match self.layout() {
            Some(layout) => layout.wrap(&body),
            None => body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use blogspace_core::domain::{Session, SignUpOutcome};
    use blogspace_core::ports::{AuthChangeHandler, AuthError, AuthService, SubscriptionId};
    use blogspace_infra::InMemoryAuthService;
    use crate::layout::Link;
    use std::time::Duration;

    /// Auth service whose logout request fails after the local session
    /// has been cleared.
    struct FailingLogout(Arc<InMemoryAuthService>);

    #[async_trait]
    impl AuthService for FailingLogout {
        async fn get_session(&self) -> Result<Option<Session>, AuthError> {
            self.0.get_session().await
        }

        async fn sign_in_with_password(
            &self,
            email: &str,
            password: &str,
        ) -> Result<Session, AuthError> {
            self.0.sign_in_with_password(email, password).await
        }

        async fn sign_up(
            &self,
            email: &str,
            password: &str,
            display_name: &str,
        ) -> Result<SignUpOutcome, AuthError> {
            self.0.sign_up(email, password, display_name).await
        }

        async fn sign_out(&self) -> Result<(), AuthError> {
            self.0.sign_out().await?;
            Err(AuthError::Backend("logout request failed".to_string()))
        }

        async fn on_auth_state_change(
            &self,
            handler: AuthChangeHandler,
        ) -> Result<SubscriptionId, AuthError> {
            self.0.on_auth_state_change(handler).await
        }

        async fn unsubscribe(&self, id: SubscriptionId) {
            self.0.unsubscribe(id).await
        }
    }

    async fn started() -> (App, Arc<InMemoryAuthService>) {
        let (state, auth) = AppState::in_memory();
        let ctx = Arc::new(AuthContext::new(state.auth.clone(), state.profiles.clone()));
        ctx.start().await.unwrap();
        let mut app = App::new(state, ctx);
        app.sync_auth().await;
        (app, auth)
    }

    async fn signed_in() -> (App, Arc<InMemoryAuthService>) {
        let (app, auth) = started().await;
        app.auth()
            .sign_up("ada@example.com", "secret1", "Ada")
            .await
            .unwrap();
        (app, auth)
    }

    fn dashboard(app: &mut App) -> &mut DashboardPage {
        match app.view_mut() {
            Some(View::Dashboard(page)) => page,
            _ => panic!("dashboard is not mounted"),
        }
    }

    fn editor(app: &mut App) -> &mut EditorPage {
        match app.view_mut() {
            Some(View::Editor(page)) => page,
            _ => panic!("editor is not mounted"),
        }
    }

    fn home(app: &App) -> &HomePage {
        match app.view() {
            Some(View::Home(page)) => page,
            _ => panic!("home is not mounted"),
        }
    }

    #[test]
    fn test_page_names() {
        assert_eq!("SignIn".parse::<Page>().unwrap(), Page::SignIn);
        assert_eq!(Page::Post.to_string(), "post");
        assert!("settings".parse::<Page>().is_err());
        assert!(Page::Profile.is_protected());
        assert!(!Page::Post.is_protected());
    }

    #[tokio::test]
    async fn test_navigation_deferred_while_loading() {
        let (state, _) = AppState::in_memory();
        let ctx = Arc::new(AuthContext::new(state.auth.clone(), state.profiles.clone()));
        let mut app = App::new(state, ctx);

        assert_eq!(app.navigate(Page::SignUp, None).await, NavOutcome::Deferred);
        assert_eq!(app.page(), Page::Home);
        assert_eq!(app.render(), "Loading...\n");
        assert!(app.sync_auth().await.is_none());
    }

    #[tokio::test]
    async fn test_dashboard_while_signed_out_lands_on_sign_in() {
        let (mut app, _) = started().await;
        let data = NavData {
            blog_id: Some(Uuid::new_v4()),
            post_id: None,
        };

        let outcome = app.navigate(Page::Dashboard, Some(data)).await;
        assert_eq!(
            outcome,
            NavOutcome::Redirected {
                requested: Page::Dashboard,
                to: Page::SignIn
            }
        );
        assert_eq!(app.page(), Page::SignIn);
        assert_eq!(app.nav_data(), NavData::default());
        assert!(matches!(app.view(), Some(View::SignIn(_))));
    }

    #[tokio::test]
    async fn test_payload_does_not_leak() {
        let (mut app, _) = signed_in().await;
        let data = NavData {
            blog_id: Some(Uuid::new_v4()),
            post_id: Some(Uuid::new_v4()),
        };

        app.navigate(Page::Editor, Some(data)).await;
        assert_eq!(app.nav_data(), data);

        app.navigate(Page::Home, None).await;
        assert_eq!(app.nav_data(), NavData::default());
    }

    #[tokio::test]
    async fn test_layout_wraps_all_but_editor() {
        let (mut app, _) = signed_in().await;
        app.navigate(Page::Home, None).await;
        assert!(app.render().contains("© 2025 BlogSpace"));

        app.navigate(Page::Editor, None).await;
        assert!(!app.render().contains("© 2025 BlogSpace"));
    }

    #[tokio::test]
    async fn test_sign_out_goes_home() {
        let (mut app, _) = signed_in().await;
        app.navigate(Page::Dashboard, None).await;

        assert_eq!(app.sign_out().await, Some(NavOutcome::Arrived(Page::Home)));
        assert!(app.auth().user().is_none());
        assert!(app.render().contains("Get Started"));
    }

    #[tokio::test]
    async fn test_failed_sign_out_still_leaves_protected_page() {
        let (state, auth) = AppState::in_memory();
        let state = AppState {
            auth: Arc::new(FailingLogout(auth)),
            ..state
        };
        let ctx = Arc::new(AuthContext::new(state.auth.clone(), state.profiles.clone()));
        ctx.start().await.unwrap();
        ctx.sign_up("ada@example.com", "secret1", "Ada").await.unwrap();

        let mut app = App::new(state, ctx);
        app.sync_auth().await;
        app.navigate(Page::Dashboard, None).await;
        assert!(matches!(app.view(), Some(View::Dashboard(_))));

        let outcome = app.sign_out().await;

        assert_eq!(
            outcome,
            Some(NavOutcome::Redirected {
                requested: Page::Dashboard,
                to: Page::SignIn
            })
        );
        assert!(app.auth().user().is_none());
        assert_eq!(app.page(), Page::SignIn);
        assert!(matches!(app.view(), Some(View::SignIn(_))));
    }

    #[tokio::test]
    async fn test_failed_sign_out_stays_on_public_page() {
        let (state, auth) = AppState::in_memory();
        let state = AppState {
            auth: Arc::new(FailingLogout(auth)),
            ..state
        };
        let ctx = Arc::new(AuthContext::new(state.auth.clone(), state.profiles.clone()));
        ctx.start().await.unwrap();
        ctx.sign_up("ada@example.com", "secret1", "Ada").await.unwrap();

        let mut app = App::new(state, ctx);
        app.sync_auth().await;
        app.navigate(Page::Post, None).await;

        assert!(app.sign_out().await.is_none());
        assert_eq!(app.page(), Page::Post);
        assert!(app.auth().user().is_none());
    }

    #[tokio::test]
    async fn test_layout_links_follow_targets() {
        let (mut app, _) = signed_in().await;
        app.navigate(Page::Dashboard, None).await;

        let layout = app.layout().unwrap();
        let targets: Vec<_> = layout.links().iter().map(|l| l.target).collect();
        assert_eq!(
            targets,
            [
                Link::Go(Page::Home),
                Link::Go(Page::Dashboard),
                Link::Go(Page::Profile),
                Link::SignOut
            ]
        );

        app.navigate(Page::Editor, None).await;
        assert!(app.layout().is_none());
    }

    #[tokio::test]
    async fn test_external_sign_out_leaves_protected_page() {
        let (mut app, auth) = signed_in().await;
        app.navigate(Page::Dashboard, None).await;

        let mut rx = app.auth().watch();
        auth.revoke().await;
        tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|s| s.user.is_none()))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(
            app.sync_auth().await,
            Some(NavOutcome::Redirected {
                requested: Page::Dashboard,
                to: Page::SignIn
            })
        );
    }

    #[tokio::test]
    async fn test_blog_to_home_feed_scenario() {
        let (mut app, _) = signed_in().await;
        app.navigate(Page::Dashboard, None).await;

        let page = dashboard(&mut app);
        assert!(page.create_blog("Daily Notes", "Notes, daily").await);
        assert_eq!(page.selected_blog().unwrap().slug, "daily-notes");
        let nav = page.new_post();
        assert_eq!(app.follow(nav).await, Some(NavOutcome::Arrived(Page::Editor)));

        let content = "a".repeat(300);
        let page = editor(&mut app);
        page.set_title("First!");
        page.set_content(content.clone());
        page.save().await;
        assert!(page.error.is_none());
        let post_id = page.post_id().unwrap();
        let nav = Some(page.back());
        app.follow(nav).await;

        let page = dashboard(&mut app);
        let stored = page.posts.iter().find(|p| p.id == post_id).unwrap().clone();
        assert_eq!(stored.slug, "first");
        assert_eq!(stored.excerpt, content[..200]);
        page.toggle_publish(post_id).await;
        assert!(page.posts[0].published);
        assert!(page.posts[0].published_at.is_some());

        app.navigate(Page::Home, None).await;
        assert_eq!(home(&app).recent[0].post.id, post_id);

        app.navigate(Page::Dashboard, None).await;
        let page = dashboard(&mut app);
        page.toggle_publish(post_id).await;
        assert!(page.posts[0].published_at.is_none());

        app.navigate(Page::Home, None).await;
        assert!(home(&app).recent.iter().all(|r| r.post.id != post_id));
    }
}
