//! Fixtures shared by page tests.

use chrono::Utc;
use uuid::Uuid;

use blogspace_core::domain::{AuthUser, Blog, NewBlog, NewPost, Post, PublishChange, SignUpOutcome};

use crate::state::AppState;

pub(crate) struct Author {
    pub user: AuthUser,
    pub blog: Blog,
}

/// Create an account with one blog. Leaves the account signed in.
pub(crate) async fn seed_author(state: &AppState) -> Author {
    let email = format!("{}@example.com", Uuid::new_v4().simple());
    let SignUpOutcome::SignedIn(session) = state
        .auth
        .sign_up(&email, "secret1", "Ada Lovelace")
        .await
        .unwrap()
    else {
        panic!("in-memory sign-up always opens a session");
    };

    let blog = state
        .blogs
        .insert(NewBlog::new(session.user.id, "Daily Notes", "Notes, daily"))
        .await
        .unwrap();

    Author {
        user: session.user,
        blog,
    }
}

pub(crate) async fn draft(state: &AppState, author: &Author, title: &str) -> Post {
    state
        .posts
        .insert(NewPost::from_draft(
            author.blog.id,
            author.user.id,
            title,
            "Some content",
            "",
        ))
        .await
        .unwrap()
}

pub(crate) async fn publish(state: &AppState, author: &Author, title: &str) -> Post {
    let post = draft(state, author, title).await;
    state
        .posts
        .set_published(post.id, PublishChange::set(true, Utc::now()))
        .await
        .unwrap()
}
