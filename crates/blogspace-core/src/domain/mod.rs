//! Domain records - the rows BlogSpace reads from and writes to the backend.

mod blog;
mod post;
mod profile;
mod session;
mod text;

pub use blog::{Blog, NewBlog};
pub use post::{NewPost, Post, PostChanges, PostWithBlog, PublishChange};
pub use profile::{Profile, ProfileChanges};
pub use session::{AuthEvent, AuthUser, Session, SignUpOutcome};
pub use text::{auto_excerpt, card_excerpt, post_slug, slugify, strip_tags};

use serde::{Deserialize, Deserializer};

/// Text columns the backend may return as `null`; read them as empty.
pub(crate) fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
