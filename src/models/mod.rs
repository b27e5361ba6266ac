//! Data models.

mod content;
mod requester;

pub use content::{
    ContentItem, ContentPreview, CreateContent, PublicStats, RecentContent, UpdateContent,
};
pub use requester::{Requester, Role};
