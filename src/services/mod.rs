//! Core services: slug allocation, publication policy, preview tokens,
//! recommendations, content CRUD, and regeneration notification.

pub mod content;
pub mod notify;
pub mod policy;
pub mod preview;
pub mod recommend;
pub mod slug;

pub use content::{ContentService, ItemSaved};
pub use notify::RegenerationNotifier;
pub use preview::PreviewTokenStore;
pub use recommend::RecommendationMatcher;
