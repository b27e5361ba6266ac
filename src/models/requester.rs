//! Requester identity and roles.
//!
//! Authentication itself is owned by an upstream layer; the core only
//! sees a resolved identity and role.

use uuid::Uuid;

/// Role attached to a requester's identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// No role assigned (including anonymous requesters).
    None,
    /// Regular authenticated account. May create content and manage
    /// its own items.
    Author,
    /// May manage all content.
    Editor,
    /// May manage all content.
    Admin,
}

impl Role {
    /// Parse a role name, defaulting to `None` for anything unknown.
    pub fn parse(s: &str) -> Self {
        match s {
            "author" => Role::Author,
            "editor" => Role::Editor,
            "admin" => Role::Admin,
            _ => Role::None,
        }
    }
}

/// A resolved requester: identity plus role.
#[derive(Debug, Clone, Copy)]
pub struct Requester {
    /// User ID, or None for anonymous requesters.
    pub id: Option<Uuid>,
    pub role: Role,
}

impl Requester {
    /// An unauthenticated requester.
    pub fn anonymous() -> Self {
        Self {
            id: None,
            role: Role::None,
        }
    }

    /// An authenticated requester.
    pub fn user(id: Uuid, role: Role) -> Self {
        Self { id: Some(id), role }
    }

    pub fn is_authenticated(&self) -> bool {
        self.id.is_some()
    }

    /// Whether this requester holds a content-management role.
    pub fn is_staff(&self) -> bool {
        matches!(self.role, Role::Editor | Role::Admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parsing_defaults_to_none() {
        assert_eq!(Role::parse("admin"), Role::Admin);
        assert_eq!(Role::parse("editor"), Role::Editor);
        assert_eq!(Role::parse("author"), Role::Author);
        assert_eq!(Role::parse("superuser"), Role::None);
        assert_eq!(Role::parse(""), Role::None);
    }

    #[test]
    fn staff_roles() {
        assert!(Requester::user(Uuid::now_v7(), Role::Admin).is_staff());
        assert!(Requester::user(Uuid::now_v7(), Role::Editor).is_staff());
        assert!(!Requester::user(Uuid::now_v7(), Role::Author).is_staff());
        assert!(!Requester::anonymous().is_staff());
    }
}
