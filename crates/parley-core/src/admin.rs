//! Process-wide administrator identity and the in-band `/admin` directive.

use std::sync::RwLock;

use parley_types::identity::Identity;

/// Directive that replaces the administrator when it is the first token of a body.
pub const ADMIN_DIRECTIVE: &str = "/admin";

/// Holds the current administrator identity.
///
/// Always holds exactly one value. Updates are a single last-write-wins
/// assignment, visible to every later read.
#[derive(Debug)]
pub struct AdminCell {
    current: RwLock<Identity>,
}

impl AdminCell {
    pub fn new(initial: Identity) -> Self {
        Self {
            current: RwLock::new(initial),
        }
    }

    /// Current administrator.
    pub fn get(&self) -> Identity {
        match self.current.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Replace the administrator, returning the previous one.
    pub fn set(&self, admin: Identity) -> Identity {
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        std::mem::replace(&mut *guard, admin)
    }
}

/// Extract the new admin from an `/admin <name>` body.
///
/// Returns `None` unless the first whitespace-delimited token is exactly the
/// directive and a second token follows. Further tokens are ignored.
pub fn parse_admin_directive(body: &str) -> Option<&str> {
    let mut tokens = body.split_whitespace();
    match (tokens.next(), tokens.next()) {
        (Some(ADMIN_DIRECTIVE), Some(name)) => Some(name),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_directive_with_name() {
        assert_eq!(parse_admin_directive("/admin carol"), Some("carol"));
        assert_eq!(parse_admin_directive("  /admin   @dave  extra words "), Some("@dave"));
    }

    #[test]
    fn rejects_partial_or_embedded_directives() {
        assert_eq!(parse_admin_directive("/admin"), None);
        assert_eq!(parse_admin_directive("/admin   "), None);
        assert_eq!(parse_admin_directive("hello /admin carol"), None);
        assert_eq!(parse_admin_directive("/administrator carol"), None);
        assert_eq!(parse_admin_directive(""), None);
    }

    #[test]
    fn cell_starts_with_fallback_and_updates() {
        let cell = AdminCell::new(Identity::from("@admin"));
        assert_eq!(cell.get().as_str(), "@admin");

        let previous = cell.set(Identity::from("carol"));
        assert_eq!(previous.as_str(), "@admin");
        assert_eq!(cell.get().as_str(), "carol");
    }

    #[test]
    fn independent_cells_do_not_share_state() {
        let a = AdminCell::new(Identity::from("@a"));
        let b = AdminCell::new(Identity::from("@b"));
        a.set(Identity::from("@z"));
        assert_eq!(b.get().as_str(), "@b");
    }
}
