//! Role names carried in access tokens.

/// Any back-office account.
pub const ADMIN: &str = "admin";
/// Accounts allowed to manage users and themes.
pub const SUPERADMIN: &str = "superadmin";

/// Roles granted to an account.
pub fn for_account(is_superadmin: bool) -> Vec<String> {
    let mut roles = vec![ADMIN.to_string()];
    if is_superadmin {
        roles.push(SUPERADMIN.to_string());
    }
    roles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn superadmins_are_also_admins() {
        assert_eq!(for_account(true), vec!["admin", "superadmin"]);
        assert_eq!(for_account(false), vec!["admin"]);
    }
}
