//! Well-known content category labels

pub const ASSETS: &str = "Assets";
pub const PAGES: &str = "Pages";
pub const PROFILE_PROPERTIES: &str = "ProfileProperties";
pub const ROLES: &str = "Roles";
pub const TEMPLATES: &str = "Templates";
pub const USERS: &str = "Users";
pub const VOCABULARIES: &str = "Vocabularies";
pub const WORKFLOWS: &str = "Workflows";

/// Categories that get a collection-count handler out of the box
pub const BUILT_IN: &[&str] = &[
    ASSETS,
    PAGES,
    PROFILE_PROPERTIES,
    ROLES,
    TEMPLATES,
    USERS,
    VOCABULARIES,
    WORKFLOWS,
];

/// Conventional collection name for a category (`ProfileProperties` ->
/// `profile_properties`)
pub fn default_collection(category: &str) -> String {
    let mut name = String::with_capacity(category.len() + 4);
    for (i, ch) in category.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                name.push('_');
            }
            name.extend(ch.to_lowercase());
        } else {
            name.push(ch);
        }
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_collection() {
        assert_eq!(default_collection(PAGES), "pages");
        assert_eq!(default_collection(PROFILE_PROPERTIES), "profile_properties");
        assert_eq!(default_collection("already_snake"), "already_snake");
    }
}
