use serde::{Deserialize, Serialize};

/// What the page header shows about the signed-in user.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UserProfile {
    pub email: String,
    pub display_name: Option<String>,
}

impl UserProfile {
    pub fn name(&self) -> String {
        match &self.display_name {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => self.email.split('@').next().unwrap_or("User").to_string(),
        }
    }

    pub fn initials(&self) -> String {
        let initials: String = self
            .name()
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .take(2)
            .collect::<String>()
            .to_uppercase();

        if initials.is_empty() {
            "U".to_string()
        } else {
            initials
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_email_local_part() {
        let user = UserProfile {
            email: "jdoe@example.com".to_string(),
            display_name: None,
        };
        assert_eq!(user.name(), "jdoe");
        assert_eq!(user.initials(), "J");
    }

    #[test]
    fn initials_from_display_name() {
        let user = UserProfile {
            email: "a@example.com".to_string(),
            display_name: Some("Ada Lovelace".to_string()),
        };
        assert_eq!(user.initials(), "AL");
    }
}
