use serde::Deserialize;

use crate::Identity;

const UNKNOWN_FIRST_NAME: &str = "Unknown";

#[derive(Deserialize)]
pub struct ClerkUser {
    id: String,
    first_name: Option<String>,
    last_name: Option<String>,
    #[serde(default)]
    email_addresses: Vec<ClerkEmailAddress>,
}

#[derive(Deserialize)]
pub struct ClerkEmailAddress {
    email_address: String,
}

impl ClerkUser {
    pub fn into_identity(self) -> Identity {
        let name = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(UNKNOWN_FIRST_NAME),
            self.last_name.as_deref().unwrap_or_default()
        );
        let email = self
            .email_addresses
            .first()
            .map(|email| email.email_address.as_str());

        Identity::new(&self.id, email, &name)
    }
}
