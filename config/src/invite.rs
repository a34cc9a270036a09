use serde::Deserialize;

#[derive(Deserialize)]
pub struct InviteConfig {
    product_name: String,
    dashboard_url: String,
}

impl InviteConfig {
    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn dashboard_url(&self) -> &str {
        &self.dashboard_url
    }
}
