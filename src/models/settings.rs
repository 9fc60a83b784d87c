use serde::{Deserialize, Serialize};

/// Company details shown on the dashboard, kept for the session only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub company_name: String,
    pub contact_email: String,
    pub phone_number: String,
    pub address: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            company_name: "GreenEstate Pro".to_string(),
            contact_email: "admin@greenestate.com".to_string(),
            phone_number: "+1 (555) 123-4567".to_string(),
            address: "123 Real Estate Ave, Suite 100, NY 10001".to_string(),
        }
    }
}
