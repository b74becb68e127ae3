use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Identified;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Club {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub description: String,
    pub member_count: u32,
    pub hicom_name: String,
    pub hicom_email: String,
    #[serde(default)]
    pub activities: Vec<String>,
    #[serde(default)]
    pub requirements: Vec<String>,
}

impl Identified for Club {
    fn id(&self) -> Uuid {
        self.id
    }
}
