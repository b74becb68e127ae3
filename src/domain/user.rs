use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Identified;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    PpmkMember,
    ClubMember,
    ClubHicom,
    PpmkBiro,
    PpmkHicom,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::PpmkMember,
        Role::ClubMember,
        Role::ClubHicom,
        Role::PpmkBiro,
        Role::PpmkHicom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::PpmkMember => "ppmk_member",
            Role::ClubMember => "club_member",
            Role::ClubHicom => "club_hicom",
            Role::PpmkBiro => "ppmk_biro",
            Role::PpmkHicom => "ppmk_hicom",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "ppmk_member" => Some(Role::PpmkMember),
            "club_member" => Some(Role::ClubMember),
            "club_hicom" => Some(Role::ClubHicom),
            "ppmk_biro" => Some(Role::PpmkBiro),
            "ppmk_hicom" => Some(Role::PpmkHicom),
            _ => None,
        }
    }

    /// Roles that belong to a specific club.
    pub fn is_club_affiliated(&self) -> bool {
        matches!(self, Role::ClubMember | Role::ClubHicom)
    }

    /// The organization-wide administrative role. It sees everything and
    /// may edit or delete anything.
    pub fn is_top_admin(&self) -> bool {
        matches!(self, Role::PpmkHicom)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClubAffiliation {
    pub club_id: Uuid,
    pub club_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub club: Option<ClubAffiliation>,
}

impl User {
    pub fn club_id(&self) -> Option<Uuid> {
        self.club.as_ref().map(|c| c.club_id)
    }

    pub fn belongs_to(&self, club_id: Uuid) -> bool {
        self.club_id() == Some(club_id)
    }

    pub fn author_ref(&self) -> AuthorRef {
        AuthorRef {
            id: self.id,
            name: self.name.clone(),
            role: self.role,
        }
    }
}

impl Identified for User {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// Denormalized identity of whoever authored, submitted or organized an entity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthorRef {
    pub id: Uuid,
    pub name: String,
    pub role: Role,
}
