use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{AuthorRef, Identified, Role};
use crate::error::{AppError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Announcement {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author: AuthorRef,
    pub target: TargetAudience,
    #[serde(default)]
    pub important: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identified for Announcement {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// Who an announcement is addressed to.
///
/// A single club is expressed as `SelectedClubs` with one id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TargetAudience {
    All,
    Role { role: Role },
    ClubMembers {
        #[serde(default)]
        club_ids: Vec<Uuid>,
    },
    SelectedClubs {
        #[serde(default)]
        club_ids: Vec<Uuid>,
    },
}

impl TargetAudience {
    pub fn club_ids(&self) -> &[Uuid] {
        match self {
            TargetAudience::ClubMembers { club_ids } | TargetAudience::SelectedClubs { club_ids } => {
                club_ids
            }
            _ => &[],
        }
    }

    pub fn is_club_scoped(&self) -> bool {
        matches!(
            self,
            TargetAudience::ClubMembers { .. } | TargetAudience::SelectedClubs { .. }
        )
    }

    /// Club-scoped targets must name at least one club.
    pub fn validate(&self) -> Result<()> {
        if self.is_club_scoped() && self.club_ids().is_empty() {
            return Err(AppError::Validation(
                "Club-targeted announcements need at least one club".to_string(),
            ));
        }
        Ok(())
    }

    /// Collapses the older record layout, where the audience was spread over
    /// `targetAudience`, `targetRole`, `clubId` and `clubIds`, into one value.
    ///
    /// `targetAudience` wins when present. A bare club id in that field means
    /// that single club. A record with no audience fields at all was addressed
    /// to everyone. Returns `None` when the fields name nothing usable,
    /// including a club audience without any club.
    pub fn from_legacy(
        target_audience: Option<&str>,
        target_role: Option<&str>,
        club_id: Option<Uuid>,
        club_ids: &[Uuid],
    ) -> Option<Self> {
        let clubs = || {
            if club_ids.is_empty() {
                club_id.into_iter().collect()
            } else {
                club_ids.to_vec()
            }
        };

        if let Some(audience) = target_audience {
            return match audience {
                "all" => Some(TargetAudience::All),
                "club_members" => Some(TargetAudience::ClubMembers { club_ids: clubs() }),
                "selected_clubs" => Some(TargetAudience::SelectedClubs { club_ids: clubs() }),
                other => Role::from_str(other)
                    .map(|role| TargetAudience::Role { role })
                    .or_else(|| {
                        Uuid::parse_str(other)
                            .ok()
                            .map(|id| TargetAudience::SelectedClubs { club_ids: vec![id] })
                    }),
            }
            .filter(|target| target.validate().is_ok());
        }

        match (target_role, club_id) {
            (Some("all"), _) => Some(TargetAudience::All),
            (Some(role), _) => Role::from_str(role).map(|role| TargetAudience::Role { role }),
            (None, Some(id)) => Some(TargetAudience::SelectedClubs { club_ids: vec![id] }),
            (None, None) => Some(TargetAudience::All),
        }
    }
}

/// Announcement as written by older clients.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyAnnouncement {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
    pub author_name: String,
    pub author_role: Role,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub target_audience: Option<String>,
    #[serde(default)]
    pub target_role: Option<String>,
    #[serde(default)]
    pub club_id: Option<Uuid>,
    #[serde(default)]
    pub club_ids: Vec<Uuid>,
    #[serde(default)]
    pub important: bool,
}

impl LegacyAnnouncement {
    pub fn migrate(self) -> Option<Announcement> {
        let target = TargetAudience::from_legacy(
            self.target_audience.as_deref(),
            self.target_role.as_deref(),
            self.club_id,
            &self.club_ids,
        )?;

        Some(Announcement {
            id: self.id,
            title: self.title,
            content: self.content,
            author: AuthorRef {
                id: self.author_id,
                name: self.author_name,
                role: self.author_role,
            },
            target,
            important: self.important,
            created_at: self.created_at,
            updated_at: self.created_at,
        })
    }
}

/// One element of a stored announcement array, in either layout.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StoredAnnouncement {
    Current(Announcement),
    Legacy(LegacyAnnouncement),
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAnnouncementRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
    pub target: TargetAudience,
    #[serde(default)]
    pub important: bool,
}

#[derive(Debug, Clone, Deserialize, Default, Validate)]
pub struct UpdateAnnouncementRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: Option<String>,
    pub target: Option<TargetAudience>,
    pub important: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_club_targets_need_clubs() {
        assert!(TargetAudience::All.validate().is_ok());
        assert!(TargetAudience::ClubMembers { club_ids: vec![] }.validate().is_err());
        assert!(TargetAudience::SelectedClubs { club_ids: vec![] }.validate().is_err());
        assert!(TargetAudience::SelectedClubs { club_ids: vec![Uuid::new_v4()] }
            .validate()
            .is_ok());
    }

    #[test]
    fn test_legacy_target_audience_wins() {
        let club = Uuid::new_v4();
        assert_eq!(
            TargetAudience::from_legacy(Some("club_members"), Some("ppmk_member"), Some(club), &[]),
            Some(TargetAudience::ClubMembers { club_ids: vec![club] })
        );
        assert_eq!(
            TargetAudience::from_legacy(Some("club_hicom"), None, None, &[]),
            Some(TargetAudience::Role { role: Role::ClubHicom })
        );
    }

    #[test]
    fn test_legacy_bare_club_id() {
        let club = Uuid::new_v4();
        assert_eq!(
            TargetAudience::from_legacy(Some(&club.to_string()), None, None, &[]),
            Some(TargetAudience::SelectedClubs { club_ids: vec![club] })
        );
        assert_eq!(
            TargetAudience::from_legacy(None, None, Some(club), &[]),
            Some(TargetAudience::SelectedClubs { club_ids: vec![club] })
        );
    }

    #[test]
    fn test_legacy_role_fallback() {
        assert_eq!(
            TargetAudience::from_legacy(None, Some("all"), None, &[]),
            Some(TargetAudience::All)
        );
        assert_eq!(
            TargetAudience::from_legacy(None, Some("ppmk_biro"), Some(Uuid::new_v4()), &[]),
            Some(TargetAudience::Role { role: Role::PpmkBiro })
        );
        assert_eq!(TargetAudience::from_legacy(Some("nobody"), None, None, &[]), None);
        assert_eq!(
            TargetAudience::from_legacy(None, None, None, &[]),
            Some(TargetAudience::All)
        );
    }

    #[test]
    fn test_legacy_club_audience_without_clubs_is_dropped() {
        assert_eq!(TargetAudience::from_legacy(Some("club_members"), None, None, &[]), None);
        assert_eq!(TargetAudience::from_legacy(Some("selected_clubs"), None, None, &[]), None);
    }

    #[test]
    fn test_missing_club_ids_default_to_empty() {
        let target: TargetAudience = serde_json::from_str(r#"{"type":"club_members"}"#).unwrap();
        assert_eq!(target, TargetAudience::ClubMembers { club_ids: vec![] });
        assert!(target.validate().is_err());
    }

    #[test]
    fn test_target_wire_format() {
        let club = Uuid::new_v4();
        let json = serde_json::to_value(TargetAudience::ClubMembers { club_ids: vec![club] }).unwrap();
        assert_eq!(json["type"], "club_members");
        assert_eq!(json["club_ids"][0], club.to_string());
    }
}
