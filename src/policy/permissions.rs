use uuid::Uuid;

use crate::{
    domain::{Announcement, Application, Event, Proposal, Role, TargetAudience, User},
    error::{AppError, Result},
    policy::visibility::{is_visible, Visible},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Edit,
    Delete,
    /// Proposal review, or approving/rejecting an application.
    Review,
    /// Submitting a club application.
    Apply,
    Rsvp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Announcement,
    Proposal,
    Event,
    Application,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Announcement => "announcement",
            EntityKind::Proposal => "proposal",
            EntityKind::Event => "event",
            EntityKind::Application => "application",
        }
    }
}

/// What a permission check is about: a kind (for creation) or a concrete entity.
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    Kind(EntityKind),
    Announcement(&'a Announcement),
    Proposal(&'a Proposal),
    Event(&'a Event),
    Application(&'a Application),
}

impl Target<'_> {
    fn kind(&self) -> EntityKind {
        match self {
            Target::Kind(kind) => *kind,
            Target::Announcement(_) => EntityKind::Announcement,
            Target::Proposal(_) => EntityKind::Proposal,
            Target::Event(_) => EntityKind::Event,
            Target::Application(_) => EntityKind::Application,
        }
    }

    fn owner_id(&self) -> Option<Uuid> {
        match self {
            Target::Kind(_) => None,
            Target::Announcement(a) => Some(a.owner_id()),
            Target::Proposal(p) => Some(p.owner_id()),
            Target::Event(e) => Some(e.owner_id()),
            Target::Application(a) => Some(a.owner_id()),
        }
    }
}

/// How far an announcement created by a role may reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnouncementScope {
    None,
    /// Club-targeted announcements for the author's own club.
    OwnClub,
    /// Everyone, or a single role.
    Organization,
    Any,
}

/// What a role may do regardless of which entity it touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleCapabilities {
    pub announcements: AnnouncementScope,
    pub create_proposal: bool,
    pub review_proposal: bool,
    pub create_event: bool,
    /// Club-scoped events only.
    pub own_club_events_only: bool,
    /// Applications to the reviewer's own club only.
    pub review_application: bool,
    pub apply: bool,
}

const CAPABILITIES: [(Role, RoleCapabilities); 5] = [
    (
        Role::PpmkMember,
        RoleCapabilities {
            announcements: AnnouncementScope::None,
            create_proposal: false,
            review_proposal: false,
            create_event: false,
            own_club_events_only: false,
            review_application: false,
            apply: true,
        },
    ),
    (
        Role::ClubMember,
        RoleCapabilities {
            announcements: AnnouncementScope::None,
            create_proposal: false,
            review_proposal: false,
            create_event: false,
            own_club_events_only: false,
            review_application: false,
            apply: true,
        },
    ),
    (
        Role::ClubHicom,
        RoleCapabilities {
            announcements: AnnouncementScope::OwnClub,
            create_proposal: true,
            review_proposal: false,
            create_event: true,
            own_club_events_only: true,
            review_application: true,
            apply: false,
        },
    ),
    (
        Role::PpmkBiro,
        RoleCapabilities {
            announcements: AnnouncementScope::Organization,
            create_proposal: false,
            review_proposal: false,
            create_event: true,
            own_club_events_only: false,
            review_application: false,
            apply: false,
        },
    ),
    (
        Role::PpmkHicom,
        RoleCapabilities {
            announcements: AnnouncementScope::Any,
            create_proposal: false,
            review_proposal: true,
            create_event: true,
            own_club_events_only: false,
            review_application: false,
            apply: false,
        },
    ),
];

impl Role {
    pub fn capabilities(&self) -> RoleCapabilities {
        CAPABILITIES
            .iter()
            .find(|(role, _)| role == self)
            .map(|(_, caps)| *caps)
            .unwrap_or(CAPABILITIES[0].1)
    }
}

pub fn can_perform(action: Action, target: Target<'_>, user: &User) -> bool {
    let caps = user.role.capabilities();

    match (action, target) {
        (Action::Edit | Action::Delete, target) => match target.owner_id() {
            Some(owner) => owner == user.id || user.role.is_top_admin(),
            None => false,
        },

        (Action::Create, Target::Kind(EntityKind::Announcement)) => {
            caps.announcements != AnnouncementScope::None
        }
        (Action::Create, Target::Announcement(a)) => can_target(&a.target, user),
        (Action::Create, Target::Kind(EntityKind::Proposal)) => {
            caps.create_proposal && user.club_id().is_some()
        }
        (Action::Create, Target::Kind(EntityKind::Event)) => caps.create_event,
        (Action::Create, Target::Event(e)) => {
            caps.create_event
                && (!caps.own_club_events_only
                    || e.club_id.map_or(false, |club| user.belongs_to(club)))
        }

        (Action::Review, Target::Kind(EntityKind::Proposal)) | (Action::Review, Target::Proposal(_)) => {
            caps.review_proposal
        }
        (Action::Review, Target::Application(a)) => {
            caps.review_application && user.belongs_to(a.club_id)
        }

        (Action::Apply, Target::Kind(EntityKind::Application)) => caps.apply,
        (Action::Apply, Target::Application(a)) => {
            caps.apply && a.applicant.id == user.id && !user.belongs_to(a.club_id)
        }

        (Action::Rsvp, Target::Event(e)) => is_visible(e, user),

        _ => false,
    }
}

/// Whether `user` may address an announcement to `target`.
fn can_target(target: &TargetAudience, user: &User) -> bool {
    match user.role.capabilities().announcements {
        AnnouncementScope::None => false,
        AnnouncementScope::Any => true,
        AnnouncementScope::Organization => {
            matches!(target, TargetAudience::All | TargetAudience::Role { .. })
        }
        // An empty club list passes here and is rejected by validation
        AnnouncementScope::OwnClub => {
            target.is_club_scoped()
                && target.club_ids().iter().all(|club| user.belongs_to(*club))
        }
    }
}

/// Fails closed with `PermissionDenied` when `can_perform` says no.
pub fn ensure(action: Action, target: Target<'_>, user: &User) -> Result<()> {
    if can_perform(action, target, user) {
        return Ok(());
    }

    tracing::warn!(
        user_id = %user.id,
        role = user.role.as_str(),
        action = ?action,
        entity = target.kind().as_str(),
        "Permission denied"
    );
    Err(AppError::PermissionDenied(format!(
        "{} may not {:?} this {}",
        user.role.as_str(),
        action,
        target.kind().as_str()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AuthorRef, ClubAffiliation, ProposalStatus};
    use chrono::Utc;

    fn user(role: Role, club: Option<Uuid>) -> User {
        User {
            id: Uuid::new_v4(),
            email: format!("{}@ppmk.test", role.as_str()),
            name: role.as_str().to_string(),
            role,
            club: club.map(|club_id| ClubAffiliation {
                club_id,
                club_name: "Club".to_string(),
            }),
        }
    }

    fn proposal(author: &AuthorRef, club: Uuid) -> Proposal {
        Proposal {
            id: Uuid::new_v4(),
            title: "Budget".to_string(),
            description: "Description".to_string(),
            objectives: vec!["Grow".to_string()],
            budget: Some(100.0),
            timeline: "Q1".to_string(),
            club_id: club,
            club_name: "Club".to_string(),
            submitted_by: author.clone(),
            status: ProposalStatus::Pending,
            submitted_at: Utc::now(),
            reviewed_at: None,
            reviewed_by: None,
            feedback: None,
        }
    }

    #[test]
    fn test_edit_and_delete_owner_or_admin_only() {
        let club = Uuid::new_v4();
        let owner = user(Role::ClubHicom, Some(club));
        let p = proposal(&owner.author_ref(), club);

        for role in Role::ALL {
            let other = user(role, Some(club));
            let expected = role == Role::PpmkHicom;
            assert_eq!(can_perform(Action::Edit, Target::Proposal(&p), &other), expected);
            assert_eq!(can_perform(Action::Delete, Target::Proposal(&p), &other), expected);
        }
        assert!(can_perform(Action::Edit, Target::Proposal(&p), &owner));
        assert!(can_perform(Action::Delete, Target::Proposal(&p), &owner));
    }

    #[test]
    fn test_creation_matrix() {
        let club = Some(Uuid::new_v4());
        let expect = [
            (Role::PpmkMember, [false, false, false]),
            (Role::ClubMember, [false, false, false]),
            (Role::ClubHicom, [true, true, true]),
            (Role::PpmkBiro, [true, false, true]),
            (Role::PpmkHicom, [true, false, true]),
        ];

        for (role, [announcement, proposal, event]) in expect {
            let u = user(role, club);
            assert_eq!(
                can_perform(Action::Create, Target::Kind(EntityKind::Announcement), &u),
                announcement,
                "{:?} announcement",
                role
            );
            assert_eq!(
                can_perform(Action::Create, Target::Kind(EntityKind::Proposal), &u),
                proposal,
                "{:?} proposal",
                role
            );
            assert_eq!(
                can_perform(Action::Create, Target::Kind(EntityKind::Event), &u),
                event,
                "{:?} event",
                role
            );
        }
    }

    #[test]
    fn test_only_top_admin_reviews_proposals() {
        let club = Uuid::new_v4();
        let owner = user(Role::ClubHicom, Some(club));
        let p = proposal(&owner.author_ref(), club);

        for role in Role::ALL {
            assert_eq!(
                can_perform(Action::Review, Target::Proposal(&p), &user(role, Some(club))),
                role == Role::PpmkHicom
            );
        }
    }

    #[test]
    fn test_announcement_scopes() {
        let club = Uuid::new_v4();
        let hicom = user(Role::ClubHicom, Some(club));
        let biro = user(Role::PpmkBiro, None);

        let own = TargetAudience::ClubMembers { club_ids: vec![club] };
        let other = TargetAudience::SelectedClubs { club_ids: vec![club, Uuid::new_v4()] };
        let empty = TargetAudience::ClubMembers { club_ids: vec![] };

        assert!(can_target(&own, &hicom));
        assert!(can_target(&empty, &hicom));
        assert!(!can_target(&other, &hicom));
        assert!(!can_target(&TargetAudience::All, &hicom));

        assert!(can_target(&TargetAudience::All, &biro));
        assert!(can_target(&TargetAudience::Role { role: Role::ClubMember }, &biro));
        assert!(!can_target(&own, &biro));

        assert!(can_target(&other, &user(Role::PpmkHicom, None)));
        assert!(!can_target(&TargetAudience::All, &user(Role::ClubMember, Some(club))));
    }

    #[test]
    fn test_ensure_reports_denial() {
        let member = user(Role::PpmkMember, None);
        let err = ensure(Action::Create, Target::Kind(EntityKind::Event), &member).unwrap_err();
        assert!(matches!(err, AppError::PermissionDenied(_)));
    }
}
