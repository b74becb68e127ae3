use uuid::Uuid;

use crate::domain::{
    Announcement, Application, Event, EventVisibility, Proposal, Role, TargetAudience, User,
};

/// Who, besides the owner and the top administrative role, may see an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Audience<'a> {
    Everyone,
    Role(Role),
    /// Club-affiliated users of any of these clubs.
    ClubMembers(&'a [Uuid]),
    /// Any user whose club is one of these.
    SelectedClubs(&'a [Uuid]),
    /// The HiCom of this club.
    ClubLeaders(Uuid),
    OwnerOnly,
}

pub trait Visible {
    fn owner_id(&self) -> Uuid;
    fn audience(&self) -> Audience<'_>;
}

impl<'a> From<&'a TargetAudience> for Audience<'a> {
    fn from(target: &'a TargetAudience) -> Self {
        match target {
            TargetAudience::All => Audience::Everyone,
            TargetAudience::Role { role } => Audience::Role(*role),
            TargetAudience::ClubMembers { club_ids } => Audience::ClubMembers(club_ids),
            TargetAudience::SelectedClubs { club_ids } => Audience::SelectedClubs(club_ids),
        }
    }
}

impl Visible for Announcement {
    fn owner_id(&self) -> Uuid {
        self.author.id
    }

    fn audience(&self) -> Audience<'_> {
        Audience::from(&self.target)
    }
}

impl Visible for Proposal {
    fn owner_id(&self) -> Uuid {
        self.submitted_by.id
    }

    fn audience(&self) -> Audience<'_> {
        Audience::OwnerOnly
    }
}

impl Visible for Event {
    fn owner_id(&self) -> Uuid {
        self.organizer.id
    }

    fn audience(&self) -> Audience<'_> {
        match (self.visibility, &self.club_id) {
            (EventVisibility::Public, _) => Audience::Everyone,
            (EventVisibility::Private, Some(club_id)) => {
                Audience::ClubMembers(std::slice::from_ref(club_id))
            }
            // Org-wide private events are for every signed-in member
            (EventVisibility::Private, None) => Audience::Everyone,
        }
    }
}

impl Visible for Application {
    fn owner_id(&self) -> Uuid {
        self.applicant.id
    }

    fn audience(&self) -> Audience<'_> {
        Audience::ClubLeaders(self.club_id)
    }
}

pub fn is_visible<T: Visible + ?Sized>(entity: &T, user: &User) -> bool {
    if entity.owner_id() == user.id || user.role.is_top_admin() {
        return true;
    }

    let club = user.club_id();
    match entity.audience() {
        Audience::Everyone => true,
        Audience::Role(role) => role == user.role,
        Audience::ClubMembers(ids) => {
            user.role.is_club_affiliated() && club.map_or(false, |c| ids.contains(&c))
        }
        Audience::SelectedClubs(ids) => club.map_or(false, |c| ids.contains(&c)),
        Audience::ClubLeaders(id) => user.role == Role::ClubHicom && club == Some(id),
        Audience::OwnerOnly => false,
    }
}

/// The visible subset of `items`, in their original order.
pub fn filter_visible<T: Visible + Clone>(items: &[T], user: &User) -> Vec<T> {
    items
        .iter()
        .filter(|item| is_visible(*item, user))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AuthorRef, ClubAffiliation};
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

    fn announcement(author: &User, target: TargetAudience) -> Announcement {
        Announcement {
            id: Uuid::new_v4(),
            title: "Notice".to_string(),
            content: "Body".to_string(),
            author: author.author_ref(),
            target,
            important: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_author_always_sees_own_announcement() {
        let club = Uuid::new_v4();
        let targets = vec![
            TargetAudience::All,
            TargetAudience::Role { role: Role::PpmkBiro },
            TargetAudience::ClubMembers { club_ids: vec![club] },
            TargetAudience::SelectedClubs { club_ids: vec![Uuid::new_v4()] },
        ];

        for role in Role::ALL {
            let author = user(role, None);
            for target in &targets {
                assert!(is_visible(&announcement(&author, target.clone()), &author));
            }
        }
    }

    #[test]
    fn test_top_admin_sees_everything() {
        let author = user(Role::ClubHicom, Some(Uuid::new_v4()));
        let admin = user(Role::PpmkHicom, None);
        let a = announcement(
            &author,
            TargetAudience::ClubMembers { club_ids: vec![Uuid::new_v4()] },
        );
        assert!(is_visible(&a, &admin));
    }

    #[test]
    fn test_role_target_matches_exactly() {
        let author = user(Role::PpmkHicom, None);
        let a = announcement(&author, TargetAudience::Role { role: Role::ClubHicom });

        assert!(is_visible(&a, &user(Role::ClubHicom, Some(Uuid::new_v4()))));
        assert!(!is_visible(&a, &user(Role::ClubMember, Some(Uuid::new_v4()))));
        assert!(!is_visible(&a, &user(Role::PpmkBiro, None)));
    }

    #[test]
    fn test_club_members_requires_affiliated_role() {
        let club = Uuid::new_v4();
        let author = user(Role::ClubHicom, Some(club));
        let a = announcement(&author, TargetAudience::ClubMembers { club_ids: vec![club] });

        assert!(is_visible(&a, &user(Role::ClubMember, Some(club))));
        assert!(!is_visible(&a, &user(Role::ClubMember, Some(Uuid::new_v4()))));
        // A non-club role carrying the club id still does not qualify
        assert!(!is_visible(&a, &user(Role::PpmkBiro, Some(club))));
        assert!(!is_visible(&a, &user(Role::PpmkMember, None)));
    }

    #[test]
    fn test_selected_clubs_ignores_role() {
        let club = Uuid::new_v4();
        let author = user(Role::PpmkHicom, None);
        let a = announcement(&author, TargetAudience::SelectedClubs { club_ids: vec![club] });

        assert!(is_visible(&a, &user(Role::PpmkBiro, Some(club))));
        assert!(is_visible(&a, &user(Role::ClubMember, Some(club))));
        assert!(!is_visible(&a, &user(Role::PpmkMember, None)));
    }

    #[test]
    fn test_private_club_event() {
        let club = Uuid::new_v4();
        let organizer = user(Role::ClubHicom, Some(club));
        let event = Event {
            id: Uuid::new_v4(),
            title: "AGM".to_string(),
            description: String::new(),
            starts_at: Utc::now(),
            location: "Hall".to_string(),
            event_type: crate::domain::EventType::Meeting,
            max_attendees: None,
            visibility: EventVisibility::Private,
            organizer: organizer.author_ref(),
            club_id: Some(club),
            rsvps: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(is_visible(&event, &user(Role::ClubMember, Some(club))));
        assert!(!is_visible(&event, &user(Role::PpmkMember, None)));

        let public = Event { visibility: EventVisibility::Public, ..event };
        assert!(is_visible(&public, &user(Role::PpmkMember, None)));
    }

    #[test]
    fn test_filter_keeps_order() {
        let club = Uuid::new_v4();
        let author = user(Role::PpmkHicom, None);
        let items = vec![
            announcement(&author, TargetAudience::All),
            announcement(&author, TargetAudience::SelectedClubs { club_ids: vec![Uuid::new_v4()] }),
            announcement(&author, TargetAudience::SelectedClubs { club_ids: vec![club] }),
        ];
        let viewer = user(Role::ClubMember, Some(club));

        let visible = filter_visible(&items, &viewer);
        assert_eq!(visible.len(), 2);
        assert_eq!(visible[0].id, items[0].id);
        assert_eq!(visible[1].id, items[2].id);
    }

    #[test]
    fn test_application_visible_to_own_club_hicom() {
        let club = Uuid::new_v4();
        let applicant = user(Role::PpmkMember, None);
        let application = Application {
            id: Uuid::new_v4(),
            applicant: AuthorRef {
                id: applicant.id,
                name: applicant.name.clone(),
                role: applicant.role,
            },
            applicant_email: applicant.email.clone(),
            club_id: club,
            motivation: "Keen".to_string(),
            experience: None,
            skills: vec![],
            status: crate::domain::ApplicationStatus::Pending,
            feedback: None,
            submitted_at: Utc::now(),
            reviewed_at: None,
            reviewed_by: None,
        };

        assert!(is_visible(&application, &applicant));
        assert!(is_visible(&application, &user(Role::ClubHicom, Some(club))));
        assert!(!is_visible(&application, &user(Role::ClubMember, Some(club))));
        assert!(!is_visible(&application, &user(Role::ClubHicom, Some(Uuid::new_v4()))));
    }
}
