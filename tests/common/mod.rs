#![allow(dead_code)]

use std::sync::Arc;

use clubhouse::{
    domain::{Club, ClubAffiliation, Role, User},
    repository::{InMemoryKeyValueRepository, KeyValueRepository},
    auth::AuthService,
    service::ServiceContext,
    store::EntityStore,
};
use uuid::Uuid;

pub const DEMO_PASSWORD: &str = "password123";

/// One user per role, plus a second club and its leader.
pub struct Directory {
    pub club: Club,
    pub other_club: Club,
    pub member: User,
    pub club_member: User,
    pub club_hicom: User,
    pub other_hicom: User,
    pub biro: User,
    pub president: User,
}

impl Directory {
    pub fn all_users(&self) -> Vec<User> {
        vec![
            self.member.clone(),
            self.club_member.clone(),
            self.club_hicom.clone(),
            self.other_hicom.clone(),
            self.biro.clone(),
            self.president.clone(),
        ]
    }
}

pub fn club(name: &str) -> Club {
    Club {
        id: Uuid::new_v4(),
        name: name.to_string(),
        category: "Technology".to_string(),
        description: format!("{} description", name),
        member_count: 0,
        hicom_name: "Leader".to_string(),
        hicom_email: "leader@ppmk.local".to_string(),
        activities: vec![],
        requirements: vec![],
    }
}

pub fn user(name: &str, role: Role, club: Option<&Club>) -> User {
    User {
        id: Uuid::new_v4(),
        email: format!("{}@ppmk.local", name.to_lowercase()),
        name: name.to_string(),
        role,
        club: club.map(|c| ClubAffiliation {
            club_id: c.id,
            club_name: c.name.clone(),
        }),
    }
}

pub fn directory() -> Directory {
    let robotics = club("Robotics");
    let badminton = club("Badminton");
    Directory {
        member: user("Ahmad", Role::PpmkMember, None),
        club_member: user("Mei", Role::ClubMember, Some(&robotics)),
        club_hicom: user("Siti", Role::ClubHicom, Some(&robotics)),
        other_hicom: user("Lee", Role::ClubHicom, Some(&badminton)),
        biro: user("Farid", Role::PpmkBiro, None),
        president: user("Aisyah", Role::PpmkHicom, None),
        club: robotics,
        other_club: badminton,
    }
}

pub async fn open_store(repo: Arc<dyn KeyValueRepository>) -> anyhow::Result<Arc<EntityStore>> {
    Ok(Arc::new(EntityStore::open(repo, 64).await?))
}

/// In-memory store populated with `directory`'s clubs and users.
pub async fn seeded_store(directory: &Directory) -> anyhow::Result<Arc<EntityStore>> {
    let repo: Arc<dyn KeyValueRepository> = Arc::new(InMemoryKeyValueRepository::new());
    let store = open_store(repo).await?;

    let clubs = vec![directory.club.clone(), directory.other_club.clone()];
    store
        .mutate(store.clubs(), move |items| {
            items.extend(clubs);
            Ok(())
        })
        .await?;

    let users = directory.all_users();
    store
        .mutate(store.users(), move |items| {
            items.extend(users);
            Ok(())
        })
        .await?;

    Ok(store)
}

pub async fn services(directory: &Directory) -> anyhow::Result<Arc<ServiceContext>> {
    let store = seeded_store(directory).await?;
    let auth_service = Arc::new(AuthService::new(store.clone(), DEMO_PASSWORD, 24)?);
    Ok(Arc::new(ServiceContext::new(store, auth_service)))
}
