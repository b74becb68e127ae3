use std::sync::Arc;

use chrono::{Duration, Utc};
use clap::Parser;
use clubhouse::{
    domain::{
        ApplicationStatus, ClubAffiliation, Club, CreateAnnouncementRequest, CreateEventRequest,
        CreateProposalRequest, EventType, EventVisibility, ReviewApplicationRequest, Role,
        SubmitApplicationRequest, TargetAudience, User,
    },
    repository::SqliteKeyValueRepository,
    service::{
        announcement_service::AnnouncementService, application_service::ApplicationService,
        event_service::EventService, proposal_service::ProposalService,
        read_state_service::ReadStateService,
    },
    store::EntityStore,
};
use fake::{
    faker::{internet::en::SafeEmail, name::en::Name},
    Fake,
};
use sqlx::sqlite::SqlitePoolOptions;
use uuid::Uuid;

/// Fill the store with the demo club directory and sample activity.
#[derive(Parser, Debug)]
#[command(name = "seed", version)]
struct Args {
    /// SQLite URL. Falls back to $DATABASE_URL, then sqlite:clubhouse.db
    #[arg(long)]
    database_url: Option<String>,

    /// Clear every collection before seeding
    #[arg(long)]
    reset: bool,

    /// Extra generated ppmk_member accounts
    #[arg(long, default_value_t = 5)]
    extra_members: usize,
}

fn club(name: &str, category: &str, description: &str, hicom: &str) -> Club {
    Club {
        id: Uuid::new_v4(),
        name: name.to_string(),
        category: category.to_string(),
        description: description.to_string(),
        member_count: 0,
        hicom_name: hicom.to_string(),
        hicom_email: format!("{}@ppmk.local", hicom.to_lowercase().replace(' ', ".")),
        activities: Vec::new(),
        requirements: Vec::new(),
    }
}

fn user(name: &str, email: &str, role: Role, club: Option<&Club>) -> User {
    User {
        id: Uuid::new_v4(),
        email: email.to_string(),
        name: name.to_string(),
        role,
        club: club.map(|c| ClubAffiliation {
            club_id: c.id,
            club_name: c.name.clone(),
        }),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    println!("🌱 Starting store seeding...");

    let database_url = args
        .database_url
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| "sqlite:clubhouse.db?mode=rwc".to_string());

    let db_pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    println!("📋 Running migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await?;

    let repo = Arc::new(SqliteKeyValueRepository::new(db_pool.clone()));
    let store = Arc::new(EntityStore::open(repo, 16).await?);

    if args.reset {
        println!("🧹 Clearing existing collections and read markers...");
        store.clear().await?;
    } else if !store.users().snapshot().await.is_empty() {
        anyhow::bail!("Store already has users; run again with --reset to start over");
    }

    // Clubs
    println!("🏛  Creating clubs...");
    let mut robotics = club(
        "Robotics Club",
        "Technology",
        "Build, program and race robots.",
        "Siti Aminah",
    );
    robotics.activities = vec!["Weekly build nights".to_string(), "Inter-varsity league".to_string()];
    robotics.requirements = vec!["Basic programming".to_string()];

    let mut badminton = club(
        "Badminton Club",
        "Sports",
        "Casual and competitive badminton.",
        "Lee Wei",
    );
    badminton.activities = vec!["Tuesday training".to_string(), "Annual tournament".to_string()];
    badminton.requirements = vec!["Own racket".to_string()];

    let mut culture = club(
        "Cultural Society",
        "Culture",
        "Traditional dance, music and food festivals.",
        "Nurul Huda",
    );
    culture.activities = vec!["Festival nights".to_string()];

    let clubs = vec![robotics.clone(), badminton.clone(), culture.clone()];
    store.mutate(store.clubs(), move |items| { items.extend(clubs); Ok(()) }).await?;
    println!("  ✅ Created 3 clubs");

    // User directory
    println!("👥 Creating users...");
    let ahmad = user("Ahmad", "ahmad@ppmk.local", Role::PpmkMember, None);
    let mei = user("Mei Ling", "mei@ppmk.local", Role::ClubMember, Some(&robotics));
    let siti = user("Siti Aminah", "siti.aminah@ppmk.local", Role::ClubHicom, Some(&robotics));
    let lee = user("Lee Wei", "lee.wei@ppmk.local", Role::ClubHicom, Some(&badminton));
    let nurul = user("Nurul Huda", "nurul.huda@ppmk.local", Role::ClubHicom, Some(&culture));
    let biro = user("Farid", "biro@ppmk.local", Role::PpmkBiro, None);
    let president = user("Aisyah", "hicom@ppmk.local", Role::PpmkHicom, None);

    let mut users = vec![
        ahmad.clone(),
        mei.clone(),
        siti.clone(),
        lee.clone(),
        nurul.clone(),
        biro.clone(),
        president.clone(),
    ];
    for _ in 0..args.extra_members {
        let name: String = Name().fake();
        let email: String = SafeEmail().fake();
        if users.iter().any(|u| u.email == email) {
            continue;
        }
        users.push(user(&name, &email, Role::PpmkMember, None));
    }
    let user_count = users.len();
    store.mutate(store.users(), move |items| { items.extend(users); Ok(()) }).await?;
    println!("  ✅ Created {} users", user_count);

    let read_state = Arc::new(ReadStateService::new(store.clone()));
    let announcements = AnnouncementService::new(store.clone(), read_state);
    let proposals = ProposalService::new(store.clone());
    let events = EventService::new(store.clone());
    let applications = ApplicationService::new(store.clone());

    // Announcements
    println!("📢 Creating announcements...");
    announcements.create(&president, CreateAnnouncementRequest {
        title: "Welcome to the new semester".to_string(),
        content: "Club registration opens this week. Browse the club list and apply!".to_string(),
        target: TargetAudience::All,
        important: true,
    }).await?;
    announcements.create(&biro, CreateAnnouncementRequest {
        title: "HiCom briefing".to_string(),
        content: "All club HiComs please attend the briefing on Friday.".to_string(),
        target: TargetAudience::Role { role: Role::ClubHicom },
        important: false,
    }).await?;
    announcements.create(&siti, CreateAnnouncementRequest {
        title: "Build night moved".to_string(),
        content: "This week's build night moves to Thursday.".to_string(),
        target: TargetAudience::ClubMembers { club_ids: vec![robotics.id] },
        important: false,
    }).await?;
    println!("  ✅ Created 3 announcements");

    // Proposals
    println!("📝 Creating proposals...");
    proposals.create(&siti, CreateProposalRequest {
        title: "Robot league entry".to_string(),
        description: "Fund our entry into the inter-varsity robot league.".to_string(),
        objectives: vec!["Register a team".to_string(), "Build two robots".to_string()],
        budget: Some(1200.0),
        timeline: "March to May".to_string(),
    }).await?;
    proposals.create(&lee, CreateProposalRequest {
        title: "Court booking".to_string(),
        description: "Weekly court booking for training.".to_string(),
        objectives: vec!["Secure two courts every Tuesday".to_string()],
        budget: None,
        timeline: "Whole semester".to_string(),
    }).await?;
    println!("  ✅ Created 2 proposals");

    // Events
    println!("📅 Creating events...");
    let open_day = events.create(&biro, CreateEventRequest {
        title: "Club Open Day".to_string(),
        description: "Meet every club in one place.".to_string(),
        starts_at: Utc::now() + Duration::days(7),
        location: "Main Hall".to_string(),
        event_type: EventType::Social,
        max_attendees: Some(200),
        visibility: EventVisibility::Public,
        club_id: None,
    }).await?;
    events.create(&siti, CreateEventRequest {
        title: "Robotics members meeting".to_string(),
        description: "Plan the league season.".to_string(),
        starts_at: Utc::now() + Duration::days(3),
        location: "Lab 2".to_string(),
        event_type: EventType::Meeting,
        max_attendees: Some(20),
        visibility: EventVisibility::Private,
        club_id: Some(robotics.id),
    }).await?;
    events.rsvp(&ahmad, open_day.id).await?;
    events.rsvp(&mei, open_day.id).await?;
    println!("  ✅ Created 2 events with RSVPs");

    // Applications
    println!("🙋 Creating applications...");
    applications.submit(&ahmad, SubmitApplicationRequest {
        club_id: robotics.id,
        motivation: "I want to learn embedded programming.".to_string(),
        experience: Some("Arduino hobby projects".to_string()),
        skills: vec!["C".to_string(), "Soldering".to_string()],
    }).await?;
    let culture_application = applications.submit(&ahmad, SubmitApplicationRequest {
        club_id: culture.id,
        motivation: "I love traditional music.".to_string(),
        experience: None,
        skills: vec![],
    }).await?;
    applications.review(&nurul, culture_application.id, ReviewApplicationRequest {
        status: ApplicationStatus::Approved,
        feedback: Some("Welcome aboard!".to_string()),
    }).await?;
    println!("  ✅ Created 2 applications");

    println!("\n✨ Seeding complete!");
    println!("\n📝 Demo accounts (shared password from auth.demo_password, default password123):");
    for email in [
        &ahmad.email,
        &mei.email,
        &siti.email,
        &lee.email,
        &nurul.email,
        &biro.email,
        &president.email,
    ] {
        println!("  {}", email);
    }

    Ok(())
}
