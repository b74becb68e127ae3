pub mod announcement_service;
pub mod application_service;
pub mod club_service;
pub mod event_service;
pub mod proposal_service;
pub mod read_state_service;

use std::sync::Arc;

use crate::auth::AuthService;
use crate::store::EntityStore;
use announcement_service::AnnouncementService;
use application_service::ApplicationService;
use club_service::ClubService;
use event_service::EventService;
use proposal_service::ProposalService;
use read_state_service::ReadStateService;

pub use read_state_service::Read;

/// Every service, wired to one shared entity store.
pub struct ServiceContext {
    pub store: Arc<EntityStore>,
    pub auth_service: Arc<AuthService>,
    pub read_state_service: Arc<ReadStateService>,
    pub club_service: Arc<ClubService>,
    pub announcement_service: Arc<AnnouncementService>,
    pub proposal_service: Arc<ProposalService>,
    pub event_service: Arc<EventService>,
    pub application_service: Arc<ApplicationService>,
}

impl ServiceContext {
    pub fn new(store: Arc<EntityStore>, auth_service: Arc<AuthService>) -> Self {
        let read_state_service = Arc::new(ReadStateService::new(store.clone()));

        Self {
            club_service: Arc::new(ClubService::new(store.clone())),
            announcement_service: Arc::new(AnnouncementService::new(
                store.clone(),
                read_state_service.clone(),
            )),
            proposal_service: Arc::new(ProposalService::new(store.clone())),
            event_service: Arc::new(EventService::new(store.clone())),
            application_service: Arc::new(ApplicationService::new(store.clone())),
            read_state_service,
            auth_service,
            store,
        }
    }
}
