use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    domain::{
        Application, ApplicationStatus, ReviewApplicationRequest, SubmitApplicationRequest, User,
    },
    error::{AppError, Result},
    policy::{ensure, filter_visible, is_visible, Action, EntityKind, Target},
    store::{remove_by_id, EntityStore},
};

pub struct ApplicationService {
    store: Arc<EntityStore>,
}

impl ApplicationService {
    pub fn new(store: Arc<EntityStore>) -> Self {
        Self { store }
    }

    /// Newest first.
    pub async fn list_for(&self, user: &User) -> Vec<Application> {
        let mut visible =
            filter_visible(self.store.applications().snapshot().await.as_slice(), user);
        visible.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        visible
    }

    pub async fn get_for(&self, user: &User, id: Uuid) -> Result<Application> {
        self.store
            .applications()
            .find(id)
            .await
            .filter(|a| is_visible(a, user))
            .ok_or_else(|| AppError::NotFound("Application not found".to_string()))
    }

    pub async fn submit(&self, user: &User, request: SubmitApplicationRequest) -> Result<Application> {
        ensure(Action::Apply, Target::Kind(EntityKind::Application), user)?;
        request.validate()?;

        if self.store.clubs().find(request.club_id).await.is_none() {
            return Err(AppError::NotFound("Club not found".to_string()));
        }

        let application = Application {
            id: Uuid::new_v4(),
            applicant: user.author_ref(),
            applicant_email: user.email.clone(),
            club_id: request.club_id,
            motivation: request.motivation,
            experience: request.experience,
            skills: request.skills,
            status: ApplicationStatus::Pending,
            feedback: None,
            submitted_at: Utc::now(),
            reviewed_at: None,
            reviewed_by: None,
        };

        ensure(Action::Apply, Target::Application(&application), user)?;

        let created = application.clone();
        self.store
            .mutate(self.store.applications(), move |items| {
                let duplicate = items.iter().any(|a| {
                    a.applicant.id == created.applicant.id
                        && a.club_id == created.club_id
                        && a.blocks_resubmission()
                });
                if duplicate {
                    return Err(AppError::Conflict(
                        "An application to this club is already pending or approved".to_string(),
                    ));
                }
                items.push(created);
                Ok(())
            })
            .await?;

        tracing::info!(
            application_id = %application.id,
            club_id = %application.club_id,
            applicant_id = %user.id,
            "Application submitted"
        );
        Ok(application)
    }

    /// Approve or reject. Approval bumps the club's member count.
    pub async fn review(
        &self,
        user: &User,
        id: Uuid,
        request: ReviewApplicationRequest,
    ) -> Result<Application> {
        let existing = self
            .store
            .applications()
            .find(id)
            .await
            .ok_or_else(|| AppError::NotFound("Application not found".to_string()))?;
        ensure(Action::Review, Target::Application(&existing), user)?;

        if request.status == ApplicationStatus::Pending {
            return Err(AppError::Validation(
                "A review must approve or reject the application".to_string(),
            ));
        }

        let reviewer = user.author_ref();
        let next = request.status;
        let application = self
            .store
            .mutate(self.store.applications(), move |items| {
                let application = items
                    .iter_mut()
                    .find(|a| a.id == id)
                    .ok_or_else(|| AppError::NotFound("Application not found".to_string()))?;

                if !application.status.can_transition_to(next) {
                    return Err(AppError::InvalidTransition(format!(
                        "Application was already {:?}",
                        application.status
                    )));
                }

                application.status = next;
                application.feedback = request.feedback;
                application.reviewed_at = Some(Utc::now());
                application.reviewed_by = Some(reviewer);
                Ok(application.clone())
            })
            .await?;

        if application.status == ApplicationStatus::Approved {
            let club_id = application.club_id;
            let bumped = self
                .store
                .mutate(self.store.clubs(), move |clubs| {
                    Ok(clubs.iter_mut().find(|c| c.id == club_id).map(|club| {
                        club.member_count += 1;
                    }))
                })
                .await;
            if let Err(e) = bumped {
                tracing::warn!(club_id = %club_id, "Could not update member count: {}", e);
            }
        }

        tracing::info!(
            application_id = %id,
            status = ?application.status,
            reviewer_id = %user.id,
            "Application reviewed"
        );
        Ok(application)
    }

    /// Applicants may withdraw their own application; the top
    /// administrative role may remove any.
    pub async fn withdraw(&self, user: &User, id: Uuid) -> Result<()> {
        let existing = self
            .store
            .applications()
            .find(id)
            .await
            .ok_or_else(|| AppError::NotFound("Application not found".to_string()))?;
        ensure(Action::Delete, Target::Application(&existing), user)?;

        self.store
            .mutate(self.store.applications(), move |items| {
                remove_by_id(items, id, "Application").map(|_| ())
            })
            .await?;

        tracing::info!(application_id = %id, removed_by = %user.id, "Application withdrawn");
        Ok(())
    }
}
