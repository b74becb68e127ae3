use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    domain::{
        CreateProposalRequest, Proposal, ProposalStatus, ReviewProposalRequest,
        UpdateProposalRequest, User,
    },
    error::{AppError, Result},
    policy::{ensure, filter_visible, is_visible, Action, EntityKind, Target},
    store::{remove_by_id, EntityStore},
};

pub struct ProposalService {
    store: Arc<EntityStore>,
}

impl ProposalService {
    pub fn new(store: Arc<EntityStore>) -> Self {
        Self { store }
    }

    /// Newest submissions first.
    pub async fn list_for(&self, user: &User) -> Vec<Proposal> {
        let mut visible = filter_visible(self.store.proposals().snapshot().await.as_slice(), user);
        visible.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        visible
    }

    pub async fn get_for(&self, user: &User, id: Uuid) -> Result<Proposal> {
        self.store
            .proposals()
            .find(id)
            .await
            .filter(|p| is_visible(p, user))
            .ok_or_else(|| AppError::NotFound("Proposal not found".to_string()))
    }

    async fn find(&self, id: Uuid) -> Result<Proposal> {
        self.store
            .proposals()
            .find(id)
            .await
            .ok_or_else(|| AppError::NotFound("Proposal not found".to_string()))
    }

    pub async fn create(&self, user: &User, request: CreateProposalRequest) -> Result<Proposal> {
        ensure(Action::Create, Target::Kind(EntityKind::Proposal), user)?;
        request.validate()?;
        validate_objectives(&request.objectives)?;
        validate_budget(request.budget)?;

        let club = user
            .club
            .clone()
            .ok_or_else(|| AppError::Validation("Proposals must belong to a club".to_string()))?;

        let proposal = Proposal {
            id: Uuid::new_v4(),
            title: request.title,
            description: request.description,
            objectives: request.objectives,
            budget: request.budget,
            timeline: request.timeline,
            club_id: club.club_id,
            club_name: club.club_name,
            submitted_by: user.author_ref(),
            status: ProposalStatus::Pending,
            submitted_at: Utc::now(),
            reviewed_at: None,
            reviewed_by: None,
            feedback: None,
        };

        let created = proposal.clone();
        self.store
            .mutate(self.store.proposals(), move |items| {
                items.push(created);
                Ok(())
            })
            .await?;

        tracing::info!(
            proposal_id = %proposal.id,
            club_id = %proposal.club_id,
            submitted_by = %user.id,
            "Proposal submitted"
        );
        Ok(proposal)
    }

    /// Content edits only. Status moves through `start_review` and `review`.
    pub async fn update(
        &self,
        user: &User,
        id: Uuid,
        request: UpdateProposalRequest,
    ) -> Result<Proposal> {
        let existing = self.find(id).await?;
        ensure(Action::Edit, Target::Proposal(&existing), user)?;
        request.validate()?;
        if let Some(ref objectives) = request.objectives {
            validate_objectives(objectives)?;
        }
        validate_budget(request.budget)?;

        let proposal = self
            .store
            .mutate(self.store.proposals(), move |items| {
                let proposal = find_mut(items, id)?;
                if let Some(title) = request.title {
                    proposal.title = title;
                }
                if let Some(description) = request.description {
                    proposal.description = description;
                }
                if let Some(objectives) = request.objectives {
                    proposal.objectives = objectives;
                }
                if request.budget.is_some() {
                    proposal.budget = request.budget;
                }
                if let Some(timeline) = request.timeline {
                    proposal.timeline = timeline;
                }
                Ok(proposal.clone())
            })
            .await?;

        tracing::info!(proposal_id = %id, editor_id = %user.id, "Proposal updated");
        Ok(proposal)
    }

    pub async fn delete(&self, user: &User, id: Uuid) -> Result<()> {
        let existing = self.find(id).await?;
        ensure(Action::Delete, Target::Proposal(&existing), user)?;

        self.store
            .mutate(self.store.proposals(), move |items| {
                remove_by_id(items, id, "Proposal").map(|_| ())
            })
            .await?;

        tracing::info!(proposal_id = %id, deleted_by = %user.id, "Proposal deleted");
        Ok(())
    }

    /// `pending -> under_review`.
    pub async fn start_review(&self, user: &User, id: Uuid) -> Result<Proposal> {
        self.transition(user, id, ProposalStatus::UnderReview, None).await
    }

    /// Final decision: `approved` or `rejected`, stamped with reviewer and time.
    pub async fn review(
        &self,
        user: &User,
        id: Uuid,
        request: ReviewProposalRequest,
    ) -> Result<Proposal> {
        if !request.status.is_final() {
            return Err(AppError::Validation(
                "A review must approve or reject the proposal".to_string(),
            ));
        }
        self.transition(user, id, request.status, request.feedback).await
    }

    async fn transition(
        &self,
        user: &User,
        id: Uuid,
        next: ProposalStatus,
        feedback: Option<String>,
    ) -> Result<Proposal> {
        let existing = self.find(id).await?;
        ensure(Action::Review, Target::Proposal(&existing), user)?;

        let reviewer = user.author_ref();
        // Checked against the collection being replaced, so two racing
        // reviews cannot both leave a non-final state
        let proposal = self
            .store
            .mutate(self.store.proposals(), move |items| {
                let proposal = find_mut(items, id)?;
                if !proposal.status.can_transition_to(next) {
                    return Err(AppError::InvalidTransition(format!(
                        "Proposal is {} and cannot become {}",
                        proposal.status.as_str(),
                        next.as_str()
                    )));
                }

                proposal.status = next;
                if next.is_final() {
                    proposal.reviewed_at = Some(Utc::now());
                    proposal.reviewed_by = Some(reviewer);
                    proposal.feedback = feedback;
                }
                Ok(proposal.clone())
            })
            .await?;

        tracing::info!(
            proposal_id = %id,
            status = proposal.status.as_str(),
            reviewer_id = %user.id,
            "Proposal status changed"
        );
        Ok(proposal)
    }
}

fn find_mut(items: &mut [Proposal], id: Uuid) -> Result<&mut Proposal> {
    items
        .iter_mut()
        .find(|p| p.id == id)
        .ok_or_else(|| AppError::NotFound("Proposal not found".to_string()))
}

fn validate_objectives(objectives: &[String]) -> Result<()> {
    if objectives.iter().any(|o| o.trim().is_empty()) {
        return Err(AppError::Validation("Objectives cannot be blank".to_string()));
    }
    Ok(())
}

fn validate_budget(budget: Option<f64>) -> Result<()> {
    match budget {
        Some(b) if !b.is_finite() || b < 0.0 => Err(AppError::Validation(
            "Budget must be a non-negative number".to_string(),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_validation() {
        assert!(validate_budget(None).is_ok());
        assert!(validate_budget(Some(0.0)).is_ok());
        assert!(validate_budget(Some(1500.5)).is_ok());
        assert!(validate_budget(Some(-1.0)).is_err());
        assert!(validate_budget(Some(f64::NAN)).is_err());
        assert!(validate_budget(Some(f64::INFINITY)).is_err());
    }

    #[test]
    fn test_blank_objectives_rejected() {
        assert!(validate_objectives(&["Recruit".to_string()]).is_ok());
        assert!(validate_objectives(&["Recruit".to_string(), "  ".to_string()]).is_err());
    }
}
