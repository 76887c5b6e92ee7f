//! Household membership rules: first-run setup, partner invitations and
//! the merge that happens when a partner accepts.

use rusqlite::Connection;
use tracing::info;

use crate::db::queries::{activity_logs, households, invitations, users};
use crate::error::{AppError, AppResult};
use crate::models::{
    ActivityAction, Household, HouseholdSummary, Invitation, InvitationStatus, NewActivityLog,
    UserProfile,
};

pub fn load_summary(conn: &Connection, household_id: i64, viewer_id: i64) -> AppResult<HouseholdSummary> {
    let household = households::get_household(conn, household_id)?
        .ok_or_else(|| AppError::NotFound("Household not found".into()))?;
    let members = users::list_household_members(conn, household_id)?;
    Ok(HouseholdSummary::new(household, members, viewer_id))
}

/// Creates a household for a user who has none. Run inside a transaction.
pub fn setup_household(conn: &Connection, user: &UserProfile) -> AppResult<i64> {
    if let Some(existing) = user.household_id {
        return Err(AppError::BusinessRule(format!(
            "You already belong to household {}",
            existing
        )));
    }
    let household_id = households::create_household(conn)?;
    users::set_household(conn, user.id, Some(household_id))?;
    info!(user_id = user.id, household_id, "Household set up");
    Ok(household_id)
}

/// Validates and records an invitation from `inviter` to `invitee_email`.
pub fn invite_partner(
    conn: &Connection,
    inviter: &UserProfile,
    household_id: i64,
    invitee_email: &str,
) -> AppResult<Invitation> {
    let invitee_email = invitee_email.trim();
    if invitee_email.eq_ignore_ascii_case(inviter.email.trim()) {
        return Err(AppError::BusinessRule("You cannot invite yourself".into()));
    }

    let household = households::get_household(conn, household_id)?
        .ok_or_else(|| AppError::NotFound("Household not found".into()))?;
    if household.is_full() {
        return Err(AppError::BusinessRule(
            "Your household already has two members".into(),
        ));
    }

    let invitee = users::find_user_by_email(conn, invitee_email)?.ok_or_else(|| {
        AppError::NotFound(format!("No account is registered for {}", invitee_email))
    })?;

    if invitee.household_id == Some(household_id) {
        return Err(AppError::BusinessRule(
            "This person is already in your household".into(),
        ));
    }
    if let Some(their_household) = invitee.household_id {
        if households::count_members(conn, their_household)? as usize >= Household::MAX_MEMBERS {
            return Err(AppError::BusinessRule(
                "This person already shares a household with someone else".into(),
            ));
        }
    }
    if invitations::has_pending(conn, household_id, invitee_email)? {
        return Err(AppError::BusinessRule(
            "An invitation to this person is already pending".into(),
        ));
    }

    let id = invitations::create_invitation(
        conn,
        inviter.id,
        &inviter.display_name(),
        inviter.role,
        &invitee.email,
        household_id,
    )?;
    info!(invitation_id = id, inviter_id = inviter.id, "Partner invited");
    invitations::get_invitation(conn, id)?
        .ok_or_else(|| AppError::Internal("Invitation vanished after insert".into()))
}

fn pending_for(conn: &Connection, invitation_id: i64, user: &UserProfile) -> AppResult<Invitation> {
    let invitation = invitations::get_invitation(conn, invitation_id)?
        .ok_or_else(|| AppError::NotFound("Invitation not found".into()))?;
    if !invitation.invitee_email.eq_ignore_ascii_case(user.email.trim()) {
        return Err(AppError::Forbidden(
            "This invitation is addressed to someone else".into(),
        ));
    }
    if invitation.status != InvitationStatus::Pending {
        return Err(AppError::BusinessRule(format!(
            "This invitation was already {}",
            invitation.status.as_str()
        )));
    }
    Ok(invitation)
}

/// Joins `invitee` to the inviting household. Whatever the invitee had
/// planned alone moves along with them. Run inside a transaction.
pub fn accept_invitation(
    conn: &Connection,
    invitation_id: i64,
    invitee: &UserProfile,
) -> AppResult<i64> {
    let invitation = pending_for(conn, invitation_id, invitee)?;
    let target = invitation.household_id;

    let target_members = households::count_members(conn, target)? as usize;
    if target_members >= Household::MAX_MEMBERS {
        return Err(AppError::BusinessRule(
            "That household already has two members".into(),
        ));
    }

    match invitee.household_id {
        Some(current) if current == target => {
            return Err(AppError::BusinessRule(
                "You are already in this household".into(),
            ));
        }
        Some(current) => {
            if households::count_members(conn, current)? as usize > 1 {
                return Err(AppError::BusinessRule(
                    "Leave your current shared household before joining another".into(),
                ));
            }
            households::merge_households(conn, current, target)?;
        }
        None => {
            users::set_household(conn, invitee.id, Some(target))?;
        }
    }

    invitations::set_status(conn, invitation.id, InvitationStatus::Accepted)?;
    activity_logs::insert_log(
        conn,
        &NewActivityLog {
            household_id: target,
            user_id: invitee.id,
            user_name: invitee.display_name(),
            action: ActivityAction::PartnerJoined,
            details: format!("{} joined the household", invitee.display_name()),
            payload: None,
        },
    )?;

    info!(invitation_id, household_id = target, user_id = invitee.id, "Invitation accepted");
    Ok(target)
}

pub fn decline_invitation(conn: &Connection, invitation_id: i64, invitee: &UserProfile) -> AppResult<()> {
    let invitation = pending_for(conn, invitation_id, invitee)?;
    invitations::set_status(conn, invitation.id, InvitationStatus::Declined)?;
    info!(invitation_id, user_id = invitee.id, "Invitation declined");
    Ok(())
}
