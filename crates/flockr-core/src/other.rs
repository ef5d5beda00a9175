use tracing::{debug, info};

use flockr_types::api::{MessageView, UserView};
use flockr_types::models::{GlobalRole, UserId};

use crate::channel::is_global_owner;
use crate::error::{FlockrError, Result};
use crate::{Flockr, views};

impl Flockr {
    /// Every registered user, in registration order.
    pub fn users_all(&self, token: &str) -> Result<Vec<UserView>> {
        self.store().with_state(|state| {
            self.sessions().authenticate(state, token)?;
            Ok(state.users.iter().map(views::user).collect())
        })
    }

    /// Sets a user's global role. `permission_id` is 1 for owner, 2 for
    /// member.
    pub fn admin_userpermission_change(
        &self,
        token: &str,
        u_id: UserId,
        permission_id: i64,
    ) -> Result<()> {
        self.store().with_state_mut(|state| {
            let caller = self.sessions().authenticate(state, token)?;
            if !is_global_owner(state, caller) {
                return Err(FlockrError::auth("User is not a flockr owner"));
            }
            if state.user(u_id).is_none() {
                return Err(FlockrError::not_found("Please enter a valid user id"));
            }
            let role = GlobalRole::from_permission_id(permission_id)
                .ok_or_else(|| FlockrError::validation("Invalid permission id"))?;

            if let Some(user) = state.user_mut(u_id) {
                user.role = role;
            }
            info!("User {} set global role of {} to {:?}", caller, u_id, role);
            Ok(())
        })
    }

    /// Messages containing `query` (case-sensitive) across the caller's
    /// channels, newest first within each channel.
    pub fn search(&self, token: &str, query: &str) -> Result<Vec<MessageView>> {
        self.store().with_state(|state| {
            let caller = self.sessions().authenticate(state, token)?;
            let found: Vec<_> = state
                .channels
                .iter()
                .filter(|c| c.is_member(caller))
                .flat_map(|c| c.messages.iter())
                .filter(|m| m.body.contains(query))
                .map(|m| views::message(m, caller))
                .collect();

            debug!("Search by {} matched {} messages", caller, found.len());
            Ok(found)
        })
    }
}
