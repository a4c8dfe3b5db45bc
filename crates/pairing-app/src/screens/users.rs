//! User directory for admins: debounced search, ban/unban, role changes

use std::sync::Arc;
use std::time::Duration;

use pairing_client::operations::{
    ListUsers, ListUsersVariables, SetUserBanned, SetUserBannedVariables, UpdateUserRole,
    UpdateUserRoleVariables,
};
use pairing_client::{ClientResult, Debouncer, GraphqlClient};
use pairing_core::{AppRole, User};
use tokio::sync::watch;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::notice::Notice;

pub struct UsersScreen {
    client: Arc<GraphqlClient>,
    organization_id: Option<Uuid>,
    users: watch::Sender<Vec<User>>,
    search: Debouncer,
}

impl UsersScreen {
    /// Super admins list everyone; org admins their own organization
    pub fn new(client: Arc<GraphqlClient>, search_delay: Duration) -> Self {
        let session = client.session();
        let organization_id = match session.role() {
            Some(AppRole::SuperAdmin) => None,
            _ => session.organization_id(),
        };
        Self {
            client,
            organization_id,
            users: watch::channel(Vec::new()).0,
            search: Debouncer::new(search_delay),
        }
    }

    pub async fn load(&self) -> ClientResult<usize> {
        let users = fetch(&self.client, self.variables(None)).await?;
        let count = users.len();
        self.users.send_replace(users);
        Ok(count)
    }

    /// Re-query once typing pauses; only the last term is sent
    pub fn search(&self, term: &str) {
        let client = self.client.clone();
        let users = self.users.clone();
        let variables = self.variables(Some(term));
        self.search.call(async move {
            match fetch(&client, variables).await {
                Ok(found) => {
                    debug!(count = found.len(), "Search results");
                    users.send_replace(found);
                }
                Err(err) => warn!(error = %err, "User search failed"),
            }
        });
    }

    pub fn users(&self) -> Vec<User> {
        self.users.borrow().clone()
    }

    /// Follow the list as searches complete
    pub fn watch(&self) -> watch::Receiver<Vec<User>> {
        self.users.subscribe()
    }

    pub async fn set_banned(&self, user_id: Uuid, banned: bool) -> Notice {
        let variables = SetUserBannedVariables { user_id, banned };
        match self.client.mutate::<SetUserBanned>(&variables).await {
            Ok(data) => {
                let user = data.set_user_banned;
                let message = if user.is_banned {
                    format!("{} has been banned", user.display_name())
                } else {
                    format!("{} has been unbanned", user.display_name())
                };
                self.replace(user);
                Notice::success(message)
            }
            Err(err) => Notice::from_error(&err),
        }
    }

    pub async fn change_role(&self, user_id: Uuid, role: AppRole) -> Notice {
        if self.client.session().role() != Some(AppRole::SuperAdmin) {
            return Notice::error("Only super admins can change roles");
        }
        let variables = UpdateUserRoleVariables { user_id, role };
        match self.client.mutate::<UpdateUserRole>(&variables).await {
            Ok(data) => {
                let user = data.update_user_role;
                let message = format!("{} is now {}", user.display_name(), user.role.label());
                self.replace(user);
                Notice::success(message)
            }
            Err(err) => Notice::from_error(&err),
        }
    }

    fn replace(&self, user: User) {
        self.users.send_modify(|users| {
            if let Some(slot) = users.iter_mut().find(|u| u.id == user.id) {
                *slot = user;
            }
        });
    }

    fn variables(&self, term: Option<&str>) -> ListUsersVariables {
        ListUsersVariables {
            organization_id: self.organization_id,
            search: term
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(ToString::to_string),
        }
    }
}

async fn fetch(client: &GraphqlClient, variables: ListUsersVariables) -> ClientResult<Vec<User>> {
    Ok(client.query::<ListUsers>(&variables).await?.users)
}
