//! Admin accounts, as managed by super admins.

use resman_core::{AccountId, Email, Role};

use crate::authz::{self, Actor, Operation};
use crate::db::{RepositoryError, SharedStore};
use crate::graph::OwnershipGraph;
use crate::models::{AccountUpdate, AccountView};
use crate::services::batch::{BatchOutcome, refused};
use crate::services::{ServiceError, require};

/// Editable account fields as received from the client.
#[derive(Debug, Clone)]
pub struct AccountInput<'a> {
    pub name: &'a str,
    pub email: &'a str,
}

impl AccountInput<'_> {
    /// Check both fields and parse the email.
    pub(crate) fn validate(&self) -> Result<AccountUpdate, ServiceError> {
        require(self.name, "name")?;
        require(self.email, "email")?;
        let email = Email::parse(self.email)
            .map_err(|e| ServiceError::ValidationFailed(format!("invalid email: {e}")))?;
        Ok(AccountUpdate {
            email,
            name: self.name.trim().to_string(),
        })
    }
}

pub struct AdminService<'a> {
    store: &'a SharedStore,
    graph: &'a OwnershipGraph,
}

impl<'a> AdminService<'a> {
    #[must_use]
    pub const fn new(store: &'a SharedStore, graph: &'a OwnershipGraph) -> Self {
        Self { store, graph }
    }

    /// All admins in creation order.
    ///
    /// # Errors
    ///
    /// `Unauthorized` unless the actor is a super admin.
    pub async fn list(&self, actor: &Actor) -> Result<Vec<AccountView>, ServiceError> {
        authz::authorize(self.graph, actor, &Operation::ListAdmins).await?;
        let admins = self.store.list_accounts(Role::Admin, None).await?;
        Ok(admins.into_iter().map(AccountView::from).collect())
    }

    /// Change an admin's name and email.
    ///
    /// # Errors
    ///
    /// `ValidationFailed` for blank fields, `Unauthorized` for non super
    /// admins, `NotFound` for an unknown id, `DuplicateEmail` on a clash.
    pub async fn update(
        &self,
        actor: &Actor,
        id: &AccountId,
        input: AccountInput<'_>,
    ) -> Result<AccountView, ServiceError> {
        let update = input.validate()?;
        authz::authorize(self.graph, actor, &Operation::ManageAdmin(id.clone())).await?;
        let admin = self
            .store
            .update_account(Role::Admin, id, &update)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => ServiceError::NotFound("admin does not exist".into()),
                other => other.into(),
            })?;
        tracing::info!(admin_id = %admin.id, "Admin updated");
        Ok(admin.into())
    }

    /// Delete admins by id. Restaurants and owners they created are kept.
    ///
    /// # Errors
    ///
    /// `PartialFailure` naming the positions of ids that were refused or did
    /// not exist; the others are deleted regardless.
    pub async fn delete(&self, actor: &Actor, ids: &[AccountId]) -> Result<(), ServiceError> {
        authz::authorize(self.graph, actor, &Operation::ListAdmins).await?;
        let mut outcome = BatchOutcome::new("Admins");
        for (position, id) in (1..).zip(ids) {
            let op = Operation::ManageAdmin(id.clone());
            if refused(authz::authorize(self.graph, actor, &op).await)?
                || !self.store.delete_account(Role::Admin, id).await?
            {
                outcome.record_failure(position);
            }
        }
        outcome.into_result()
    }
}
