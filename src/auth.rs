use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{LedgerError, Result};

/// staff role attached to an authenticated identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// full access including client management
    Admin,
    /// manages clients and records payments
    Officer,
    /// read-only access to clients, schedules, and ledgers
    Analyst,
}

/// operations gated by role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    ViewClients,
    ManageClients,
    RecordPayment,
}

impl Role {
    pub fn permits(&self, action: Action) -> bool {
        match self {
            Role::Admin => true,
            Role::Officer => matches!(
                action,
                Action::ViewClients | Action::ManageClients | Action::RecordPayment
            ),
            Role::Analyst => matches!(action, Action::ViewClients),
        }
    }
}

/// authenticated identity passed explicitly into each operation; there is
/// no ambient session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub role: Role,
}

impl AuthContext {
    pub fn new(user_id: Uuid, role: Role) -> Self {
        Self { user_id, role }
    }
}

/// allow/deny decision consumed by the servicing core
pub fn authorize(ctx: &AuthContext, action: Action) -> Result<()> {
    if ctx.role.permits(action) {
        Ok(())
    } else {
        Err(LedgerError::NotAuthorized {
            role: ctx.role,
            action,
        })
    }
}
