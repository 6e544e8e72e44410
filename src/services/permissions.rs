//! Permission resolution
//!
//! Every access decision in the API goes through [`check`]: it answers whether
//! an actor may exercise a [`Capability`] over a resource described by an
//! [`AccessScope`]. The module performs no I/O so callers load the event (or
//! ownership facts) first and pass borrowed views in.

use uuid::Uuid;

use crate::models::{Event, Operator, OperatorRole, Role, User};
use crate::utils::errors::{EventHubError, Result};
use crate::utils::logging::log_access_denied;

/// The caller as seen by the resolver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn new(id: Uuid, role: Role) -> Self {
        Self { id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self::new(user.id, user.role)
    }
}

/// Relationships of a resource that grant access
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessScope<'a> {
    pub resource_id: Option<Uuid>,
    pub operators: &'a [Operator],
    pub assistants: &'a [Uuid],
    pub owner: Option<Uuid>,
    pub is_public: bool,
}

impl<'a> AccessScope<'a> {
    /// Scope of an event and everything it governs
    pub fn event(event: &'a Event) -> Self {
        Self {
            resource_id: Some(event.id),
            operators: &event.operators,
            assistants: &event.assistants,
            owner: None,
            is_public: event.is_public,
        }
    }

    /// Scope of a resource with a single owner and no event
    pub fn owned(resource_id: Uuid, owner: Uuid) -> Self {
        Self {
            resource_id: Some(resource_id),
            owner: Some(owner),
            ..Self::default()
        }
    }

    pub fn with_owner(mut self, owner: Uuid) -> Self {
        self.owner = Some(owner);
        self
    }
}

/// Actions guarded by the resolver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Change event fields, images and activities list
    EditEvent,
    CreateActivity,
    EditActivity(Uuid),
    /// Witnesses on one activity
    ManageActivityAttendance(Uuid),
    /// Assistants, tickets and event witnesses
    ManageAttendance,
    /// Read operational data such as tickets and witness lists
    Operate,
    /// Add gallery photos
    ContributeMedia,
    View,
    Own,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Capability::EditEvent => f.write_str("edit_event"),
            Capability::CreateActivity => f.write_str("create_activity"),
            Capability::EditActivity(id) => write!(f, "edit_activity:{}", id),
            Capability::ManageActivityAttendance(id) => write!(f, "manage_activity_attendance:{}", id),
            Capability::ManageAttendance => f.write_str("manage_attendance"),
            Capability::Operate => f.write_str("operate"),
            Capability::ContributeMedia => f.write_str("contribute_media"),
            Capability::View => f.write_str("view"),
            Capability::Own => f.write_str("own"),
        }
    }
}

/// Why access was granted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grant {
    Admin,
    Operator(OperatorRole),
    Assistant,
    Owner,
    Public,
}

impl Grant {
    /// Admins and general operators may touch privileged fields
    pub fn is_privileged(&self) -> bool {
        matches!(self, Grant::Admin | Grant::Operator(OperatorRole::General))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted(Grant),
    Denied,
}

impl Access {
    pub fn is_granted(&self) -> bool {
        matches!(self, Access::Granted(_))
    }
}

fn operator_permits(operator: &Operator, capability: Capability) -> bool {
    match operator.role {
        OperatorRole::General => capability != Capability::Own,
        OperatorRole::Activity => match capability {
            Capability::CreateActivity
            | Capability::Operate
            | Capability::ContributeMedia
            | Capability::View => true,
            Capability::EditActivity(id) | Capability::ManageActivityAttendance(id) => {
                operator.activities.contains(&id)
            }
            _ => false,
        },
        OperatorRole::Assistant => matches!(
            capability,
            Capability::ManageAttendance
                | Capability::ManageActivityAttendance(_)
                | Capability::Operate
                | Capability::ContributeMedia
                | Capability::View
        ),
    }
}

/// Decide whether `actor` may exercise `capability` within `scope`
pub fn check(actor: Option<&Actor>, scope: &AccessScope<'_>, capability: Capability) -> Access {
    if let Some(actor) = actor {
        if actor.is_admin() {
            return Access::Granted(Grant::Admin);
        }

        if let Some(operator) = scope.operators.iter().find(|op| op.user == actor.id) {
            if operator_permits(operator, capability) {
                return Access::Granted(Grant::Operator(operator.role));
            }
        }

        if scope.assistants.contains(&actor.id)
            && matches!(capability, Capability::ContributeMedia | Capability::View)
        {
            return Access::Granted(Grant::Assistant);
        }

        if scope.owner == Some(actor.id) && matches!(capability, Capability::Own | Capability::View) {
            return Access::Granted(Grant::Owner);
        }
    }

    if capability == Capability::View && scope.is_public {
        return Access::Granted(Grant::Public);
    }

    Access::Denied
}

/// First capability among `capabilities` that is granted
pub fn check_any(actor: Option<&Actor>, scope: &AccessScope<'_>, capabilities: &[Capability]) -> Access {
    capabilities
        .iter()
        .map(|capability| check(actor, scope, *capability))
        .find(Access::is_granted)
        .unwrap_or(Access::Denied)
}

/// Like [`check`], turning a denial into a logged 403
pub fn require(actor: Option<&Actor>, scope: &AccessScope<'_>, capability: Capability) -> Result<Grant> {
    require_any(actor, scope, &[capability])
}

pub fn require_any(actor: Option<&Actor>, scope: &AccessScope<'_>, capabilities: &[Capability]) -> Result<Grant> {
    match check_any(actor, scope, capabilities) {
        Access::Granted(grant) => Ok(grant),
        Access::Denied => {
            let wanted = capabilities
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("|");
            log_access_denied(actor.map(|a| a.id), &wanted, scope.resource_id);
            Err(EventHubError::forbidden("Not authorized to perform this action"))
        }
    }
}

/// Admin-only operations outside any resource scope
pub fn require_admin(actor: &Actor) -> Result<()> {
    if actor.is_admin() {
        Ok(())
    } else {
        log_access_denied(Some(actor.id), "admin", None);
        Err(EventHubError::forbidden("Not authorized as an admin"))
    }
}
