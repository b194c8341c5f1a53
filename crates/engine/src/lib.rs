//! HAPI authorization matrix.
//!
//! A pure function mapping `(role, action, is_owner)` to allow/deny, consulted
//! before every reporter-initiated mutation:
//! - `Validator`: confirms records it did not create
//! - `Tracer`: creates addresses and assets, confirms others' records
//! - `Publisher`: creates cases, addresses and assets; updates its own
//! - `Authority`: Publisher creation rights plus updates over any record
//!
//! Nobody confirms their own record.

use hapi_core::types::ReporterRole;

/// A reporter-initiated registry action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Open a new case.
    CreateCase,
    /// Rename, relink, close or reopen a case.
    UpdateCase,
    /// Report a new address.
    CreateAddress,
    /// Change risk or category of an address.
    UpdateAddress,
    /// Corroborate an address reported by someone else.
    ConfirmAddress,
    /// Report a new asset.
    CreateAsset,
    /// Change risk or category of an asset.
    UpdateAsset,
    /// Corroborate an asset reported by someone else.
    ConfirmAsset,
}

impl Action {
    /// Every action.
    pub const ALL: [Action; 8] = [
        Action::CreateCase,
        Action::UpdateCase,
        Action::CreateAddress,
        Action::UpdateAddress,
        Action::ConfirmAddress,
        Action::CreateAsset,
        Action::UpdateAsset,
        Action::ConfirmAsset,
    ];

    /// Canonical snake_case name, used in logs.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Action::CreateCase => "create_case",
            Action::UpdateCase => "update_case",
            Action::CreateAddress => "create_address",
            Action::UpdateAddress => "update_address",
            Action::ConfirmAddress => "confirm_address",
            Action::CreateAsset => "create_asset",
            Action::UpdateAsset => "update_asset",
            Action::ConfirmAsset => "confirm_asset",
        }
    }

    const fn kind(&self) -> Kind {
        match self {
            Action::CreateCase => Kind::CreateCase,
            Action::CreateAddress | Action::CreateAsset => Kind::CreateRecord,
            Action::UpdateCase | Action::UpdateAddress | Action::UpdateAsset => Kind::Update,
            Action::ConfirmAddress | Action::ConfirmAsset => Kind::Confirm,
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    CreateCase,
    CreateRecord,
    Update,
    Confirm,
}

/// Decide whether `role` may perform `action`.
///
/// `is_owner` is true when the acting reporter created the target entity. It
/// is ignored for creations.
pub fn authorize(role: ReporterRole, action: Action, is_owner: bool) -> bool {
    use ReporterRole::*;

    match action.kind() {
        Kind::CreateCase => matches!(role, Publisher | Authority),
        Kind::CreateRecord => matches!(role, Tracer | Publisher | Authority),
        Kind::Update => match role {
            Authority => true,
            Publisher => is_owner,
            Validator | Tracer => false,
        },
        Kind::Confirm => !is_owner && matches!(role, Validator | Tracer | Publisher),
    }
}
