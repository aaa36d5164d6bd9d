//! Transient view state owned by a surface.

/// Row the user picked from the current listing.
///
/// Cleared on every refresh, since the row may no longer exist afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionState {
    /// Position in the listing at selection time.
    pub index: usize,
    /// Form name at that position.
    pub name: String,
}

/// Form waiting on a delete confirmation.
///
/// Not carried across a surface rebuild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDeletion {
    /// Form the user asked to delete.
    pub name: String,
}

/// Lifecycle phase of a surface instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SurfacePhase {
    /// Built but never activated.
    #[default]
    Created,
    /// Visible and bound to its download, if any.
    Active,
    /// Torn down; its download (if any) was parked for a successor.
    Inactive,
}

impl SurfacePhase {
    /// Stable label for logs and the status command.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}
