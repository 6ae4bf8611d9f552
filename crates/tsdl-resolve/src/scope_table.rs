//! # Scope Table: Roots and Owners Visible to the Current Pass
//!
//! Maps each of the six scopes to its root field class, if any, for the
//! trace, stream and event class currently being resolved. It also records
//! whether each owning class is absent, open for resolution, or finalized.
//!
//! ## Availability
//!
//! An absolute reference may only name a scope whose owner is present and
//! not finalized, and whose root is declared. A finalized owner's roots stay
//! installed so that relative lookups and path re-derivation still see them,
//! but no new reference may point into them.

use tsdl_core::{EventClass, FieldClass, Scope, ScopeOwner, ScopeRoots, StreamClass, TraceClass};

use crate::error::{ResolveErrorKind, ScopeUnavailableReason};

/// State of the class owning a group of scopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OwnerStatus {
    /// No class of this kind is installed.
    #[default]
    Absent,
    /// Installed and open for resolution.
    Open,
    /// Installed but already translated.
    Finalized,
}

impl OwnerStatus {
    fn of(is_finalized: bool) -> Self {
        if is_finalized {
            Self::Finalized
        } else {
            Self::Open
        }
    }
}

/// Scope roots and owner states for one resolution pass.
#[derive(Debug, Clone, Copy)]
pub struct ScopeTable<'a> {
    roots: ScopeRoots<'a>,
    owners: [OwnerStatus; 3],
    active: Scope,
}

impl Default for ScopeTable<'_> {
    fn default() -> Self {
        Self::new()
    }
}

fn slot(owner: ScopeOwner) -> usize {
    match owner {
        ScopeOwner::Trace => 0,
        ScopeOwner::Stream => 1,
        ScopeOwner::Event => 2,
    }
}

impl<'a> ScopeTable<'a> {
    /// A table with no owner installed. The active scope starts at the
    /// packet header.
    pub fn new() -> Self {
        Self {
            roots: ScopeRoots::default(),
            owners: [OwnerStatus::Absent; 3],
            active: Scope::PacketHeader,
        }
    }

    /// The scope named by an absolute reference, or `None` if the
    /// reference is relative.
    pub fn classify(path: &str) -> Option<Scope> {
        Scope::from_absolute_path(path)
    }

    /// Install the trace class's packet header.
    pub fn install_trace(&mut self, tc: &'a TraceClass) {
        self.roots.set(Scope::PacketHeader, tc.packet_header.as_ref());
        self.owners[slot(ScopeOwner::Trace)] = OwnerStatus::of(tc.is_finalized);
    }

    /// Install a stream class's three scopes.
    pub fn install_stream(&mut self, sc: &'a StreamClass) {
        for scope in [Scope::PacketContext, Scope::EventHeader, Scope::EventCommonContext] {
            self.roots.set(scope, sc.scope_root(scope));
        }
        self.owners[slot(ScopeOwner::Stream)] = OwnerStatus::of(sc.is_finalized);
    }

    /// Remove the stream class's scopes.
    pub fn clear_stream(&mut self) {
        for scope in [Scope::PacketContext, Scope::EventHeader, Scope::EventCommonContext] {
            self.roots.set(scope, None);
        }
        self.owners[slot(ScopeOwner::Stream)] = OwnerStatus::Absent;
    }

    /// Install an event class's two scopes.
    pub fn install_event(&mut self, ec: &'a EventClass) {
        for scope in [Scope::EventSpecificContext, Scope::EventPayload] {
            self.roots.set(scope, ec.scope_root(scope));
        }
        self.owners[slot(ScopeOwner::Event)] = OwnerStatus::of(ec.is_finalized);
    }

    /// Remove the event class's scopes.
    pub fn clear_event(&mut self) {
        for scope in [Scope::EventSpecificContext, Scope::EventPayload] {
            self.roots.set(scope, None);
        }
        self.owners[slot(ScopeOwner::Event)] = OwnerStatus::Absent;
    }

    /// Set the scope whose tree is being walked.
    pub fn set_active(&mut self, scope: Scope) {
        self.active = scope;
    }

    /// The scope whose tree is being walked.
    pub fn active(&self) -> Scope {
        self.active
    }

    /// State of the class owning `owner`'s scopes.
    pub fn owner_status(&self, owner: ScopeOwner) -> OwnerStatus {
        self.owners[slot(owner)]
    }

    /// Root of `scope`, whatever the owner state.
    pub fn root_class_for(&self, scope: Scope) -> Option<&'a FieldClass> {
        self.roots.get(scope)
    }

    /// All installed roots.
    pub fn roots(&self) -> ScopeRoots<'a> {
        self.roots
    }

    /// Root of `scope` if an absolute reference may point into it.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveErrorKind::ScopeUnavailable`] when the owner is
    /// absent or finalized, or the root is not declared.
    pub fn check_available(&self, scope: Scope) -> Result<&'a FieldClass, ResolveErrorKind> {
        let owner = scope.owner();
        let unavailable = |reason| ResolveErrorKind::ScopeUnavailable { scope, reason };
        match self.owner_status(owner) {
            OwnerStatus::Absent => Err(unavailable(ScopeUnavailableReason::NoOwner(owner))),
            OwnerStatus::Finalized => Err(unavailable(ScopeUnavailableReason::Finalized(owner))),
            OwnerStatus::Open => self
                .root_class_for(scope)
                .ok_or_else(|| unavailable(ScopeUnavailableReason::NotDeclared)),
        }
    }
}
