//! # Realm Identity
//!
//! A realm is an isolated execution context with its own global state.
//! This module holds the realm record kept by the switchboard, plus the
//! per-realm bridge template.
//!
//! Templates are the construction shape stamped onto every bridge homed in a
//! realm. Each realm record owns its template slot and populates it lazily;
//! there is no process-wide template cache, and no two realms ever share a
//! template.

use std::sync::Arc;
use std::sync::OnceLock;

/// Strong type for realm identifiers.
///
/// The inner value is private: every `RealmId` in circulation was minted by a
/// [`Switchboard`](crate::switchboard::Switchboard) via `spawn_realm`.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
pub struct RealmId(u64);

impl RealmId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl std::fmt::Display for RealmId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "realm-{}", self.0)
    }
}

/// Strong type for template identifiers.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
pub struct TemplateId(pub(crate) u64);

impl std::fmt::Display for TemplateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "template-{}", self.0)
    }
}

/// The registry record for one realm.
///
/// Owns the lazily populated bridge template for bridges homed here.
pub struct Realm {
    id: RealmId,
    name: String,
    template: OnceLock<Arc<BridgeTemplate>>,
}

impl Realm {
    pub(crate) fn new(id: RealmId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            template: OnceLock::new(),
        }
    }

    /// The realm's identity.
    pub fn id(&self) -> RealmId {
        self.id
    }

    /// The human-readable name given at registration.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns this realm's bridge template, minting it on first use.
    ///
    /// The template is created at most once per realm; later calls return the
    /// cached shape and `mint` is not invoked.
    pub(crate) fn template(&self, mint: impl FnOnce() -> BridgeTemplate) -> Arc<BridgeTemplate> {
        self.template.get_or_init(|| Arc::new(mint())).clone()
    }
}

impl std::fmt::Debug for Realm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Realm")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish()
    }
}

/// The construction shape shared by all bridges homed in one realm.
///
/// Bridges constructed for a realm carry the same template; bridges of
/// different realms never do. The template is what keeps bridge identity
/// anchored to its home realm without sharing structure across realms.
#[derive(Debug)]
pub struct BridgeTemplate {
    id: TemplateId,
    realm: RealmId,
}

impl BridgeTemplate {
    pub(crate) fn new(id: TemplateId, realm: RealmId) -> Self {
        Self { id, realm }
    }

    /// The template's identity.
    pub fn id(&self) -> TemplateId {
        self.id
    }

    /// The realm this template belongs to.
    pub fn realm(&self) -> RealmId {
        self.realm
    }
}
