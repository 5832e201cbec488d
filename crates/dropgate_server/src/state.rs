use dropgate_core::traits::{AdminAuth, ObjectStore};

/// State of the admin-side service.
#[derive(Clone)]
pub struct AdminState<S: ObjectStore, A: AdminAuth> {
    pub storage: S,
    pub auth: A,
    /// Base URL of the public gate, used to render shareable locator URLs.
    pub public_base_url: String,
}

/// State of the public gate. No auth provider: the token inside the
/// download locator is the only credential this service knows about.
#[derive(Clone)]
pub struct GateState<S: ObjectStore> {
    pub storage: S,
}
