use blobvault_core::Profile;

/// The verified identity attached to a request by [`AuthLayer`](super::AuthLayer).
///
/// Lives only for the duration of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityContext {
    /// Profile decoded from the token's `profile` claim.
    pub profile: Profile,
}

impl IdentityContext {
    pub fn new(profile: Profile) -> Self {
        Self { profile }
    }

    /// Login of the authenticated caller.
    pub fn login(&self) -> &str {
        &self.profile.login
    }
}
