use serde::Serialize;

use crate::models::{User, UserUpdate};

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthState {
    is_authenticated: bool,
    user: Option<User>,
    is_loading: bool,
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub(crate) fn set_loading(&mut self, is_loading: bool) {
        self.is_loading = is_loading;
    }

    pub(crate) fn login(&mut self, user: User) {
        tracing::info!("User {} logged in", user.id);
        self.is_authenticated = true;
        self.user = Some(user);
    }

    pub(crate) fn logout(&mut self) {
        if let Some(user) = self.user.take() {
            tracing::info!("User {} logged out", user.id);
        }
        self.is_authenticated = false;
    }

    pub(crate) fn update_user(&mut self, update: UserUpdate) {
        if let Some(user) = self.user.as_mut() {
            user.apply(update);
        }
    }
}
