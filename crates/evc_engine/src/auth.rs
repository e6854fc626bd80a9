use evc_core::phone::{is_valid_kyrgyz_phone, normalize_kyrgyz_phone};
use evc_core::{AuthAction, User, UserUpdate};
use evc_storage::{get_json, set_json};
use tokio::time::Instant;

use crate::{Engine, EngineError, EngineResult};

/// Plain-store key of the saved user profile.
pub const USER_KEY: &str = "user";
/// Secure-store key of the auth token.
pub const AUTH_TOKEN_KEY: &str = "authToken";

const MOCK_TOKEN: &str = "mock-jwt-token";
const CODE_LENGTH: usize = 4;

/// A code sent by SMS and not yet verified.
#[derive(Debug, Clone)]
pub(crate) struct PendingVerification {
    phone: String,
    sent_at: Instant,
}

impl Engine {
    /// Sends a verification code to `phone_input`.
    ///
    /// Returns the normalized number the code was sent to.
    pub async fn request_code(&self, phone_input: &str) -> EngineResult<String> {
        let phone = normalize_kyrgyz_phone(phone_input);
        if !is_valid_kyrgyz_phone(&phone) {
            return Err(EngineError::InvalidPhone(phone_input.to_string()));
        }
        tracing::info!("Requesting verification code for {}", phone);

        self.dispatch(AuthAction::SetLoading(true))?;
        self.backend.send_code(&phone).await;
        self.dispatch(AuthAction::SetLoading(false))?;

        self.lock().pending = Some(PendingVerification {
            phone: phone.clone(),
            sent_at: Instant::now(),
        });
        Ok(phone)
    }

    /// Sends the pending code again once the cooldown has run out.
    pub async fn resend_code(&self) -> EngineResult<()> {
        let phone = {
            let state = self.lock();
            let pending = state
                .pending
                .as_ref()
                .ok_or(EngineError::NoPendingVerification)?;
            let waited = pending.sent_at.elapsed();
            if waited < self.config.resend_cooldown {
                let remaining = self.config.resend_cooldown - waited;
                return Err(EngineError::ResendCooldown {
                    remaining_secs: remaining.as_secs_f64().ceil() as u64,
                });
            }
            pending.phone.clone()
        };

        self.backend.send_code(&phone).await;
        if let Some(pending) = self.lock().pending.as_mut() {
            pending.sent_at = Instant::now();
        }
        Ok(())
    }

    /// Seconds left before [`Engine::resend_code`] is allowed.
    pub fn resend_remaining_secs(&self) -> Option<u64> {
        let state = self.lock();
        let pending = state.pending.as_ref()?;
        let remaining = self
            .config
            .resend_cooldown
            .saturating_sub(pending.sent_at.elapsed());
        Some(remaining.as_secs_f64().ceil() as u64)
    }

    /// Checks the code sent to the pending number and logs the user in.
    pub async fn verify_code(&self, code: &str) -> EngineResult<User> {
        if code.len() != CODE_LENGTH || !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(EngineError::InvalidCode);
        }
        let phone = self
            .lock()
            .pending
            .as_ref()
            .map(|pending| pending.phone.clone())
            .ok_or(EngineError::NoPendingVerification)?;

        self.dispatch(AuthAction::SetLoading(true))?;
        let result = self.complete_login(&phone, code).await;
        self.dispatch(AuthAction::SetLoading(false))?;

        let user = result?;
        self.lock().pending = None;
        Ok(user)
    }

    async fn complete_login(&self, phone: &str, code: &str) -> EngineResult<User> {
        let user = self.backend.verify_code(phone, code).await;

        set_json(self.storage.plain.as_ref(), USER_KEY, &user).await?;
        self.storage.secure.set(AUTH_TOKEN_KEY, MOCK_TOKEN).await?;

        self.dispatch(AuthAction::Login(user.clone()))?;
        Ok(user)
    }

    /// Logs in the user saved by a previous run, if any.
    ///
    /// Unreadable storage counts as logged out.
    pub async fn restore_session(&self) -> Option<User> {
        match get_json::<User>(self.storage.plain.as_ref(), USER_KEY).await {
            Ok(Some(user)) => {
                tracing::info!("Restoring saved session of user {}", user.id);
                self.dispatch(AuthAction::Login(user.clone())).ok()?;
                Some(user)
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Could not read saved user, staying logged out: {}", e);
                None
            }
        }
    }

    pub async fn auth_token(&self) -> EngineResult<Option<String>> {
        Ok(self.storage.secure.get(AUTH_TOKEN_KEY).await?)
    }

    /// Saves the trimmed name and car number of the logged in user.
    pub async fn update_profile(&self, name: &str, car_number: &str) -> EngineResult<User> {
        let Some(mut user) = self.read(|store| store.auth().user().cloned()) else {
            return Err(EngineError::NotAuthenticated);
        };
        let update = UserUpdate {
            name: Some(name.trim().to_string()),
            car_number: Some(car_number.trim().to_string()),
            ..Default::default()
        };
        user.apply(update.clone());

        set_json(self.storage.plain.as_ref(), USER_KEY, &user).await?;
        self.dispatch(AuthAction::UpdateUser(update))?;
        Ok(user)
    }

    /// Forgets the saved user and token, then clears the auth state.
    pub async fn logout(&self) -> EngineResult<()> {
        self.storage.plain.remove(USER_KEY).await?;
        self.storage.secure.remove(AUTH_TOKEN_KEY).await?;

        self.lock().pending = None;
        self.dispatch(AuthAction::Logout)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use evc_storage::{KeyValueStore, MemoryStore, Storage, StorageError, StorageResult};

    use super::*;
    use crate::Catalog;
    use crate::test::{test_config, test_engine};

    /// Plain store whose every call fails.
    struct BrokenStore;

    #[async_trait]
    impl KeyValueStore for BrokenStore {
        async fn get(&self, _key: &str) -> StorageResult<Option<String>> {
            Err(StorageError::Io(std::io::Error::other("disk unavailable")))
        }

        async fn set(&self, _key: &str, _value: &str) -> StorageResult<()> {
            Err(StorageError::Io(std::io::Error::other("disk unavailable")))
        }

        async fn remove(&self, _key: &str) -> StorageResult<()> {
            Err(StorageError::Io(std::io::Error::other("disk unavailable")))
        }
    }

    fn broken_engine() -> Engine {
        let storage = Storage {
            plain: Arc::new(BrokenStore),
            secure: Arc::new(MemoryStore::new()),
        };
        Engine::new(test_config(), storage, Catalog::default())
    }

    #[tokio::test]
    async fn test_request_code_rejects_invalid_phone() {
        let engine = test_engine();

        match engine.request_code("12345").await {
            Err(EngineError::InvalidPhone(input)) => assert_eq!(input, "12345"),
            other => panic!("Expected InvalidPhone error, got {other:?}"),
        }
        assert!(engine.resend_remaining_secs().is_none());
    }

    #[tokio::test]
    async fn test_login_flow() {
        let engine = test_engine();

        let phone = engine.request_code("0555 12 34 56").await.unwrap();
        assert_eq!(phone, "996555123456");

        let user = engine.verify_code("1234").await.expect("Could not verify");
        assert_eq!(user.phone_number, "996555123456");

        engine.read(|store| {
            assert!(store.auth().is_authenticated());
            assert!(!store.auth().is_loading());
            assert_eq!(store.auth().user(), Some(&user));
        });
        assert_eq!(engine.auth_token().await.unwrap().as_deref(), Some(MOCK_TOKEN));

        // The pending code is consumed
        assert!(matches!(
            engine.verify_code("1234").await,
            Err(EngineError::NoPendingVerification)
        ));
    }

    #[tokio::test]
    async fn test_verify_rejects_malformed_code() {
        let engine = test_engine();
        engine.request_code("996555123456").await.unwrap();

        for code in ["", "123", "12345", "12a4"] {
            assert!(matches!(
                engine.verify_code(code).await,
                Err(EngineError::InvalidCode)
            ));
        }
        assert!(!engine.read(|store| store.auth().is_authenticated()));
    }

    #[tokio::test]
    async fn test_verify_storage_failure_clears_loading() {
        let engine = broken_engine();
        engine.request_code("996555123456").await.unwrap();

        assert!(matches!(
            engine.verify_code("1234").await,
            Err(EngineError::Storage(_))
        ));
        engine.read(|store| {
            assert!(!store.auth().is_authenticated());
            assert!(!store.auth().is_loading());
        });
    }

    #[tokio::test(start_paused = true)]
    async fn test_resend_cooldown() {
        let engine = test_engine();
        assert!(matches!(
            engine.resend_code().await,
            Err(EngineError::NoPendingVerification)
        ));

        engine.request_code("996555123456").await.unwrap();
        assert_eq!(engine.resend_remaining_secs(), Some(60));

        tokio::time::advance(Duration::from_secs(45)).await;
        match engine.resend_code().await {
            Err(EngineError::ResendCooldown { remaining_secs }) => assert_eq!(remaining_secs, 15),
            other => panic!("Expected ResendCooldown error, got {other:?}"),
        }

        tokio::time::advance(Duration::from_secs(15)).await;
        engine.resend_code().await.expect("Cooldown is over");
        assert_eq!(engine.resend_remaining_secs(), Some(60));
    }

    #[tokio::test]
    async fn test_restore_session() {
        let storage = Storage::in_memory();
        let first = Engine::new(test_config(), storage.clone(), Catalog::default());
        first.request_code("996700112233").await.unwrap();
        let user = first.verify_code("0000").await.unwrap();

        let second = Engine::new(test_config(), storage, Catalog::default());
        assert_eq!(second.restore_session().await, Some(user));
        assert!(second.read(|store| store.auth().is_authenticated()));
    }

    #[tokio::test]
    async fn test_restore_session_with_broken_storage() {
        let engine = broken_engine();
        assert!(engine.restore_session().await.is_none());
        assert!(!engine.read(|store| store.auth().is_authenticated()));
    }

    #[tokio::test]
    async fn test_update_profile() {
        let engine = test_engine();
        assert!(matches!(
            engine.update_profile("Aida", "01KG123ABC").await,
            Err(EngineError::NotAuthenticated)
        ));

        engine.request_code("996555123456").await.unwrap();
        engine.verify_code("1234").await.unwrap();

        let user = engine
            .update_profile("  Aida ", " 01KG123ABC ")
            .await
            .unwrap();
        assert_eq!(user.name.as_deref(), Some("Aida"));
        assert_eq!(user.car_number.as_deref(), Some("01KG123ABC"));
        assert_eq!(engine.read(|store| store.auth().user().cloned()), Some(user.clone()));

        let saved: Option<User> = get_json(engine.storage.plain.as_ref(), USER_KEY)
            .await
            .unwrap();
        assert_eq!(saved, Some(user));
    }

    #[tokio::test]
    async fn test_logout_clears_storage_and_state() {
        let engine = test_engine();
        engine.request_code("996555123456").await.unwrap();
        engine.verify_code("1234").await.unwrap();

        engine.logout().await.unwrap();

        assert!(!engine.read(|store| store.auth().is_authenticated()));
        assert!(engine.auth_token().await.unwrap().is_none());
        assert!(engine.restore_session().await.is_none());
    }
}
