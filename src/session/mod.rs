//! Session state: who is logged in and with which token.
//!
//! The current credentials live in an [`ArcSwapOption`]. Readers take a
//! snapshot (`Arc<Credentials>`) and keep it for the lifetime of one request;
//! login and logout publish a new value without touching snapshots already
//! handed out. Every change is mirrored to a [`KeyValueStore`] so the next
//! process start can rehydrate without a network call.
//!
//! Writers are serialized so the published value and the stored keys never
//! disagree. Updates derived from an older snapshot (token refresh, profile
//! merge) only land if that snapshot is still current; a logout or a new
//! login that happened meanwhile wins.

mod auth;
pub mod storage;

pub use auth::SessionStore;
pub use storage::{FileStore, KeyValueStore, MemoryStore};

use arc_swap::ArcSwapOption;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::ClientResult;
use crate::models::User;
use storage::{ANONYMOUS_EMAIL_KEY, AUTH_REFRESH_TOKEN_KEY, AUTH_TOKEN_KEY, AUTH_USER_KEY};

#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    pub token: String,
    pub refresh_token: Option<String>,
    pub user: User,
}

pub struct SessionCell {
    current: ArcSwapOption<Credentials>,
    store: Arc<dyn KeyValueStore>,
    writer: Mutex<()>,
}

impl SessionCell {
    /// Load whatever session the store holds. No network access.
    ///
    /// A token without a readable user record is discarded.
    pub fn rehydrate(store: Arc<dyn KeyValueStore>) -> Self {
        let token = store.get(AUTH_TOKEN_KEY);
        let user = store.get(AUTH_USER_KEY);

        let credentials = match (token, user) {
            (Some(token), Some(user)) => match serde_json::from_str::<User>(&user) {
                Ok(user) => Some(Arc::new(Credentials {
                    token,
                    refresh_token: store.get(AUTH_REFRESH_TOKEN_KEY),
                    user,
                })),
                Err(e) => {
                    warn!(error = %e, "Stored user record unreadable, starting logged out");
                    None
                }
            },
            _ => None,
        };

        if let Some(creds) = &credentials {
            debug!(user_id = creds.user.id, "Rehydrated session");
        }

        Self {
            current: ArcSwapOption::new(credentials),
            store,
            writer: Mutex::new(()),
        }
    }

    pub fn snapshot(&self) -> Option<Arc<Credentials>> {
        self.current.load_full()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.load().is_some()
    }

    pub fn current_user(&self) -> Option<User> {
        self.current.load().as_ref().map(|c| c.user.clone())
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    /// Persist and publish new credentials.
    pub fn install(&self, credentials: Credentials) -> ClientResult<Arc<Credentials>> {
        let _writer = self.writer.lock();
        self.persist(&credentials)?;
        let credentials = Arc::new(credentials);
        self.current.store(Some(Arc::clone(&credentials)));
        Ok(credentials)
    }

    /// Publish `next` in place of `used`, if `used` is still the current
    /// session. Returns `None` and writes nothing otherwise.
    pub fn replace_if_current(
        &self,
        used: &Arc<Credentials>,
        next: Credentials,
    ) -> ClientResult<Option<Arc<Credentials>>> {
        let _writer = self.writer.lock();
        if !self.is_current(used) {
            debug!(user_id = used.user.id, "Session changed underneath, update dropped");
            return Ok(None);
        }
        self.persist(&next)?;
        let next = Arc::new(next);
        let expected = Some(Arc::clone(used));
        self.current.compare_and_swap(&expected, Some(Arc::clone(&next)));
        Ok(Some(next))
    }

    /// Replace the user record of the `used` session, keeping its tokens.
    ///
    /// Returns false when that session is gone.
    pub fn update_user(&self, used: &Arc<Credentials>, user: User) -> ClientResult<bool> {
        let next = Credentials {
            user,
            ..(**used).clone()
        };
        Ok(self.replace_if_current(used, next)?.is_some())
    }

    /// Drop the session from memory and storage.
    ///
    /// Storage failures are logged; the in-memory session is always cleared.
    pub fn clear(&self) {
        let _writer = self.writer.lock();
        self.current.store(None);
        self.forget_stored();
    }

    /// Clear the session only if `used` is still the current one.
    ///
    /// Returns false when a newer login has already replaced it.
    pub fn invalidate_if_current(&self, used: &Arc<Credentials>) -> bool {
        let _writer = self.writer.lock();
        let expected = Some(Arc::clone(used));
        let previous = self.current.compare_and_swap(&expected, None::<Arc<Credentials>>);
        let swapped = matches!(&*previous, Some(prev) if Arc::ptr_eq(prev, used));
        if swapped {
            self.forget_stored();
        }
        swapped
    }

    pub fn anonymous_email(&self) -> Option<String> {
        self.store.get(ANONYMOUS_EMAIL_KEY).filter(|e| !e.is_empty())
    }

    pub fn remember_anonymous_email(&self, email: &str) -> ClientResult<()> {
        self.store.set(ANONYMOUS_EMAIL_KEY, email)
    }

    fn is_current(&self, used: &Arc<Credentials>) -> bool {
        matches!(&*self.current.load(), Some(current) if Arc::ptr_eq(current, used))
    }

    fn persist(&self, credentials: &Credentials) -> ClientResult<()> {
        self.store.set(AUTH_TOKEN_KEY, &credentials.token)?;
        match &credentials.refresh_token {
            Some(refresh) => self.store.set(AUTH_REFRESH_TOKEN_KEY, refresh)?,
            None => self.store.remove(AUTH_REFRESH_TOKEN_KEY)?,
        }
        let user = serde_json::to_string(&credentials.user)?;
        self.store.set(AUTH_USER_KEY, &user)
    }

    fn forget_stored(&self) {
        for key in [AUTH_TOKEN_KEY, AUTH_REFRESH_TOKEN_KEY, AUTH_USER_KEY] {
            if let Err(e) = self.store.remove(key) {
                warn!(key, error = %e, "Failed to remove stored session key");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: u64) -> User {
        User {
            id,
            email: format!("user{}@example.com", id),
            first_name: "Test".into(),
            last_name: "User".into(),
            role: None,
            is_staff: false,
            bio: None,
            avatar: None,
        }
    }

    fn creds(token: &str) -> Credentials {
        Credentials {
            token: token.into(),
            refresh_token: Some(format!("{}-refresh", token)),
            user: user(1),
        }
    }

    #[test]
    fn test_install_then_rehydrate() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let cell = SessionCell::rehydrate(Arc::clone(&store));
        assert!(!cell.is_authenticated());

        cell.install(creds("tok-a")).unwrap();

        let again = SessionCell::rehydrate(store);
        let snap = again.snapshot().unwrap();
        assert_eq!(snap.token, "tok-a");
        assert_eq!(snap.refresh_token.as_deref(), Some("tok-a-refresh"));
        assert_eq!(snap.user.id, 1);
    }

    #[test]
    fn test_corrupt_user_record_means_logged_out() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        store.set(AUTH_TOKEN_KEY, "tok").unwrap();
        store.set(AUTH_USER_KEY, "not json").unwrap();
        assert!(!SessionCell::rehydrate(store).is_authenticated());
    }

    #[test]
    fn test_snapshot_is_unaffected_by_later_login() {
        let cell = SessionCell::rehydrate(Arc::new(MemoryStore::new()));
        cell.install(creds("first")).unwrap();
        let held = cell.snapshot().unwrap();

        cell.install(creds("second")).unwrap();
        cell.clear();

        assert_eq!(held.token, "first");
        assert!(cell.snapshot().is_none());
    }

    #[test]
    fn test_stale_invalidation_keeps_newer_session() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let cell = SessionCell::rehydrate(Arc::clone(&store));
        let old = cell.install(creds("old")).unwrap();
        cell.install(creds("new")).unwrap();

        assert!(!cell.invalidate_if_current(&old));
        assert_eq!(cell.snapshot().unwrap().token, "new");
        assert_eq!(store.get(AUTH_TOKEN_KEY).as_deref(), Some("new"));

        let current = cell.snapshot().unwrap();
        assert!(cell.invalidate_if_current(&current));
        assert!(!cell.is_authenticated());
        assert!(store.get(AUTH_TOKEN_KEY).is_none());
    }

    #[test]
    fn test_replace_after_clear_is_dropped() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let cell = SessionCell::rehydrate(Arc::clone(&store));
        let held = cell.install(creds("old")).unwrap();
        cell.clear();

        assert!(cell.replace_if_current(&held, creds("new")).unwrap().is_none());
        assert!(!cell.update_user(&held, user(7)).unwrap());
        assert!(!cell.is_authenticated());
        assert!(store.get(AUTH_TOKEN_KEY).is_none());
        assert!(store.get(AUTH_USER_KEY).is_none());
    }

    #[test]
    fn test_replace_current_session() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let cell = SessionCell::rehydrate(Arc::clone(&store));
        let held = cell.install(creds("old")).unwrap();

        let next = cell.replace_if_current(&held, creds("new")).unwrap().unwrap();
        assert!(!cell.update_user(&held, user(7)).unwrap());
        assert!(cell.update_user(&next, user(7)).unwrap());

        let snap = cell.snapshot().unwrap();
        assert_eq!(snap.token, "new");
        assert_eq!(snap.user.id, 7);
        assert_eq!(store.get(AUTH_TOKEN_KEY).as_deref(), Some("new"));
    }

    #[test]
    fn test_clear_keeps_anonymous_email() {
        let cell = SessionCell::rehydrate(Arc::new(MemoryStore::new()));
        cell.remember_anonymous_email("a@b.com").unwrap();
        cell.install(creds("tok")).unwrap();
        cell.clear();
        assert_eq!(cell.anonymous_email().as_deref(), Some("a@b.com"));
    }
}
