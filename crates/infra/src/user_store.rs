//! User persistence.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use roster_auth::{Role, User, UserStatus};
use roster_core::UserId;

use crate::store::{Paged, StoreError, paginate};

/// Filters for the user listing. Empty fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserQuery {
    /// Substring of username or email.
    pub search: Option<String>,
    pub status: Option<UserStatus>,
    pub role: Option<Role>,
    /// 1-based page number.
    pub page: u32,
    pub per_page: usize,
}

/// User store abstraction.
pub trait UserStore: Send + Sync {
    /// Reserve the id for a new user.
    fn next_id(&self) -> Result<UserId, StoreError>;

    /// Insert a new user. Emails are unique.
    fn insert(&self, user: User) -> Result<(), StoreError>;

    fn get(&self, id: UserId) -> Result<Option<User>, StoreError>;

    fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    fn find_by_recovery_token(&self, token: &str) -> Result<Option<User>, StoreError>;

    /// Is `email` used by anyone other than `except`?
    fn email_taken(&self, email: &str, except: Option<UserId>) -> Result<bool, StoreError>;

    /// Replace a stored user.
    fn update(&self, user: &User) -> Result<(), StoreError>;

    /// Filtered listing, newest id first.
    fn list(&self, query: &UserQuery) -> Result<Paged<User>, StoreError>;

    /// Roles users may hold, sorted by name.
    fn roles(&self) -> Result<Vec<Role>, StoreError>;

    fn role_exists(&self, role: &Role) -> Result<bool, StoreError> {
        Ok(self.roles()?.contains(role))
    }
}

impl<S> UserStore for Arc<S>
where
    S: UserStore + ?Sized,
{
    fn next_id(&self) -> Result<UserId, StoreError> {
        (**self).next_id()
    }

    fn insert(&self, user: User) -> Result<(), StoreError> {
        (**self).insert(user)
    }

    fn get(&self, id: UserId) -> Result<Option<User>, StoreError> {
        (**self).get(id)
    }

    fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        (**self).find_by_email(email)
    }

    fn find_by_recovery_token(&self, token: &str) -> Result<Option<User>, StoreError> {
        (**self).find_by_recovery_token(token)
    }

    fn email_taken(&self, email: &str, except: Option<UserId>) -> Result<bool, StoreError> {
        (**self).email_taken(email, except)
    }

    fn update(&self, user: &User) -> Result<(), StoreError> {
        (**self).update(user)
    }

    fn list(&self, query: &UserQuery) -> Result<Paged<User>, StoreError> {
        (**self).list(query)
    }

    fn roles(&self) -> Result<Vec<Role>, StoreError> {
        (**self).roles()
    }
}

/// In-memory user store for tests/dev.
#[derive(Debug)]
pub struct InMemoryUserStore {
    users: RwLock<BTreeMap<UserId, User>>,
    roles: Vec<Role>,
}

impl InMemoryUserStore {
    /// Empty store knowing the standard roles.
    pub fn new() -> Self {
        Self::with_roles(Role::known())
    }

    pub fn with_roles(mut roles: Vec<Role>) -> Self {
        roles.sort();
        roles.dedup();
        Self {
            users: RwLock::new(BTreeMap::new()),
            roles,
        }
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Seed a user, replacing any with the same id.
    pub fn seed(&self, user: User) -> Result<(), StoreError> {
        let mut users = self.users.write().map_err(|_| StoreError::poisoned())?;
        users.insert(user.id, user);
        Ok(())
    }

    fn find(&self, pred: impl Fn(&User) -> bool) -> Result<Option<User>, StoreError> {
        let users = self.users.read().map_err(|_| StoreError::poisoned())?;
        Ok(users.values().find(|u| pred(u)).cloned())
    }
}

impl Default for InMemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

fn matches_query(user: &User, query: &UserQuery) -> bool {
    let search_ok = match query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(needle) => user.username.contains(needle) || user.email.contains(needle),
        None => true,
    };
    search_ok
        && query.status.is_none_or(|s| s == user.status)
        && query.role.as_ref().is_none_or(|r| *r == user.role)
}

impl UserStore for InMemoryUserStore {
    fn next_id(&self) -> Result<UserId, StoreError> {
        let users = self.users.read().map_err(|_| StoreError::poisoned())?;
        let last = users.keys().next_back().map(|id| id.get()).unwrap_or(0);
        Ok(UserId::new(last + 1))
    }

    fn insert(&self, user: User) -> Result<(), StoreError> {
        let mut users = self.users.write().map_err(|_| StoreError::poisoned())?;
        if users.contains_key(&user.id) {
            return Err(StoreError::Conflict(format!("user {} already exists", user.id)));
        }
        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict(format!("email {} already registered", user.email)));
        }
        users.insert(user.id, user);
        Ok(())
    }

    fn get(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let users = self.users.read().map_err(|_| StoreError::poisoned())?;
        Ok(users.get(&id).cloned())
    }

    fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.find(|u| u.email == email)
    }

    fn find_by_recovery_token(&self, token: &str) -> Result<Option<User>, StoreError> {
        self.find(|u| u.recovery_token.as_deref() == Some(token))
    }

    fn email_taken(&self, email: &str, except: Option<UserId>) -> Result<bool, StoreError> {
        Ok(self.find(|u| u.email == email && Some(u.id) != except)?.is_some())
    }

    fn update(&self, user: &User) -> Result<(), StoreError> {
        let mut users = self.users.write().map_err(|_| StoreError::poisoned())?;
        match users.get_mut(&user.id) {
            Some(stored) => {
                *stored = user.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound(format!("user {}", user.id))),
        }
    }

    fn list(&self, query: &UserQuery) -> Result<Paged<User>, StoreError> {
        let users = self.users.read().map_err(|_| StoreError::poisoned())?;
        let rows: Vec<User> = users
            .values()
            .rev()
            .filter(|u| matches_query(u, query))
            .cloned()
            .collect();
        Ok(paginate(rows, query.page, query.per_page))
    }

    fn roles(&self) -> Result<Vec<Role>, StoreError> {
        Ok(self.roles.clone())
    }
}
