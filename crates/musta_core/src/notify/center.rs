//! Platform notification capability contract.

use crate::db::DbError;
use crate::model::reminder::DailyTime;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type NotifyResult<T> = Result<T, NotifyError>;

/// Failure reported by a notification center.
#[derive(Debug)]
pub enum NotifyError {
    Db(DbError),
    /// The platform refused the operation.
    Rejected(String),
}

impl Display for NotifyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Rejected(message) => write!(f, "notification center rejected request: {message}"),
        }
    }
}

impl Error for NotifyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Rejected(_) => None,
        }
    }
}

impl From<DbError> for NotifyError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for NotifyError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Authorization state as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationStatus {
    /// The user has not answered a permission prompt yet.
    NotDetermined,
    Authorized,
    Denied,
}

impl AuthorizationStatus {
    pub fn from_granted(granted: bool) -> Self {
        if granted {
            Self::Authorized
        } else {
            Self::Denied
        }
    }

    /// `Some(granted)` once the user has answered, `None` before.
    pub fn as_granted(self) -> Option<bool> {
        match self {
            Self::NotDetermined => None,
            Self::Authorized => Some(true),
            Self::Denied => Some(false),
        }
    }
}

/// One pending local notification registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRequest {
    /// Registration key; re-adding the same id replaces the registration.
    pub id: String,
    pub title: String,
    pub body: String,
    /// Fires at `hour:minute:00` local time.
    pub trigger: DailyTime,
    pub repeats: bool,
    pub badge: Option<u32>,
    pub sound: bool,
}

/// Local notification capability of the host platform.
///
/// Implementations must treat `add` with an already pending id as a
/// replacement and `remove_pending` of an unknown id as a no-op.
pub trait NotificationCenter {
    /// Prompts for permission and returns the user's answer.
    fn request_authorization(&self) -> NotifyResult<bool>;
    fn authorization_status(&self) -> NotifyResult<AuthorizationStatus>;
    fn add(&self, request: &NotificationRequest) -> NotifyResult<()>;
    fn remove_pending(&self, id: &str) -> NotifyResult<()>;
    fn remove_all_pending(&self) -> NotifyResult<()>;
    fn pending_requests(&self) -> NotifyResult<Vec<NotificationRequest>>;
}

impl<C: NotificationCenter + ?Sized> NotificationCenter for &C {
    fn request_authorization(&self) -> NotifyResult<bool> {
        (**self).request_authorization()
    }

    fn authorization_status(&self) -> NotifyResult<AuthorizationStatus> {
        (**self).authorization_status()
    }

    fn add(&self, request: &NotificationRequest) -> NotifyResult<()> {
        (**self).add(request)
    }

    fn remove_pending(&self, id: &str) -> NotifyResult<()> {
        (**self).remove_pending(id)
    }

    fn remove_all_pending(&self) -> NotifyResult<()> {
        (**self).remove_all_pending()
    }

    fn pending_requests(&self) -> NotifyResult<Vec<NotificationRequest>> {
        (**self).pending_requests()
    }
}
