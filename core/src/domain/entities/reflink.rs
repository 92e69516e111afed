//! Reflink token entity: a single-use, time-limited credential binding a user to an intent.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Default token lifetime (1 hour)
pub const DEFAULT_TTL_SECONDS: i64 = 3600;

/// Number of random bytes fed into the token HMAC
pub const TOKEN_RANDOM_BYTES: usize = 40;

/// Length of the hex-encoded HMAC-SHA256 token string
pub const TOKEN_LENGTH: usize = 64;

/// Caller-defined payload stored verbatim alongside a token
pub type Properties = serde_json::Map<String, serde_json::Value>;

/// Purpose a token was issued for (stored in the `type` column)
///
/// The store only compares intents for equality; it never interprets them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Intent(String);

impl Intent {
    pub const PASSWORD_RESET: &'static str = "password_reset";
    pub const EMAIL_VERIFICATION: &'static str = "email_verification";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Intent tag for a caller-side reflink type
    pub fn of<T: ReflinkType>() -> Self {
        Self(T::INTENT.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Intent {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Intent {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A caller-side type that names a reflink purpose
///
/// ```
/// use rl_core::domain::entities::reflink::{Intent, ReflinkType};
///
/// struct ForgotPassword;
///
/// impl ReflinkType for ForgotPassword {
///     const INTENT: &'static str = "forgot_password";
/// }
///
/// assert_eq!(Intent::of::<ForgotPassword>().as_str(), "forgot_password");
/// ```
pub trait ReflinkType {
    const INTENT: &'static str;
}

/// Anything that identifies the user a token is issued to
pub trait ReflinkUser {
    fn id(&self) -> Uuid;
}

impl ReflinkUser for Uuid {
    fn id(&self) -> Uuid {
        *self
    }
}

impl<T: ReflinkUser + ?Sized> ReflinkUser for &T {
    fn id(&self) -> Uuid {
        (**self).id()
    }
}

/// Reflink token record stored in the `user_reflinks` table
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReflinkToken {
    /// Unique identifier for the record
    pub id: Uuid,

    /// User this token belongs to
    pub user_id: Uuid,

    /// Externally visible token value
    pub token: String,

    /// Purpose of the token
    #[serde(rename = "type")]
    pub intent: Intent,

    /// Opaque caller payload
    #[serde(default)]
    pub properties: Properties,

    /// Timestamp when the token was created
    pub created_at: DateTime<Utc>,
}

impl ReflinkToken {
    /// Creates a new record ready for insertion
    pub fn new(
        user_id: Uuid,
        intent: Intent,
        token: String,
        properties: Properties,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            token,
            intent,
            properties,
            created_at,
        }
    }

    /// Moment after which the token stops being valid
    ///
    /// Saturates at `DateTime::<Utc>::MAX_UTC`, so a TTL reaching past the
    /// representable range never expires.
    pub fn expires_at(&self, ttl: Duration) -> DateTime<Utc> {
        self.created_at
            .checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// A token is expired iff `now > created_at + ttl`
    pub fn is_expired_at(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now > self.expires_at(ttl)
    }

    /// Time remaining until expiration, or zero if expired
    pub fn time_until_expiration(&self, now: DateTime<Utc>, ttl: Duration) -> Duration {
        let expires_at = self.expires_at(ttl);
        if expires_at > now {
            expires_at - now
        } else {
            Duration::zero()
        }
    }

    pub fn belongs_to(&self, user_id: Uuid, intent: &Intent) -> bool {
        self.user_id == user_id && &self.intent == intent
    }
}

impl fmt::Debug for ReflinkToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReflinkToken")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("token", &"[REDACTED]")
            .field("intent", &self.intent)
            .field("properties", &self.properties)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Records created strictly before this instant are expired at `now`
///
/// Shares the predicate of [`ReflinkToken::is_expired_at`]:
/// `created_at < now - ttl` is the same as `now > created_at + ttl`.
///
/// Saturates at `DateTime::<Utc>::MIN_UTC`.
pub fn expiry_cutoff(now: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    now.checked_sub_signed(ttl)
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
