//! [`Session`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, FromStr};
use serde::{Deserialize, Deserializer, Serialize};

#[cfg(doc)]
use crate::domain::User;
use crate::domain::user;

/// Claims of a signed-in [`User`], carried in the session cookie.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// ID of the [`User`] this [`Session`] belongs to.
    pub user_id: user::Id,

    /// [`user::Username`] of the [`User`] at the moment of signing in.
    pub username: String,

    /// [`user::Role`] of the [`User`] at the moment of signing in.
    ///
    /// Missing or unknown roles are read as [`user::Role::User`].
    #[serde(default = "lowest_role", deserialize_with = "lenient_role")]
    pub role: user::Role,

    /// [`DateTime`] when this [`Session`] was issued.
    #[serde(rename = "iat", with = "common::datetime::unix_timestamp")]
    pub issued_at: IssueDateTime,

    /// [`DateTime`] when this [`Session`] expires.
    #[serde(rename = "exp", with = "common::datetime::unix_timestamp")]
    pub expires_at: ExpirationDateTime,
}

/// Default [`user::Role`] of a [`Session`].
const fn lowest_role() -> user::Role {
    user::Role::User
}

/// Deserializes a [`user::Role`], falling back to [`lowest_role()`].
fn lenient_role<'de, D>(deserializer: D) -> Result<user::Role, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .and_then(|r| r.parse().ok())
        .unwrap_or_else(lowest_role))
}

/// Access token of a [`Session`].
#[derive(AsRef, Clone, Debug, Display, FromStr)]
#[as_ref(str)]
pub struct Token(String);

impl Token {
    /// Creates a new [`Token`] without checking its contents.
    ///
    /// # Safety
    ///
    /// The provided `token` must be a valid [`Token`] representation.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub const unsafe fn new_unchecked(token: String) -> Self {
        Self(token)
    }
}

/// [`DateTime`] when a [`Session`] was issued.
pub type IssueDateTime = DateTimeOf<(Session, unit::Creation)>;

/// [`DateTime`] of a [`Session`] expiration.
pub type ExpirationDateTime = DateTimeOf<(Session, unit::Expiration)>;

#[cfg(test)]
mod spec {
    use serde_json::json;

    use super::{user::Role, Session};

    fn claims(role: serde_json::Value) -> serde_json::Value {
        json!({
            "userId": "7f0b4a2c-0c7e-4d0c-9b9e-3c1f2f7f1a11",
            "username": "admin",
            "role": role,
            "iat": 1_700_000_000,
            "exp": 1_700_604_800,
        })
    }

    #[test]
    fn reads_known_role() {
        let s: Session = serde_json::from_value(claims(json!("EDITOR"))).unwrap();

        assert_eq!(s.role, Role::Editor);
        assert_eq!(s.username, "admin");
        assert_eq!(s.expires_at.unix_timestamp(), 1_700_604_800);
    }

    #[test]
    fn unknown_role_reads_as_user() {
        let s: Session =
            serde_json::from_value(claims(json!("SUPERUSER"))).unwrap();

        assert_eq!(s.role, Role::User);
    }

    #[test]
    fn missing_role_reads_as_user() {
        let mut c = claims(json!(null));
        drop(c.as_object_mut().unwrap().remove("role"));

        let s: Session = serde_json::from_value(c).unwrap();

        assert_eq!(s.role, Role::User);
    }

    #[test]
    fn missing_user_id_is_rejected() {
        let mut c = claims(json!("ADMIN"));
        drop(c.as_object_mut().unwrap().remove("userId"));

        assert!(serde_json::from_value::<Session>(c).is_err());
    }

    #[test]
    fn writes_camel_case_claims() {
        let s: Session = serde_json::from_value(claims(json!("ADMIN"))).unwrap();

        let v = serde_json::to_value(&s).unwrap();

        assert_eq!(v["userId"], "7f0b4a2c-0c7e-4d0c-9b9e-3c1f2f7f1a11");
        assert_eq!(v["role"], "ADMIN");
        assert_eq!(v["exp"], 1_700_604_800);
    }
}
