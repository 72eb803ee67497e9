//! [`User`]-related API definitions.

use secrecy::SecretBox;
use serde::{Deserialize, Serialize};
use service::{
    command,
    domain::{self, user},
};

use crate::{api, Error};

/// Registered user, as exposed by the API.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// ID of this [`User`].
    pub id: user::Id,

    /// Username of this [`User`].
    pub username: user::Username,

    /// Display name of this [`User`], if any.
    pub name: Option<user::Name>,

    /// Email of this [`User`], if any.
    pub email: Option<user::Email>,

    /// Role of this [`User`].
    pub role: user::Role,

    /// When this [`User`] was created.
    pub created_at: user::CreationDateTime,
}

impl From<domain::User> for User {
    fn from(user: domain::User) -> Self {
        let domain::User {
            id,
            username,
            name,
            email,
            password_hash: _,
            role,
            created_at,
        } = user;
        Self {
            id,
            username,
            name,
            email,
            role,
            created_at,
        }
    }
}

/// Body of a response carrying a [`User`].
#[derive(Debug, Serialize)]
pub struct Envelope {
    /// [`User`], if any.
    pub user: Option<User>,
}

impl From<Option<domain::User>> for Envelope {
    fn from(user: Option<domain::User>) -> Self {
        Self {
            user: user.map(Into::into),
        }
    }
}

/// Credentials and profile of a new [`User`].
#[derive(Debug, Deserialize)]
pub struct NewUser {
    /// Requested username.
    #[serde(default)]
    pub username: Option<String>,

    /// Password in plain text.
    pub password: String,

    /// Display name.
    #[serde(default)]
    pub name: Option<String>,

    /// Email address.
    #[serde(default)]
    pub email: Option<String>,

    /// Role, honored in the dashboard only.
    #[serde(default)]
    pub role: Option<user::Role>,
}

impl NewUser {
    /// Validates this [`NewUser`] into a [`command::CreateUser`] granting the
    /// provided [`user::Role`].
    ///
    /// # Errors
    ///
    /// With `INVALID_REQUEST` if any field is malformed.
    pub fn validate(
        self,
        role: user::Role,
    ) -> Result<command::CreateUser, Error> {
        let Self {
            username,
            password,
            name,
            email,
            role: _,
        } = self;

        let password = api::valid(user::Password::new(password), "password")?;
        Ok(command::CreateUser {
            username: api::non_blank(username)
                .map(|u| api::valid(user::Username::new(u.trim()), "username"))
                .transpose()?,
            email: api::non_blank(email)
                .map(|e| api::valid(user::Email::new(e.trim()), "email"))
                .transpose()?,
            name: api::non_blank(name)
                .map(|n| api::valid(user::Name::new(n.trim()), "name"))
                .transpose()?,
            password: SecretBox::init_with(move || password),
            role,
        })
    }
}

/// Changes to an existing [`User`].
///
/// Blank `name` and `email` erase them, while a blank `password` keeps the
/// current one.
#[derive(Debug, Default, Deserialize)]
pub struct Changes {
    /// New username.
    pub username: Option<String>,

    /// New display name.
    pub name: Option<String>,

    /// New email address.
    pub email: Option<String>,

    /// New password in plain text.
    pub password: Option<String>,

    /// New role.
    pub role: Option<user::Role>,
}

impl Changes {
    /// Validates these [`Changes`] into a [`command::UpdateUser`] of the
    /// provided `actor`.
    ///
    /// # Errors
    ///
    /// With `INVALID_REQUEST` if any field is malformed.
    pub fn validate(
        self,
        actor: user::Id,
        user_id: user::Id,
    ) -> Result<command::UpdateUser, Error> {
        let Self {
            username,
            name,
            email,
            password,
            role,
        } = self;

        Ok(command::UpdateUser {
            actor,
            user_id,
            username: username
                .map(|u| api::valid(user::Username::new(u.trim()), "username"))
                .transpose()?,
            name: name
                .map(|n| {
                    api::non_blank(Some(n))
                        .map(|n| api::valid(user::Name::new(n.trim()), "name"))
                        .transpose()
                })
                .transpose()?,
            email: email
                .map(|e| {
                    api::non_blank(Some(e))
                        .map(|e| api::valid(user::Email::new(e.trim()), "email"))
                        .transpose()
                })
                .transpose()?,
            password: api::non_blank(password)
                .map(|p| api::valid(user::Password::new(p), "password"))
                .transpose()?
                .map(|p| SecretBox::init_with(move || p)),
            role,
        })
    }
}

#[cfg(test)]
mod spec {
    use secrecy::ExposeSecret as _;
    use service::domain::user;

    use super::{Changes, NewUser};

    fn new_user(json: serde_json::Value) -> NewUser {
        serde_json::from_value(json).unwrap()
    }

    fn changes(json: serde_json::Value) -> Changes {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn validates_new_user() {
        let cmd = new_user(serde_json::json!({
            "username": "",
            "email": "a@b.vn",
            "password": "secret1",
            "role": "ADMIN",
        }))
        .validate(user::Role::User)
        .unwrap();

        assert!(cmd.username.is_none());
        assert_eq!(cmd.email.unwrap().to_string(), "a@b.vn");
        assert!(cmd.name.is_none());
        assert_eq!(cmd.role, user::Role::User);
        assert_eq!(cmd.password.expose_secret().to_string(), "secret1");
    }

    #[test]
    fn rejects_short_password() {
        let err = new_user(serde_json::json!({
            "username": "viewer",
            "password": "12345",
        }))
        .validate(user::Role::User)
        .unwrap_err();

        assert_eq!(err.code, "INVALID_REQUEST");
    }

    #[test]
    fn blank_changes_erase_or_keep() {
        let (actor, target) = (user::Id::new(), user::Id::new());

        let cmd = changes(serde_json::json!({
            "name": " ",
            "email": "",
            "password": "",
        }))
        .validate(actor, target)
        .unwrap();

        assert_eq!(cmd.actor, actor);
        assert_eq!(cmd.user_id, target);
        assert!(cmd.username.is_none());
        assert_eq!(cmd.name, Some(None));
        assert_eq!(cmd.email, Some(None));
        assert!(cmd.password.is_none());
        assert!(cmd.role.is_none());
    }

    #[test]
    fn absent_changes_keep() {
        let cmd = changes(serde_json::json!({"role": "EDITOR"}))
            .validate(user::Id::new(), user::Id::new())
            .unwrap();

        assert!(cmd.name.is_none());
        assert!(cmd.email.is_none());
        assert_eq!(cmd.role, Some(user::Role::Editor));
    }

    #[test]
    fn rejects_malformed_changes() {
        for json in [
            serde_json::json!({"email": "not-an-email"}),
            serde_json::json!({"username": ""}),
            serde_json::json!({"password": "123"}),
        ] {
            let err = changes(json)
                .validate(user::Id::new(), user::Id::new())
                .unwrap_err();

            assert_eq!(err.code, "INVALID_REQUEST");
        }
    }
}
