//! [`Command`] for creating a [`Session`].

use common::{
    operations::{By, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret, SecretBox};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::{session::Token, Login, Password};
use crate::{
    domain::{
        user::{self, session, Session},
        User,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a [`Session`].
#[derive(Clone, Debug, From)]
pub enum CreateUserSession {
    /// Create a new [`Session`] by [`User`] credentials.
    ByCredentials {
        /// [`Login`] of a [`User`], matching either its username or email.
        login: user::Login,

        /// [`Password`] of a [`User`].
        password: SecretBox<user::Password>,
    },

    /// Create a new [`Session`] by [`User`] ID.
    ByUserId(user::Id),
}

/// Output of [`CreateUserSession`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// [`Token`] of the created [`Session`].
    pub token: session::Token,

    /// [`User`] whose [`Session`] has been created.
    pub user: User,

    /// [`DateTime`] when the [`Session`] expires.
    pub expires_at: session::ExpirationDateTime,
}

impl<Db> Command<CreateUserSession> for Service<Db>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + for<'l> Database<
            Select<By<Option<User>, &'l user::Login>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        use CreateUserSession as Cmd;
        use ExecutionError as E;

        let user = match cmd {
            Cmd::ByCredentials { login, password } => {
                let user = self
                    .database()
                    .execute(Select(By::new(&login)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .ok_or_else(|| E::WrongCredentials)
                    .map_err(tracerr::wrap!())?;

                if !user.password_hash.verify(password.expose_secret()) {
                    return Err(tracerr::new!(E::WrongCredentials));
                }

                user
            }
            Cmd::ByUserId(user_id) => self
                .database()
                .execute(Select(By::new(user_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or_else(|| E::UserNotExists(user_id))
                .map_err(tracerr::wrap!())?,
        };

        let issued_at = DateTime::now();
        let expires_at = (issued_at + self.config.session_ttl).coerce();
        let token = jsonwebtoken::encode::<Session>(
            &jsonwebtoken::Header::default(),
            &Session {
                user_id: user.id,
                username: user.username.to_string(),
                role: user.role,
                issued_at: issued_at.coerce(),
                expires_at,
            },
            &self.config.jwt_encoding_key,
        )
        .map_err(tracerr::from_and_wrap!(=> E))?;

        // SAFETY: `jsonwebtoken::encode` always returns a valid
        //         `session::Token`.
        #[expect(unsafe_code, reason = "invariants are preserved")]
        let token = unsafe { session::Token::new_unchecked(token) };

        Ok(Output {
            token,
            user,
            expires_at,
        })
    }
}

/// Error of [`CreateUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`jsonwebtoken`] encoding error.
    #[display("Failed to encode a JSON Web Token: {_0}")]
    JsonWebTokenEncodeError(jsonwebtoken::errors::Error),

    /// [`User`] with the provided ID does not exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),

    /// [`CreateUserSession::ByCredentials`] contains wrong credentials.
    #[display("Wrong `User` credentials")]
    WrongCredentials,
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::{
        operations::{By, Select},
        Handler,
    };
    use secrecy::SecretBox;
    use tracerr::Traced;

    use crate::{
        command::authorize_user_session::AuthorizeUserSession,
        domain::{
            user::{self, Login},
            User,
        },
        infra::database,
        Config, Service,
    };

    use super::{CreateUserSession, ExecutionError};

    /// In-memory storage holding a single [`User`].
    struct Single(User);

    impl Handler<Select<By<Option<User>, user::Id>>> for Single {
        type Ok = Option<User>;
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            Select(by): Select<By<Option<User>, user::Id>>,
        ) -> Result<Self::Ok, Self::Err> {
            Ok((by.into_inner() == self.0.id).then(|| self.0.clone()))
        }
    }

    impl Handler<Select<By<Option<User>, &Login>>> for Single {
        type Ok = Option<User>;
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            Select(by): Select<By<Option<User>, &Login>>,
        ) -> Result<Self::Ok, Self::Err> {
            let login = by.into_inner().to_string();
            let matches = self.0.username.to_string() == login
                || self
                    .0
                    .email
                    .as_ref()
                    .is_some_and(|e| e.to_string() == login);
            Ok(matches.then(|| self.0.clone()))
        }
    }

    fn service() -> Service<Single> {
        let password = user::Password::new("secret1").unwrap();
        let user = User {
            id: user::Id::new(),
            username: user::Username::new("alice").unwrap(),
            name: None,
            email: user::Email::new("alice@example.com"),
            password_hash: user::PasswordHash::new(&password).unwrap(),
            role: user::Role::Editor,
            created_at: common::DateTime::now().coerce(),
        };
        Service::new(
            Config::new(b"test-secret", Duration::from_secs(60)),
            Single(user),
        )
    }

    fn credentials(login: &str, password: &str) -> CreateUserSession {
        CreateUserSession::ByCredentials {
            login: Login::new(login).unwrap(),
            password: SecretBox::new(Box::new(
                user::Password::new(password).unwrap(),
            )),
        }
    }

    #[tokio::test]
    async fn issues_verifiable_token() {
        let service = service();

        let out = service
            .execute(credentials("alice", "secret1"))
            .await
            .unwrap();
        let session = service
            .execute(AuthorizeUserSession { token: out.token })
            .await
            .unwrap();

        assert_eq!(session.user_id, out.user.id);
        assert_eq!(session.username, "alice");
        assert_eq!(session.role, user::Role::Editor);
        assert_eq!(session.expires_at, out.expires_at);
    }

    #[tokio::test]
    async fn logs_in_by_email() {
        let out = service()
            .execute(credentials("alice@example.com", "secret1"))
            .await
            .unwrap();

        assert_eq!(out.user.username.to_string(), "alice");
    }

    #[tokio::test]
    async fn rejects_wrong_password() {
        let err = service()
            .execute(credentials("alice", "wrong-password"))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::WrongCredentials));
    }

    #[tokio::test]
    async fn rejects_unknown_login() {
        let err = service()
            .execute(credentials("bob", "secret1"))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::WrongCredentials));
    }

    #[tokio::test]
    async fn rejects_unknown_user_id() {
        let err = service()
            .execute(CreateUserSession::ByUserId(user::Id::new()))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::UserNotExists(_)));
    }
}
