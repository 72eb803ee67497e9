//! [`Command`] for creating a new [`User`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret, SecretBox};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::{Email, Name, Password, Role, Username};
use crate::{
    domain::{user, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`User`].
#[derive(Clone, Debug)]
pub struct CreateUser {
    /// [`Username`] of a new [`User`].
    ///
    /// Defaults to the [`Email`] if [`None`].
    pub username: Option<user::Username>,

    /// [`Email`] of a new [`User`].
    pub email: Option<user::Email>,

    /// [`Name`] of a new [`User`].
    pub name: Option<user::Name>,

    /// [`Password`] of a new [`User`].
    pub password: SecretBox<user::Password>,

    /// [`Role`] of a new [`User`].
    pub role: user::Role,
}

impl<Db> Command<CreateUser> for Service<Db>
where
    Db: for<'l> Database<
            Select<By<Option<User>, &'l user::Username>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + for<'l> Database<
            Select<By<Option<User>, &'l user::Email>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<User>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateUser) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateUser {
            username,
            email,
            name,
            password,
            role,
        } = cmd;

        let username = username
            .or_else(|| email.clone().map(Into::into))
            .ok_or(E::NoLogin)
            .map_err(tracerr::wrap!())?;

        let occupied = self
            .database()
            .execute(Select(By::new(&username)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if occupied.is_some() {
            return Err(tracerr::new!(E::UsernameOccupied(username)));
        }
        if let Some(email) = &email {
            let occupied = self
                .database()
                .execute(Select(By::new(email)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            if occupied.is_some() {
                return Err(tracerr::new!(E::EmailOccupied(email.clone())));
            }
        }

        let password_hash =
            user::PasswordHash::new(password.expose_secret())
                .map_err(tracerr::from_and_wrap!(=> E))?;

        let user = User {
            id: user::Id::new(),
            username,
            name,
            email,
            password_hash,
            role,
            created_at: DateTime::now().coerce(),
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Insert(user.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(user)
    }
}

/// Error of [`CreateUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Neither [`Username`] nor [`Email`] provided.
    #[display("Neither `Username` nor `Email` provided")]
    NoLogin,

    /// [`Username`] is already occupied.
    #[display("`{_0}` username is occupied")]
    UsernameOccupied(#[error(not(source))] user::Username),

    /// [`Email`] is already occupied.
    #[display("`{_0}` email is occupied")]
    EmailOccupied(#[error(not(source))] user::Email),

    /// Failed to hash the [`Password`].
    #[display("Failed to hash `Password`: {_0}")]
    #[from]
    PasswordHash(#[error(not(source))] argon2::password_hash::Error),
}

#[cfg(test)]
mod spec {
    use secrecy::SecretBox;

    use crate::{
        domain::user::{self, Role},
        infra::database::memory::Memory,
        Command as _,
    };

    use super::{CreateUser, ExecutionError};

    fn cmd(username: Option<&str>, email: Option<&str>) -> CreateUser {
        CreateUser {
            username: username.map(|u| user::Username::new(u).unwrap()),
            email: email.map(|e| user::Email::new(e).unwrap()),
            name: None,
            password: SecretBox::new(Box::new(
                user::Password::new("secret1").unwrap(),
            )),
            role: Role::User,
        }
    }

    #[tokio::test]
    async fn creates_user_with_hashed_password() {
        let db = Memory::default();

        let user = db
            .service()
            .execute(cmd(Some("alice"), Some("alice@drama.app")))
            .await
            .unwrap();

        assert_eq!(user.username.to_string(), "alice");
        assert_eq!(user.role, Role::User);
        assert!(user
            .password_hash
            .verify(&user::Password::new("secret1").unwrap()));
        assert_eq!(db.users().len(), 1);
        assert_eq!(db.commits(), 1);
    }

    #[tokio::test]
    async fn defaults_username_to_email() {
        let user = Memory::default()
            .service()
            .execute(cmd(None, Some("bob@drama.app")))
            .await
            .unwrap();

        assert_eq!(user.username.to_string(), "bob@drama.app");
    }

    #[tokio::test]
    async fn requires_login() {
        let err = Memory::default()
            .service()
            .execute(cmd(None, None))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::NoLogin));
    }

    #[tokio::test]
    async fn rejects_occupied_username() {
        let db = Memory::default();
        _ = db.user("alice", None, Role::Editor);

        let err = db
            .service()
            .execute(cmd(Some("alice"), Some("other@drama.app")))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::UsernameOccupied(_)));
        assert_eq!(db.users().len(), 1);
    }

    #[tokio::test]
    async fn rejects_occupied_email() {
        let db = Memory::default();
        _ = db.user("alice", Some("alice@drama.app"), Role::User);

        let err = db
            .service()
            .execute(cmd(Some("alicia"), Some("alice@drama.app")))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::EmailOccupied(_)));
        assert_eq!(db.users().len(), 1);
    }
}
