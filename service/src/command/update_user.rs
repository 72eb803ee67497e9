//! [`Command`] for updating a [`User`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
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

/// [`Command`] for updating a [`User`].
///
/// Fields left [`None`] keep their current values.
#[derive(Clone, Debug)]
pub struct UpdateUser {
    /// ID of the [`User`] performing the update.
    pub actor: user::Id,

    /// ID of the [`User`] to be updated.
    pub user_id: user::Id,

    /// New [`Username`] of the [`User`].
    pub username: Option<user::Username>,

    /// New [`Name`] of the [`User`], [`Some`]`(`[`None`]`)` clearing it.
    pub name: Option<Option<user::Name>>,

    /// New [`Email`] of the [`User`], [`Some`]`(`[`None`]`)` clearing it.
    pub email: Option<Option<user::Email>>,

    /// New [`Password`] of the [`User`].
    pub password: Option<SecretBox<user::Password>>,

    /// New [`Role`] of the [`User`].
    pub role: Option<user::Role>,
}

impl<Db> Command<UpdateUser> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + for<'l> Database<
            Select<By<Option<User>, &'l user::Username>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + for<'l> Database<
            Select<By<Option<User>, &'l user::Email>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<User, user::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Update<User>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: UpdateUser) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateUser {
            actor,
            user_id,
            username,
            name,
            email,
            password,
            role,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `User`.
        tx.execute(Lock(By::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut user = tx
            .execute(Select(By::<Option<User>, _>::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(user_id))
            .map_err(tracerr::wrap!())?;

        if let Some(username) = username.filter(|u| *u != user.username) {
            let occupied = tx
                .execute(Select(By::new(&username)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            if occupied.is_some_and(|u| u.id != user_id) {
                return Err(tracerr::new!(E::UsernameOccupied(username)));
            }
            user.username = username;
        }

        if let Some(email) = email {
            if let Some(address) = email.as_ref().filter(|e| {
                user.email.as_ref() != Some(*e)
            }) {
                let occupied = tx
                    .execute(Select(By::new(address)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;
                if occupied.is_some_and(|u| u.id != user_id) {
                    return Err(tracerr::new!(E::EmailOccupied(
                        address.clone()
                    )));
                }
            }
            user.email = email;
        }

        if let Some(role) = role.filter(|r| *r != user.role) {
            if actor == user_id {
                return Err(tracerr::new!(E::SelfRoleChange));
            }
            user.role = role;
        }

        if let Some(name) = name {
            user.name = name;
        }

        if let Some(password) = password {
            user.password_hash =
                user::PasswordHash::new(password.expose_secret())
                    .map_err(tracerr::from_and_wrap!(=> E))?;
        }

        tx.execute(Update(user.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(user)
    }
}

/// Error of [`UpdateUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`User`] doesn't exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),

    /// [`Username`] is occupied by another [`User`].
    #[display("`{_0}` username is occupied")]
    #[from(ignore)]
    UsernameOccupied(#[error(not(source))] user::Username),

    /// [`Email`] is occupied by another [`User`].
    #[display("`{_0}` email is occupied")]
    #[from(ignore)]
    EmailOccupied(#[error(not(source))] user::Email),

    /// [`User`] tried to change their own [`Role`].
    #[display("`User` cannot change their own `Role`")]
    SelfRoleChange,

    /// Failed to hash the [`Password`].
    #[display("Failed to hash `Password`: {_0}")]
    PasswordHash(#[error(not(source))] argon2::password_hash::Error),
}
