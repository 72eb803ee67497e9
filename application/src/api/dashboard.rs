//! Dashboard endpoints, guarded by the [`gate`].
//!
//! [`gate`]: crate::gate

use axum::{extract::Path, Extension, Json};
use axum_extra::extract::WithRejection;
use common::DateTime;
use serde::Serialize;
use service::{
    command::{self, Command as _},
    domain::{movie, user, Genre, Tag},
    query::{self, Query as _},
};

use crate::{
    api::{self, Body, LookupError},
    define_error,
    session::Session,
    AsError, Error, Service,
};

/// Acknowledgement of a deletion.
#[derive(Debug, Serialize)]
pub(crate) struct Deleted {
    /// Always `true`.
    success: bool,
}

impl Deleted {
    /// Acknowledges a deletion.
    const fn ok() -> Json<Self> {
        Json(Self { success: true })
    }
}

/// Lists all the users, newest first.
#[tracing::instrument(skip_all)]
pub(crate) async fn users(
    Extension(service): Extension<Service>,
) -> Result<Json<Vec<api::User>>, Error> {
    service
        .execute(query::users::All::by(()))
        .await
        .map(|users| Json(users.into_iter().map(Into::into).collect()))
        .map_err(AsError::into_error)
}

/// Creates a new user of any role.
#[tracing::instrument(skip_all, fields(role))]
pub(crate) async fn create_user(
    Extension(service): Extension<Service>,
    WithRejection(Json(input), _): Body<api::user::NewUser>,
) -> Result<Json<api::User>, Error> {
    let role = input.role.unwrap_or(user::Role::User);
    _ = tracing::Span::current().record("role", tracing::field::display(role));

    service
        .execute(input.validate(role)?)
        .await
        .map(|user| Json(user.into()))
        .map_err(AsError::into_error)
}

/// Parses the provided raw user ID.
fn user_id(id: &str) -> Result<user::Id, Error> {
    id.parse().map_err(|_| LookupError::UserNotExists.into())
}

/// Updates a user partially.
#[tracing::instrument(skip_all, fields(actor = %session.user_id, user = %id))]
pub(crate) async fn update_user(
    Extension(service): Extension<Service>,
    session: Session,
    WithRejection(Path(id), _): WithRejection<Path<String>, Error>,
    WithRejection(Json(changes), _): Body<api::user::Changes>,
) -> Result<Json<api::User>, Error> {
    let cmd = changes.validate(session.user_id, user_id(&id)?)?;

    service
        .execute(cmd)
        .await
        .map(|user| Json(user.into()))
        .map_err(AsError::into_error)
}

/// Deletes a user.
#[tracing::instrument(skip_all, fields(actor = %session.user_id, user = %id))]
pub(crate) async fn delete_user(
    Extension(service): Extension<Service>,
    session: Session,
    WithRejection(Path(id), _): WithRejection<Path<String>, Error>,
) -> Result<Json<Deleted>, Error> {
    let user_id = user_id(&id)?;

    _ = service
        .execute(command::DeleteUser {
            actor: session.user_id,
            user_id,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Deleted::ok())
}

/// Parses the provided raw movie slug of a path.
fn slug(slug: String) -> Result<movie::Slug, Error> {
    movie::Slug::new(slug).map_err(|_| LookupError::MovieNotExists.into())
}

/// Returns everything known about a movie, re-reading it by its `slug`.
async fn detail(
    service: &Service,
    slug: movie::Slug,
) -> Result<Json<api::movie::Detail>, Error> {
    service
        .execute(query::movie::Detail(slug))
        .await
        .map_err(AsError::into_error)?
        .map(|detail| Json(detail.into()))
        .ok_or_else(|| LookupError::MovieNotExists.into())
}

/// Creates a new movie along with its episodes and servers.
#[tracing::instrument(skip_all, fields(title = %form.title))]
pub(crate) async fn create_movie(
    Extension(service): Extension<Service>,
    WithRejection(Json(form), _): Body<api::movie::Form>,
) -> Result<Json<api::movie::Detail>, Error> {
    let (movie, episodes) =
        form.validate(|| movie::Slug::timestamped(DateTime::now()))?;

    let movie = service
        .execute(command::CreateMovie { movie, episodes })
        .await
        .map_err(AsError::into_error)?;

    detail(&service, movie.slug).await
}

/// Returns everything known about a movie, including inactive servers.
#[tracing::instrument(skip_all, fields(slug = %path))]
pub(crate) async fn movie(
    Extension(service): Extension<Service>,
    WithRejection(Path(path), _): WithRejection<Path<String>, Error>,
) -> Result<Json<api::movie::Detail>, Error> {
    detail(&service, slug(path)?).await
}

/// Replaces a movie along with its episodes and servers.
#[tracing::instrument(skip_all, fields(slug = %path))]
pub(crate) async fn update_movie(
    Extension(service): Extension<Service>,
    WithRejection(Path(path), _): WithRejection<Path<String>, Error>,
    WithRejection(Json(form), _): Body<api::movie::Form>,
) -> Result<Json<api::movie::Detail>, Error> {
    let slug = slug(path)?;
    let (movie, episodes) = form.validate(|| slug.clone())?;

    let movie = service
        .execute(command::UpdateMovie {
            slug,
            movie,
            episodes,
        })
        .await
        .map_err(AsError::into_error)?;

    detail(&service, movie.slug).await
}

/// Deletes a movie along with everything attached to it.
#[tracing::instrument(skip_all, fields(slug = %path))]
pub(crate) async fn delete_movie(
    Extension(service): Extension<Service>,
    WithRejection(Path(path), _): WithRejection<Path<String>, Error>,
) -> Result<Json<Deleted>, Error> {
    _ = service
        .execute(command::DeleteMovie { slug: slug(path)? })
        .await
        .map_err(AsError::into_error)?;

    Ok(Deleted::ok())
}

/// Lists all the genres.
#[tracing::instrument(skip_all)]
pub(crate) async fn genres(
    Extension(service): Extension<Service>,
) -> Result<Json<Vec<Genre>>, Error> {
    service
        .execute(query::genres::All::by(()))
        .await
        .map(Json)
        .map_err(AsError::into_error)
}

/// Lists all the tags.
#[tracing::instrument(skip_all)]
pub(crate) async fn tags(
    Extension(service): Extension<Service>,
) -> Result<Json<Vec<Tag>>, Error> {
    service
        .execute(query::tags::All::by(()))
        .await
        .map(Json)
        .map_err(AsError::into_error)
}

define_error! {
    enum UserError {
        #[code = "USERNAME_OCCUPIED"]
        #[status = CONFLICT]
        #[message = "Tên đăng nhập đã tồn tại"]
        UsernameOccupied,

        #[code = "EMAIL_OCCUPIED"]
        #[status = CONFLICT]
        #[message = "Email đã được sử dụng"]
        EmailOccupied,

        #[code = "SELF_ROLE_CHANGE"]
        #[status = BAD_REQUEST]
        #[message = "Không thể thay đổi quyền của chính mình"]
        SelfRoleChange,

        #[code = "SELF_DELETION"]
        #[status = BAD_REQUEST]
        #[message = "Không thể xóa chính tài khoản đang đăng nhập"]
        SelfDeletion,
    }
}

define_error! {
    enum MovieError {
        #[code = "SLUG_OCCUPIED"]
        #[status = CONFLICT]
        #[message = "Slug đã tồn tại"]
        SlugOccupied,

        #[code = "INVALID_REQUEST"]
        #[status = BAD_REQUEST]
        #[message = "Số tập bị trùng"]
        DuplicateEpisode,
    }
}

impl AsError for command::update_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::UserNotExists(_) => Some(LookupError::UserNotExists.into()),
            Self::UsernameOccupied(_) => {
                Some(UserError::UsernameOccupied.into())
            }
            Self::EmailOccupied(_) => Some(UserError::EmailOccupied.into()),
            Self::SelfRoleChange => Some(UserError::SelfRoleChange.into()),
            Self::PasswordHash(_) => None,
        }
    }
}

impl AsError for command::delete_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::UserNotExists(_) => Some(LookupError::UserNotExists.into()),
            Self::SelfDeletion => Some(UserError::SelfDeletion.into()),
        }
    }
}

impl AsError for command::create_movie::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::SlugOccupied(_) => Some(MovieError::SlugOccupied.into()),
            Self::DuplicateEpisode(_) => {
                Some(MovieError::DuplicateEpisode.into())
            }
        }
    }
}

impl AsError for command::update_movie::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::MovieNotExists(_) => {
                Some(LookupError::MovieNotExists.into())
            }
            Self::SlugOccupied(_) => Some(MovieError::SlugOccupied.into()),
            Self::DuplicateEpisode(_) => {
                Some(MovieError::DuplicateEpisode.into())
            }
        }
    }
}

impl AsError for command::delete_movie::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::MovieNotExists(_) => {
                Some(LookupError::MovieNotExists.into())
            }
        }
    }
}

#[cfg(test)]
mod spec {
    use service::{command, domain::movie};

    use crate::AsError as _;

    use super::{slug, user_id};

    #[test]
    fn unknown_ids_are_not_found() {
        assert_eq!(user_id("not-a-uuid").unwrap_err().code, "USER_NOT_EXISTS");
        for raw in ["Bad Slug", "phim-tap-1"] {
            let err = slug(raw.into()).unwrap_err();
            assert_eq!(err.code, "MOVIE_NOT_EXISTS", "{raw}");
        }
        assert!(user_id("7f0b4a2c-0c7e-4d0c-9b9e-3c1f2f7f1a11").is_ok());
    }

    #[test]
    fn maps_user_errors() {
        use command::{delete_user, update_user};

        let err = update_user::ExecutionError::SelfRoleChange.as_error();
        assert_eq!(err.code, "SELF_ROLE_CHANGE");
        assert_eq!(err.status_code, http::StatusCode::BAD_REQUEST);

        let err = delete_user::ExecutionError::SelfDeletion.as_error();
        assert_eq!(err.code, "SELF_DELETION");
    }

    #[test]
    fn maps_movie_errors() {
        use command::{create_movie, delete_movie};

        let slug = movie::Slug::new("phim").unwrap();

        let err = create_movie::ExecutionError::SlugOccupied(slug.clone())
            .as_error();
        assert_eq!(err.code, "SLUG_OCCUPIED");
        assert_eq!(err.status_code, http::StatusCode::CONFLICT);

        let err = delete_movie::ExecutionError::MovieNotExists(slug).as_error();
        assert_eq!(err.code, "MOVIE_NOT_EXISTS");
        assert_eq!(err.status_code, http::StatusCode::NOT_FOUND);
    }
}
