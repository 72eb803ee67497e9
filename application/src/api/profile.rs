//! Endpoints of the signed-in user's profile.

use axum::{Extension, Json};
use axum_extra::extract::WithRejection;
use common::DateTime;
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::{episode, movie, watch_history},
    query::{self, Query as _},
    read,
};

use crate::{
    api::{self, Body, LookupError},
    session::Session,
    AsError, Error, Service,
};

/// List of profile entries.
#[derive(Debug, Serialize)]
pub(crate) struct Items<T> {
    /// Entries, newest first.
    items: Vec<T>,
}

/// Lists the favorite movies of the signed-in user.
#[tracing::instrument(skip_all, fields(user = %session.user_id))]
pub(crate) async fn favorites(
    Extension(service): Extension<Service>,
    session: Session,
) -> Result<Json<Items<read::favorite::Entry>>, Error> {
    service
        .execute(query::favorites::OfUser::by(session.user_id))
        .await
        .map(|items| Json(Items { items }))
        .map_err(AsError::into_error)
}

/// Body of a [`toggle_favorite()`] request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FavoriteInput {
    /// ID of the movie to toggle.
    movie_id: i64,
}

/// Outcome of a [`toggle_favorite()`] request.
#[derive(Debug, Serialize)]
pub(crate) struct Toggled {
    /// Indicator whether the movie is now a favorite.
    added: bool,

    /// Human-readable outcome.
    message: &'static str,
}

impl From<command::toggle_favorite::Output> for Toggled {
    fn from(output: command::toggle_favorite::Output) -> Self {
        use command::toggle_favorite::Output as O;

        match output {
            O::Added => Self {
                added: true,
                message: "Đã thêm vào yêu thích",
            },
            O::Removed => Self {
                added: false,
                message: "Đã bỏ khỏi yêu thích",
            },
        }
    }
}

/// Adds a movie to the favorites of the signed-in user, or removes it if it's
/// there already.
#[tracing::instrument(skip_all, fields(user = %session.user_id))]
pub(crate) async fn toggle_favorite(
    Extension(service): Extension<Service>,
    session: Session,
    WithRejection(Json(input), _): Body<FavoriteInput>,
) -> Result<Json<Toggled>, Error> {
    let movie_id =
        movie::Id::new(input.movie_id).ok_or(LookupError::MovieNotExists)?;

    service
        .execute(command::ToggleFavorite {
            user_id: session.user_id,
            movie_id,
        })
        .await
        .map(|output| Json(output.into()))
        .map_err(AsError::into_error)
}

/// Lists the recently watched movies of the signed-in user.
#[tracing::instrument(skip_all, fields(user = %session.user_id))]
pub(crate) async fn watch_history(
    Extension(service): Extension<Service>,
    session: Session,
) -> Result<Json<Items<read::watch_history::Entry>>, Error> {
    service
        .execute(query::watch_history::OfUser::by(session.user_id))
        .await
        .map(|items| Json(Items { items }))
        .map_err(AsError::into_error)
}

/// Body of a [`record_watch_history()`] request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReportInput {
    /// ID of the watched movie.
    movie_id: i64,

    /// ID of the watched episode.
    #[serde(default)]
    episode_id: Option<i64>,

    /// Playback position in seconds.
    #[serde(default)]
    progress_seconds: Option<i64>,
}

impl ReportInput {
    /// Validates this [`ReportInput`] into a [`watch_history::Report`] of the
    /// provided [`Session`].
    fn validate(
        self,
        session: &Session,
    ) -> Result<watch_history::Report, Error> {
        let Self {
            movie_id,
            episode_id,
            progress_seconds,
        } = self;

        Ok(watch_history::Report {
            user_id: session.user_id,
            movie_id: movie::Id::new(movie_id)
                .ok_or(LookupError::MovieNotExists)?,
            episode_id: episode_id
                .map(|id| {
                    episode::Id::new(id).ok_or(LookupError::EpisodeNotExists)
                })
                .transpose()?,
            progress: progress_seconds
                .map(|p| {
                    api::valid(
                        watch_history::Progress::new(p),
                        "progressSeconds",
                    )
                })
                .transpose()?,
            at: DateTime::now().coerce(),
        })
    }
}

/// Records the playback position of the signed-in user in a movie.
#[tracing::instrument(skip_all, fields(user = %session.user_id))]
pub(crate) async fn record_watch_history(
    Extension(service): Extension<Service>,
    session: Session,
    WithRejection(Json(input), _): Body<ReportInput>,
) -> Result<Json<read::watch_history::Entry>, Error> {
    let report = input.validate(&session)?;

    service
        .execute(command::RecordWatchHistory(report))
        .await
        .map(Json)
        .map_err(AsError::into_error)
}

impl AsError for command::toggle_favorite::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::MovieNotExists(_) => Some(LookupError::MovieNotExists.into()),
        }
    }
}

impl AsError for command::record_watch_history::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::MovieNotExists(_) => Some(LookupError::MovieNotExists.into()),
            Self::EpisodeNotExists(_) => {
                Some(LookupError::EpisodeNotExists.into())
            }
        }
    }
}

#[cfg(test)]
mod spec {
    use service::domain::user;

    use crate::session::Session;

    use super::ReportInput;

    fn session() -> Session {
        Session(user::Session {
            user_id: user::Id::new(),
            username: "viewer".into(),
            role: user::Role::User,
            issued_at: common::DateTime::now().coerce(),
            expires_at: common::DateTime::now().coerce(),
        })
    }

    fn input(json: serde_json::Value) -> ReportInput {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn validates_report() {
        let session = session();

        let report = input(serde_json::json!({
            "movieId": 3,
            "episodeId": 7,
            "progressSeconds": 120,
        }))
        .validate(&session)
        .unwrap();

        assert_eq!(report.user_id, session.user_id);
        assert_eq!(i32::from(report.movie_id), 3);
        assert_eq!(report.episode_id.map(i32::from), Some(7));
        assert_eq!(report.progress.map(i32::from), Some(120));
    }

    #[test]
    fn keeps_absent_fields_absent() {
        let report = input(serde_json::json!({"movieId": 3}))
            .validate(&session())
            .unwrap();

        assert!(report.episode_id.is_none());
        assert!(report.progress.is_none());
    }

    #[test]
    fn rejects_bad_ids() {
        let err = input(serde_json::json!({"movieId": 0}))
            .validate(&session())
            .unwrap_err();
        assert_eq!(err.code, "MOVIE_NOT_EXISTS");

        let err = input(serde_json::json!({"movieId": 1, "episodeId": -1}))
            .validate(&session())
            .unwrap_err();
        assert_eq!(err.code, "EPISODE_NOT_EXISTS");

        let err = input(serde_json::json!({
            "movieId": 1,
            "progressSeconds": -5,
        }))
        .validate(&session())
        .unwrap_err();
        assert_eq!(err.code, "INVALID_REQUEST");
    }
}
