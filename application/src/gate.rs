//! Request gate guarding the dashboard areas.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse as _, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use service::domain::user::Role;
use tracing as log;

use crate::{
    policy::{self, Scope},
    session::{AccessError, Session, Verifier},
    Error,
};

/// Outcome of a [`decide()`] call.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Decision {
    /// Request proceeds unchanged.
    Pass,

    /// Request is redirected to the provided location.
    Redirect(&'static str),

    /// Request is rejected with `401 Unauthorized`.
    Unauthenticated,

    /// Request is rejected with `403 Forbidden`.
    Forbidden,
}

/// Decides what happens to a request of the provided `path` made by a visitor
/// of the provided [`Role`], if authenticated.
#[must_use]
pub fn decide(path: &str, role: Option<Role>) -> Decision {
    let Some(scope) = Scope::of(path) else {
        return Decision::Pass;
    };
    let Some(role) = role else {
        return match scope {
            Scope::Api => Decision::Unauthenticated,
            Scope::Page => Decision::Redirect(policy::ROOT),
        };
    };

    if path == policy::DASHBOARD {
        return Decision::Redirect(policy::home_of(role));
    }
    if policy::is_allowed(path, role) {
        return Decision::Pass;
    }
    match scope {
        Scope::Api => Decision::Forbidden,
        Scope::Page => Decision::Redirect(policy::fallback_of(role)),
    }
}

/// Middleware applying [`decide()`] to every request.
///
/// Passed requests carry the verified [`Session`] (if any) in their
/// extensions.
pub async fn check(
    State(verifier): State<Verifier>,
    mut req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_owned();
    if Scope::of(&path).is_none() {
        return next.run(req).await;
    }

    let session = verifier
        .verify_jar(&CookieJar::from_headers(req.headers()))
        .await;
    let decision = decide(&path, session.as_ref().map(|s| s.role));
    log::debug!(
        path = %path,
        user = ?session.as_ref().map(|s| s.user_id),
        "gate decision: {decision:?}",
    );

    match decision {
        Decision::Pass => {
            if let Some(session) = session {
                _ = req.extensions_mut().insert(Session(session));
            }
            next.run(req).await
        }
        Decision::Redirect(to) => Redirect::temporary(to).into_response(),
        Decision::Unauthenticated => {
            Error::from(AccessError::Unauthenticated).into_response()
        }
        Decision::Forbidden => {
            Error::from(AccessError::Forbidden).into_response()
        }
    }
}
