//! [`Command`] for authorizing a [`Session`].

use derive_more::{Display, Error, From};
use jsonwebtoken::{Algorithm, Validation};
use tracerr::Traced;

use crate::{
    domain::user::{session, Session},
    Service,
};

use super::Command;

/// [`Command`] for authorizing a [`Session`].
///
/// Only the signature and the expiration of the [`session::Token`] are
/// checked, so no storage is touched.
#[derive(Clone, Debug, From)]
pub struct AuthorizeUserSession {
    /// [`Session`] token to authorize.
    pub token: session::Token,
}

impl<Db> Command<AuthorizeUserSession> for Service<Db> {
    type Ok = Session;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: AuthorizeUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AuthorizeUserSession { token } = cmd;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        let session = jsonwebtoken::decode::<Session>(
            token.as_ref(),
            &self.config.jwt_decoding_key,
            &validation,
        )
        .map_err(tracerr::from_and_wrap!(=> E))?
        .claims;

        if session.username.is_empty() {
            return Err(tracerr::new!(E::MalformedClaims));
        }

        Ok(session)
    }
}

/// Error of [`AuthorizeUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`jsonwebtoken`] decoding error.
    #[display("Failed to decode a JSON Web Token: {_0}")]
    JsonWebTokenDecodeError(jsonwebtoken::errors::Error),

    /// [`Session`] claims lack a username.
    #[display("`Session` claims are malformed")]
    MalformedClaims,
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::DateTime;
    use jsonwebtoken::{EncodingKey, Header};

    use crate::{
        domain::user::{self, session, Session},
        Command as _, Config, Service,
    };

    use super::{AuthorizeUserSession, ExecutionError};

    fn service() -> Service<()> {
        Service::new(Config::new(b"test-secret", Duration::from_secs(60)), ())
    }

    fn sign(session: &Session, secret: &[u8]) -> session::Token {
        let token = jsonwebtoken::encode(
            &Header::default(),
            session,
            &EncodingKey::from_secret(secret),
        )
        .unwrap();

        // SAFETY: `jsonwebtoken::encode` always returns a valid
        //         `session::Token`.
        #[expect(unsafe_code, reason = "invariants are preserved")]
        let token = unsafe { session::Token::new_unchecked(token) };
        token
    }

    fn session(expires_in: i64) -> Session {
        let now = DateTime::now().unix_timestamp();
        Session {
            user_id: user::Id::new(),
            username: "alice".into(),
            role: user::Role::Admin,
            issued_at: DateTime::from_unix_timestamp(now).unwrap().coerce(),
            expires_at: DateTime::from_unix_timestamp(now + expires_in)
                .unwrap()
                .coerce(),
        }
    }

    #[tokio::test]
    async fn accepts_valid_token() {
        let s = session(60);

        let got = service()
            .execute(AuthorizeUserSession {
                token: sign(&s, b"test-secret"),
            })
            .await
            .unwrap();

        assert_eq!(got, s);
    }

    #[tokio::test]
    async fn rejects_expired_token() {
        let err = service()
            .execute(AuthorizeUserSession {
                token: sign(&session(-10), b"test-secret"),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::JsonWebTokenDecodeError(_),
        ));
    }

    #[tokio::test]
    async fn rejects_foreign_signature() {
        let err = service()
            .execute(AuthorizeUserSession {
                token: sign(&session(60), b"other-secret"),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::JsonWebTokenDecodeError(_),
        ));
    }

    #[tokio::test]
    async fn rejects_garbage() {
        let err = service()
            .execute(AuthorizeUserSession {
                token: "not-a-token".parse().unwrap(),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::JsonWebTokenDecodeError(_),
        ));
    }

    #[tokio::test]
    async fn rejects_empty_username() {
        let mut s = session(60);
        s.username = String::new();

        let err = service()
            .execute(AuthorizeUserSession {
                token: sign(&s, b"test-secret"),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::MalformedClaims));
    }
}
