//! [`Context`]-related definitions.

use std::sync::atomic::{self, AtomicU16};

use axum::{
    async_trait, extract::FromRequestParts, Json, RequestPartsExt as _,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization, Cookie},
    TypedHeader,
};
use common::DateTime;
use juniper::{
    http::{GraphQLBatchResponse, GraphQLResponse},
    IntoFieldError as _,
};
use service::{
    command::{self, Command as _},
    domain::user::session,
};
use tokio::sync::OnceCell;

#[cfg(doc)]
use crate::api::User;
use crate::{api, define_error, AsError, Error, Service};

/// Name of the cookie carrying a [`session::Token`].
pub const TOKEN_COOKIE: &str = "token";

/// Per-request context of the GraphQL API.
#[derive(Debug)]
pub struct Context {
    /// [`Service`] to execute operations with.
    service: Service,

    /// [`http::StatusCode`] of the last [`Error`] raised during the request.
    error_status_code: AtomicU16,

    /// [`session::Token`] presented with the request, if any.
    token: Result<Option<session::Token>, Error>,

    /// [`Session`] established during the request.
    established: OnceCell<Session>,

    /// Outcome of authorizing the presented [`session::Token`].
    authorized: OnceCell<Result<Session, Error>>,
}

impl Context {
    /// Returns the [`Service`] of this [`Context`].
    #[must_use]
    pub fn service(&self) -> &Service {
        &self.service
    }

    /// Returns the [`http::StatusCode`] to respond with on failure.
    #[must_use]
    pub fn error_status_code(&self) -> http::StatusCode {
        http::StatusCode::from_u16(
            self.error_status_code.load(atomic::Ordering::Relaxed),
        )
        .unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Sets the [`http::StatusCode`] to respond with on failure.
    pub fn set_error_status_code(&self, status_code: http::StatusCode) {
        self.error_status_code
            .store(status_code.as_u16(), atomic::Ordering::Relaxed);
    }

    /// Returns a [`Result::map_err()`] closure remembering the
    /// [`http::StatusCode`] of the passed [`Error`].
    pub fn error(&self) -> impl FnOnce(Error) -> Error + '_ {
        move |err| {
            self.set_error_status_code(err.status_code);
            err
        }
    }

    /// Establishes the provided [`Session`] as the current one for the rest
    /// of the request.
    ///
    /// Does nothing if a [`Session`] has been established already.
    pub async fn set_current_session(&self, session: Session) {
        _ = self.established.get_or_init(|| async { session }).await;
    }

    /// Returns the current [`Session`].
    ///
    /// It's either the one established during the request, or the one the
    /// presented [`session::Token`] authorizes.
    ///
    /// # Errors
    ///
    /// With `AUTHORIZATION_REQUIRED` code if no valid [`session::Token`] is
    /// presented.
    pub async fn current_session(&self) -> Result<Session, Error> {
        if let Some(session) = self.established.get() {
            return Ok(session.clone());
        }
        self.authorized
            .get_or_init(|| self.authorize())
            .await
            .clone()
            .map_err(self.error())
    }

    /// Authorizes the presented [`session::Token`].
    async fn authorize(&self) -> Result<Session, Error> {
        let token = self
            .token
            .clone()?
            .ok_or(AuthError::AuthorizationRequired)?;

        let session = self
            .service
            .execute(command::AuthorizeUserSession {
                token: token.clone(),
            })
            .await
            .map_err(AsError::into_error)?;
        Ok(Session {
            user_id: session.user_id.into(),
            token,
            expires_at: session.expires_at.coerce(),
        })
    }
}

impl juniper::Context for Context {}

/// Extracts the [`session::Token`] presented with the request.
///
/// `Authorization: Bearer` header takes precedence over the [`TOKEN_COOKIE`].
/// Empty tokens are ignored.
///
/// # Errors
///
/// If the `Authorization` header is malformed.
async fn presented_token(
    parts: &mut http::request::Parts,
) -> Result<Option<session::Token>, Error> {
    let token = match parts
        .extract::<TypedHeader<Authorization<Bearer>>>()
        .await
    {
        Ok(TypedHeader(Authorization(bearer))) => {
            Some(bearer.token().to_owned())
        }
        Err(e) if e.is_missing() => parts
            .extract::<TypedHeader<Cookie>>()
            .await
            .ok()
            .and_then(|TypedHeader(c)| c.get(TOKEN_COOKIE).map(Into::into)),
        Err(e) => return Err(e.into_error()),
    };

    #[expect(unsafe_code, reason = "verified on authorization")]
    let token = token
        .filter(|t| !t.is_empty())
        .map(|t| unsafe { session::Token::new_unchecked(t) });
    Ok(token)
}

#[async_trait]
impl<S> FromRequestParts<S> for Context
where
    S: Send + Sync,
{
    type Rejection = (http::StatusCode, Json<GraphQLBatchResponse>);

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        _: &S,
    ) -> Result<Self, Self::Rejection> {
        let Some(service) = parts.extensions.get::<Service>().cloned() else {
            let err = Error::internal(&"missing `Service` extension");
            return Err((
                err.status_code,
                Json(GraphQLBatchResponse::Single(GraphQLResponse::error(
                    err.into_field_error(),
                ))),
            ));
        };

        Ok(Self {
            service,
            error_status_code: AtomicU16::new(
                http::StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            ),
            token: presented_token(parts).await,
            established: OnceCell::new(),
            authorized: OnceCell::new(),
        })
    }
}

/// Authenticated session of a [`User`].
#[derive(Clone, Debug)]
pub struct Session {
    /// ID of the [`User`] this [`Session`] belongs to.
    pub user_id: api::user::Id,

    /// [`session::Token`] of this [`Session`].
    pub token: session::Token,

    /// [`DateTime`] when this [`Session`] expires.
    pub expires_at: DateTime,
}

impl AsError for command::authorize_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::InvalidToken(_) | Self::UserNotExists(_) => {
                Some(AuthError::AuthorizationRequired.into())
            }
        }
    }
}

define_error! {
    enum AuthError {
        #[code = "AUTHORIZATION_REQUIRED"]
        #[status = UNAUTHORIZED]
        #[message = "Authorization required"]
        AuthorizationRequired,
    }
}
