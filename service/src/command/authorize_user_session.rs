//! [`Command`] for authorizing a [`Session`].

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        user::{self, session, Session},
        User,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] resolving a [`session::Token`] into a [`Session`] of an
/// existing [`User`].
#[derive(Clone, Debug, From)]
pub struct AuthorizeUserSession {
    /// [`Session`] token to authorize.
    pub token: session::Token,
}

impl<Db> Command<AuthorizeUserSession> for Service<Db>
where
    Db: Database<
        Select<By<Option<User>, user::Id>>,
        Ok = Option<User>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Session;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: AuthorizeUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AuthorizeUserSession { token } = cmd;

        let session =
            Session::verify(&token, &self.config().jwt_decoding_key)
                .map_err(tracerr::from_and_wrap!(=> E))?;

        // Sessions of the removed `User`s are no longer valid.
        self.database()
            .execute(Select(By::new(session.user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(session.user_id))
            .map_err(tracerr::wrap!())
            .map(drop)?;

        Ok(session)
    }
}

/// Error of [`AuthorizeUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`session::Token`] is malformed, forged or expired.
    #[display("Invalid `Session` token: {_0}")]
    InvalidToken(jsonwebtoken::errors::Error),

    /// [`User`] the [`Session`] belongs to does not exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use common::{operations::Insert, DateTime};

    use crate::{
        command::{create_user_session, CreateUserSession},
        domain::user::{session, Session},
        infra::{database::memory, Database as _},
        Command as _,
    };

    use super::{AuthorizeUserSession, ExecutionError};

    #[tokio::test]
    async fn resolves_valid_token() {
        let svc = memory::service();
        let user = memory::user("host@example.com");
        svc.database().execute(Insert(user.clone())).await.unwrap();

        let create_user_session::Output { token, .. } = svc
            .execute(CreateUserSession::ByUserId(user.id))
            .await
            .unwrap();
        let session = svc
            .execute(AuthorizeUserSession { token })
            .await
            .unwrap();

        assert_eq!(session.user_id, user.id);
    }

    #[tokio::test]
    async fn rejects_garbage_token() {
        let svc = memory::service();

        // SAFETY: Intentionally invalid for the test.
        #[expect(unsafe_code, reason = "test")]
        let token = unsafe { session::Token::new_unchecked("garbage".into()) };
        let err = svc
            .execute(AuthorizeUserSession { token })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::InvalidToken(_)));
    }

    #[tokio::test]
    async fn rejects_expired_token() {
        let svc = memory::service();
        let user = memory::user("host@example.com");
        svc.database().execute(Insert(user.clone())).await.unwrap();

        let expired = DateTime::from_unix_timestamp(
            DateTime::now().unix_timestamp() - 3600,
        )
        .unwrap();
        let token = Session {
            user_id: user.id,
            expires_at: expired.coerce(),
        }
        .sign(&svc.config().jwt_encoding_key)
        .unwrap();
        let err = svc
            .execute(AuthorizeUserSession { token })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::InvalidToken(_)));
    }

    #[tokio::test]
    async fn rejects_session_of_unknown_user() {
        let svc = memory::service();
        let user = memory::user("ghost@example.com");
        svc.database().execute(Insert(user.clone())).await.unwrap();

        let create_user_session::Output { token, .. } = svc
            .execute(CreateUserSession::ByUserId(user.id))
            .await
            .unwrap();
        svc.database().forget_user(user.id);

        let err = svc
            .execute(AuthorizeUserSession { token })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::UserNotExists(id) if *id == user.id,
        ));
    }
}
