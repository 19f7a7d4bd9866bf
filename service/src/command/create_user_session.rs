//! [`Command`] for creating a [`Session`].

use common::{
    operations::{By, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret, SecretBox};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::{session::Token, Email, Password};
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
#[derive(Debug, From)]
pub enum CreateUserSession {
    /// Create a new [`Session`] by [`User`] credentials.
    ByCredentials {
        /// [`Email`] of a [`User`].
        email: user::Email,

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
            Select<By<Option<User>, &'l user::Email>>,
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
        use ExecutionError as E;

        let user = match cmd {
            CreateUserSession::ByCredentials { email, password } => {
                let found = self
                    .database()
                    .execute(Select(By::new(&email)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;
                // Unknown email and wrong password look the same.
                found
                    .filter(|u| {
                        u.password_hash.verify(password.expose_secret())
                    })
                    .ok_or_else(|| tracerr::new!(E::WrongCredentials))?
            }
            CreateUserSession::ByUserId(id) => self
                .database()
                .execute(Select(By::new(id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or_else(|| tracerr::new!(E::UserNotExists(id)))?,
        };

        let session = Session {
            user_id: user.id,
            expires_at: (DateTime::now() + self.config().session_ttl)
                .coerce(),
        };
        let token = session
            .sign(&self.config().jwt_encoding_key)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        Ok(Output {
            token,
            user,
            expires_at: session.expires_at,
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
    use common::DateTime;
    use secrecy::SecretBox;

    use crate::{
        command::CreateUser, domain::user, infra::database::memory,
        Command as _,
    };

    use super::{CreateUserSession, ExecutionError, Output};

    fn password(s: &str) -> SecretBox<user::Password> {
        SecretBox::new(Box::new(user::Password::new(s).unwrap()))
    }

    fn email(s: &str) -> user::Email {
        user::Email::new(s).unwrap()
    }

    #[tokio::test]
    async fn logs_in_with_valid_credentials() {
        let svc = memory::service();
        let user = svc
            .execute(CreateUser {
                name: user::Name::new("Jane").unwrap(),
                email: email("jane@example.com"),
                password: password("correct horse"),
            })
            .await
            .unwrap();

        let Output {
            user: logged,
            expires_at,
            ..
        } = svc
            .execute(CreateUserSession::ByCredentials {
                email: email("jane@example.com"),
                password: password("correct horse"),
            })
            .await
            .unwrap();

        assert_eq!(logged.id, user.id);
        assert!(expires_at > DateTime::now().coerce());
    }

    #[tokio::test]
    async fn rejects_wrong_password_and_unknown_email_alike() {
        let svc = memory::service();
        _ = svc
            .execute(CreateUser {
                name: user::Name::new("Jane").unwrap(),
                email: email("jane@example.com"),
                password: password("correct horse"),
            })
            .await
            .unwrap();

        for (e, p) in [
            ("jane@example.com", "battery staple"),
            ("john@example.com", "correct horse"),
        ] {
            let err = svc
                .execute(CreateUserSession::ByCredentials {
                    email: email(e),
                    password: password(p),
                })
                .await
                .unwrap_err();

            assert!(matches!(err.as_ref(), ExecutionError::WrongCredentials));
        }
    }

    #[tokio::test]
    async fn rejects_unknown_user_id() {
        let svc = memory::service();
        let id = user::Id::new();

        let err = svc
            .execute(CreateUserSession::ByUserId(id))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::UserNotExists(i) if *i == id,
        ));
    }
}
