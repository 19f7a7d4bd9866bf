//! [`Command`] for creating a new [`User`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret, SecretBox};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::{Email, Name, Password};
use crate::{
    domain::{user, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for registering a new [`User`].
#[derive(Debug)]
pub struct CreateUser {
    /// [`Name`] of a new [`User`].
    pub name: user::Name,

    /// [`Email`] of a new [`User`].
    pub email: user::Email,

    /// [`Password`] of a new [`User`].
    pub password: SecretBox<user::Password>,
}

impl<Db> Command<CreateUser> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: for<'l> Database<
            Select<By<Option<User>, &'l user::Email>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Insert<User>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateUser) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateUser {
            name,
            email,
            password,
        } = cmd;

        let password_hash = user::PasswordHash::new(password.expose_secret())
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let existing = tx
            .execute(Select(By::new(&email)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if existing.is_some() {
            return Err(tracerr::new!(E::EmailOccupied(email)));
        }

        let user = User {
            id: user::Id::new(),
            name,
            email,
            password_hash,
            created_at: DateTime::now().coerce(),
        };

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
    Db(database::Error),

    /// [`user::Email`] is already taken by another [`User`].
    #[display("`{_0}` email is occupied")]
    #[from(ignore)]
    EmailOccupied(#[error(not(source))] user::Email),

    /// Failed to hash a [`user::Password`].
    #[display("Failed to hash a password: {_0}")]
    PasswordHash(argon2::password_hash::Error),
}

#[cfg(test)]
mod spec {
    use secrecy::SecretBox;

    use crate::{
        domain::user,
        infra::database::memory,
        query, Command as _, Query as _,
    };

    use super::{CreateUser, ExecutionError};

    fn cmd(email: &str) -> CreateUser {
        CreateUser {
            name: user::Name::new("Jane Doe").unwrap(),
            email: user::Email::new(email).unwrap(),
            password: SecretBox::new(Box::new(
                user::Password::new("correct horse").unwrap(),
            )),
        }
    }

    #[tokio::test]
    async fn creates_user_with_hashed_password() {
        let svc = memory::service();

        let user = svc.execute(cmd("jane@example.com")).await.unwrap();

        assert!(user
            .password_hash
            .verify(&user::Password::new("correct horse").unwrap()));
        assert!(!user.password_hash.to_string().contains("correct horse"));

        let stored = svc
            .execute(query::user::ById::by(user.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.email, user.email);
    }

    #[tokio::test]
    async fn rejects_occupied_email() {
        let svc = memory::service();
        _ = svc.execute(cmd("jane@example.com")).await.unwrap();

        let err = svc.execute(cmd("jane@example.com")).await.unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::EmailOccupied(_)));
        assert_eq!(svc.database().users_count(), 1);
    }
}
