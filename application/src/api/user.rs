//! [`User`]-related definitions.

use common::DateTime;
use derive_more::{AsRef, Display, From, Into};
use juniper::{graphql_object, GraphQLScalar};
use service::{domain, query, Query as _};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{
    api::{self, scalar},
    AsError, Context, Error,
};

/// Guest or host, loaded from the database on first access to any of its
/// fields except the ID.
#[derive(Clone, Debug)]
pub struct User {
    /// ID of this [`User`].
    pub id: Id,

    /// Loaded [`domain::User`].
    loaded: OnceCell<domain::User>,
}

impl From<domain::User> for User {
    fn from(user: domain::User) -> Self {
        Self {
            id: user.id.into(),
            loaded: OnceCell::from(user),
        }
    }
}

impl User {
    /// Refers to the [`User`] with the provided ID, without loading it.
    ///
    /// # Safety
    ///
    /// The [`User`] must exist, otherwise resolving any of its fields except
    /// the ID fails with `USER_NOT_EXISTS`.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            loaded: OnceCell::new(),
        }
    }

    /// Loads the [`domain::User`] once per this [`User`].
    async fn load(&self, ctx: &Context) -> Result<&domain::User, Error> {
        self.loaded
            .get_or_try_init(|| async {
                let found = ctx
                    .service()
                    .execute(query::user::ById::by(self.id.into()))
                    .await
                    .map_err(AsError::into_error)
                    .map_err(ctx.error())?;
                found.ok_or_else(|| {
                    ctx.error()(api::query::UserError::NotExists.into())
                })
            })
            .await
    }
}

/// Guest or host of the platform.
#[graphql_object(context = Context)]
impl User {
    /// Unique identifier of this `User`.
    pub fn id(&self) -> Id {
        self.id
    }

    /// Display name of this `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.name",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn name(&self, ctx: &Context) -> Result<Name, Error> {
        self.load(ctx).await.map(|u| Name(u.name.clone()))
    }

    /// Email of this `User`.
    ///
    /// `null` unless the request is authorized as this very `User`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authorized.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.email",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn email(&self, ctx: &Context) -> Result<Option<Email>, Error> {
        if ctx.current_session().await?.user_id != self.id {
            return Ok(None);
        }
        self.load(ctx).await.map(|u| Some(Email(u.email.clone())))
    }

    /// `Listing`s published by this `User`, in creation order.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.listings",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn listings(
        &self,
        ctx: &Context,
    ) -> Result<Vec<api::Listing>, Error> {
        let listings = ctx
            .service()
            .execute(query::listings::ByOwner::by(self.id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;
        Ok(listings.into_iter().map(Into::into).collect())
    }

    /// `DateTime` when this `User` signed up.
    pub async fn created_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        self.load(ctx).await.map(|u| u.created_at.coerce())
    }
}

/// Unique identifier of a `User`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::user::Id)]
#[into(domain::user::Id)]
#[graphql(name = "UserId", transparent)]
pub struct Id(Uuid);

/// Display name of a `User`: non-empty, without surrounding whitespace.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(name = "UserName", with = scalar::Via::<domain::user::Name>)]
pub struct Name(domain::user::Name);

/// Password of a `User`: from 1 to 128 bytes.
#[derive(AsRef, Clone, Debug, From, GraphQLScalar, Into)]
#[graphql(
    name = "UserPassword",
    with = scalar::Via::<domain::user::Password>,
)]
pub struct Password(domain::user::Password);

/// Email address of a `User`, unique across all `User`s.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(name = "UserEmail", with = scalar::Via::<domain::user::Email>)]
pub struct Email(domain::user::Email);

pub mod session {
    //! [`Session`]-related definitions.
    //!
    //! [`Session`]: crate::Session

    use common::DateTime;
    use derive_more::{AsRef, From, Into};
    use juniper::{GraphQLObject, GraphQLScalar};
    use service::{command::create_user_session, domain::user::session};

    use crate::{
        api::{self, scalar},
        Context,
    };

    /// Opaque access token of a `User` session.
    #[derive(AsRef, Clone, Debug, From, GraphQLScalar, Into)]
    #[graphql(name = "UserAuthToken", with = scalar::Via::<session::Token>)]
    pub struct Token(session::Token);

    /// Session issued on sign up or sign in.
    #[derive(Clone, Debug, GraphQLObject)]
    #[graphql(context = Context, name = "CreateSessionResult")]
    pub struct CreateResult {
        /// Access token to present in the `Authorization: Bearer` header or
        /// the `token` cookie.
        pub token: Token,

        /// `User` the session is issued for.
        pub user: api::User,

        /// `DateTime` after which the `token` is rejected.
        pub expires_at: DateTime,
    }

    impl From<create_user_session::Output> for CreateResult {
        fn from(out: create_user_session::Output) -> Self {
            Self {
                token: Token(out.token),
                user: out.user.into(),
                expires_at: out.expires_at.coerce(),
            }
        }
    }
}
