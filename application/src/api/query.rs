//! GraphQL [`Query`]s definitions.

use common::Date;
use juniper::graphql_object;
use service::{query, read, Query as _};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL queries.
#[derive(Clone, Copy, Debug)]
pub struct Query;

impl Query {
    /// Name of the [`tracing::Span`] for the queries.
    pub(crate) const SPAN_NAME: &'static str = "GraphQL query";
}

#[graphql_object(context = Context)]
impl Query {
    /// Returns the currently authenticated `User`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authorized.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "myUser",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn my_user(ctx: &Context) -> Result<api::User, Error> {
        let my_id = ctx.current_session().await?.user_id;
        ctx.service()
            .execute(query::user::ById::by(my_id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| UserError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the `Listing` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `LISTING_NOT_EXISTS` - the `Listing` with the specified ID does not
    ///                          exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "listing",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn listing(
        id: api::listing::Id,
        ctx: &Context,
    ) -> Result<api::Listing, Error> {
        ctx.service()
            .execute(query::listing::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| ListingError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns all the `Listing`s, oldest first.
    ///
    /// When `city` is provided, only `Listing`s whose city contains any of
    /// its words (case-insensitively) are returned. When `guests` is
    /// provided, only `Listing`s accommodating at least that many guests are
    /// returned.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_GUESTS_COUNT` - the `guests` is not a positive number.
    #[tracing::instrument(
        skip_all,
        fields(
            city = ?city.as_ref().map(ToString::to_string),
            gql.name = "listings",
            guests = ?guests,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn listings(
        city: Option<api::listing::City>,
        guests: Option<i32>,
        ctx: &Context,
    ) -> Result<Vec<api::Listing>, Error> {
        let guests = guests
            .map(|g| api::count(g).ok_or(api::ValidationError::GuestsCount))
            .transpose()
            .map_err(Error::from)
            .map_err(ctx.error())?;

        let listings = if city.is_none() && guests.is_none() {
            ctx.service().execute(query::listings::All::by(())).await
        } else {
            ctx.service()
                .execute(query::listings::Search::by(
                    read::listing::list::Filter {
                        city: city.map(Into::into),
                        guests,
                    },
                ))
                .await
        };
        listings
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|ls| ls.into_iter().map(Into::into).collect())
    }

    /// Returns the `Listing`s owned by the currently authenticated `User`,
    /// oldest first.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authorized.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "myListings",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn my_listings(
        ctx: &Context,
    ) -> Result<Vec<api::Listing>, Error> {
        let my_id = ctx.current_session().await?.user_id;
        ctx.service()
            .execute(query::listings::ByOwner::by(my_id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|ls| ls.into_iter().map(Into::into).collect())
    }

    /// Prices a prospective stay at the `Listing` with the specified ID.
    ///
    /// Dates are not validated: a `checkOut` not after the `checkIn` results
    /// in zero or negative nights.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `LISTING_NOT_EXISTS` - the `Listing` with the specified ID does not
    ///                          exist;
    /// - `INVALID_UNITS_COUNT` - the `units` is not a positive number;
    /// - `INVALID_PRICE` - the quoted price is too large.
    #[tracing::instrument(
        skip_all,
        fields(
            check_in = %check_in,
            check_out = %check_out,
            gql.name = "bookingQuote",
            listing_id = %listing_id,
            otel.name = Self::SPAN_NAME,
            units = %units,
        ),
    )]
    pub async fn booking_quote(
        listing_id: api::listing::Id,
        check_in: Date,
        check_out: Date,
        #[graphql(default = 1)] units: i32,
        ctx: &Context,
    ) -> Result<api::listing::Quote, Error> {
        let units = api::count(units)
            .ok_or_else(|| api::ValidationError::UnitsCount.into())
            .map_err(ctx.error())?;

        ctx.service()
            .execute(query::quote::Quote {
                listing_id: listing_id.into(),
                check_in,
                check_out,
                units,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| ListingError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the `Booking`s made by the currently authenticated `User`,
    /// newest first.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authorized.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "myBookings",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn my_bookings(
        ctx: &Context,
    ) -> Result<Vec<api::Booking>, Error> {
        let my_id = ctx.current_session().await?.user_id;
        ctx.service()
            .execute(query::bookings::ByUser(my_id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|bs| bs.into_iter().map(Into::into).collect())
    }
}

define_error! {
    enum ListingError {
        #[code = "LISTING_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Listing` with the specified ID does not exist"]
        NotExists,
    }
}

define_error! {
    enum UserError {
        #[code = "USER_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`User` with the specified ID does not exist"]
        NotExists,
    }
}

impl AsError for query::quote::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::PriceOverflow => Some(api::ValidationError::Price.into()),
        }
    }
}
