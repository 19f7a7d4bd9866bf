//! GraphQL [`Mutation`]s definitions.

use common::{Date, Money};
use juniper::graphql_object;
use service::{command, domain, Command as _};

use crate::{api, define_error, AsError, Context, Error, Session};

/// Root of all GraphQL mutations.
#[derive(Clone, Copy, Debug)]
pub struct Mutation;

impl Mutation {
    /// Name of the [`tracing::Span`] for the mutations.
    const SPAN_NAME: &'static str = "GraphQL mutation";
}

#[graphql_object(context = Context)]
impl Mutation {
    /// Registers a new `User` and signs it in.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `EMAIL_OCCUPIED` - provided `UserEmail` is occupied by another
    ///                      `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            email = %email,
            gql.name = "createUser",
            name = %name,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_user(
        name: api::user::Name,
        email: api::user::Email,
        password: api::user::Password,
        ctx: &Context,
    ) -> Result<api::user::session::CreateResult, Error> {
        let user = ctx
            .service()
            .execute(command::CreateUser {
                name: name.into(),
                email: email.into(),
                password: secrecy::SecretBox::init_with(move || {
                    password.into()
                }),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;
        let output = ctx
            .service()
            .execute(command::CreateUserSession::ByUserId(user.id))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        Ok(signed_in(ctx, output).await)
    }

    /// Signs in the `User` with the provided credentials.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `WRONG_CREDENTIALS` - provided credentials does not match any `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            email = %email,
            gql.name = "createUserSession",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_user_session(
        email: api::user::Email,
        password: api::user::Password,
        ctx: &Context,
    ) -> Result<api::user::session::CreateResult, Error> {
        // TODO: Execute in constant time to avoid user enumeration via
        //       timing attacks.
        //       https://en.wikipedia.org/wiki/Timing_attack
        let output = ctx
            .service()
            .execute(command::CreateUserSession::ByCredentials {
                email: email.into(),
                password: secrecy::SecretBox::init_with(move || {
                    password.into()
                }),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        Ok(signed_in(ctx, output).await)
    }

    /// Publishes a new `Listing` owned by the authenticated `User`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authorized;
    /// - `INVALID_GUESTS_COUNT` - the `maxGuests` is not a positive number;
    /// - `INVALID_PRICE` - the `price` is negative.
    #[expect(clippy::too_many_arguments, reason = "still readable")]
    #[tracing::instrument(
        skip_all,
        fields(
            city = %city,
            gql.name = "createListing",
            otel.name = Self::SPAN_NAME,
            title = %title,
        ),
    )]
    pub async fn create_listing(
        title: api::listing::Title,
        address: api::listing::Address,
        city: api::listing::City,
        phone: api::listing::Phone,
        description: api::listing::Description,
        perks: Vec<api::listing::Perk>,
        extra_info: api::listing::ExtraInfo,
        check_in: api::listing::Hour,
        check_out: api::listing::Hour,
        max_guests: i32,
        price: Money,
        photos: Vec<api::listing::Photo>,
        ctx: &Context,
    ) -> Result<api::Listing, Error> {
        let my_id = ctx.current_session().await?.user_id;
        let details = listing_details(
            title,
            address,
            city,
            phone,
            description,
            perks,
            extra_info,
            (check_in, check_out),
            max_guests,
            price,
            photos,
        )
        .map_err(ctx.error())?;

        ctx.service()
            .execute(command::CreateListing {
                owner_id: my_id.into(),
                details,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Overwrites all the details of the `Listing` with the provided ID.
    ///
    /// Only the owner of the `Listing` is allowed to update it.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authorized;
    /// - `INVALID_GUESTS_COUNT` - the `maxGuests` is not a positive number;
    /// - `INVALID_PRICE` - the `price` is negative;
    /// - `LISTING_NOT_EXISTS` - the `Listing` with the provided ID does not
    ///                          exist;
    /// - `NOT_LISTING_OWNER` - the authenticated `User` doesn't own the
    ///                         `Listing`.
    #[expect(clippy::too_many_arguments, reason = "still readable")]
    #[tracing::instrument(
        skip_all,
        fields(
            city = %city,
            gql.name = "updateListing",
            id = %id,
            otel.name = Self::SPAN_NAME,
            title = %title,
        ),
    )]
    pub async fn update_listing(
        id: api::listing::Id,
        title: api::listing::Title,
        address: api::listing::Address,
        city: api::listing::City,
        phone: api::listing::Phone,
        description: api::listing::Description,
        perks: Vec<api::listing::Perk>,
        extra_info: api::listing::ExtraInfo,
        check_in: api::listing::Hour,
        check_out: api::listing::Hour,
        max_guests: i32,
        price: Money,
        photos: Vec<api::listing::Photo>,
        ctx: &Context,
    ) -> Result<api::Listing, Error> {
        let my_id = ctx.current_session().await?.user_id;
        let details = listing_details(
            title,
            address,
            city,
            phone,
            description,
            perks,
            extra_info,
            (check_in, check_out),
            max_guests,
            price,
            photos,
        )
        .map_err(ctx.error())?;

        ctx.service()
            .execute(command::UpdateListing {
                listing_id: id.into(),
                requester_id: my_id.into(),
                details,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Books the `Listing` with the provided ID on behalf of the
    /// authenticated `User`.
    ///
    /// Depending on the server configuration, the provided `price` is either
    /// stored as is, or replaced with the one computed by the server.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authorized;
    /// - `INVALID_STAY` - the `checkOut` is not after the `checkIn`;
    /// - `INVALID_GUESTS_COUNT` - the `numberOfGuests` is not a positive
    ///                            number;
    /// - `INVALID_UNITS_COUNT` - the `units` is not a positive number;
    /// - `LISTING_NOT_EXISTS` - the `Listing` with the provided ID does not
    ///                          exist;
    /// - `INVALID_PRICE` - the recomputed price is too large.
    #[expect(clippy::too_many_arguments, reason = "still readable")]
    #[tracing::instrument(
        skip_all,
        fields(
            check_in = %check_in,
            check_out = %check_out,
            gql.name = "createBooking",
            listing_id = %listing_id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_booking(
        listing_id: api::listing::Id,
        check_in: Date,
        check_out: Date,
        number_of_guests: i32,
        guest_name: api::booking::GuestName,
        #[graphql(default = 1)] units: i32,
        price: Money,
        ctx: &Context,
    ) -> Result<api::Booking, Error> {
        let my_id = ctx.current_session().await?.user_id;

        let stay = domain::booking::Stay::new(check_in, check_out)
            .ok_or_else(|| api::ValidationError::Stay.into())
            .map_err(ctx.error())?;
        let num_guests = api::count(number_of_guests)
            .ok_or_else(|| api::ValidationError::GuestsCount.into())
            .map_err(ctx.error())?;
        let units = api::count(units)
            .ok_or_else(|| api::ValidationError::UnitsCount.into())
            .map_err(ctx.error())?;

        ctx.service()
            .execute(command::CreateBooking {
                user_id: my_id.into(),
                listing_id: listing_id.into(),
                stay,
                num_guests,
                units,
                guest_name: guest_name.into(),
                price,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }
}

/// Makes the created [`Session`] the current one for the rest of the
/// request.
async fn signed_in(
    ctx: &Context,
    output: command::create_user_session::Output,
) -> api::user::session::CreateResult {
    ctx.set_current_session(Session {
        user_id: output.user.id.into(),
        token: output.token.clone(),
        expires_at: output.expires_at.coerce(),
    })
    .await;
    output.into()
}

/// Assembles [`domain::listing::Details`] out of the provided GraphQL
/// arguments.
///
/// # Errors
///
/// If the `max_guests` or the `price` are out of their domain.
#[expect(clippy::too_many_arguments, reason = "still readable")]
fn listing_details(
    title: api::listing::Title,
    address: api::listing::Address,
    city: api::listing::City,
    phone: api::listing::Phone,
    description: api::listing::Description,
    perks: Vec<api::listing::Perk>,
    extra_info: api::listing::ExtraInfo,
    (check_in, check_out): (api::listing::Hour, api::listing::Hour),
    max_guests: i32,
    price: Money,
    photos: Vec<api::listing::Photo>,
) -> Result<domain::listing::Details, Error> {
    Ok(domain::listing::Details {
        title: title.into(),
        address: address.into(),
        city: city.into(),
        phone: phone.into(),
        description: description.into(),
        perks: domain::listing::Perks::new(perks.into_iter().map(Into::into)),
        extra_info: extra_info.into(),
        check_in: check_in.into(),
        check_out: check_out.into(),
        max_guests: api::count(max_guests)
            .ok_or(api::ValidationError::GuestsCount)?,
        price: domain::listing::Price::new(price)
            .ok_or(api::ValidationError::Price)?,
        photos: photos.into_iter().map(Into::into).collect(),
    })
}

impl AsError for command::create_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "EMAIL_OCCUPIED"]
                #[status = CONFLICT]
                #[message = "`UserEmail` is occupied by another `User`"]
                EmailOccupied,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::EmailOccupied(_) => Some(Error::EmailOccupied.into()),
            Self::PasswordHash(_) => None,
        }
    }
}

impl AsError for command::create_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "WRONG_CREDENTIALS"]
                #[status = FORBIDDEN]
                #[message = "Provided credentials does not match any `User`"]
                WrongCredentials,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::JsonWebTokenEncodeError(_) => None,
            Self::UserNotExists(_) | Self::WrongCredentials => {
                Some(Error::WrongCredentials.into())
            }
        }
    }
}

impl AsError for command::create_listing::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::UserNotExists(_) => {
                Some(api::query::UserError::NotExists.into())
            }
        }
    }
}

impl AsError for command::update_listing::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "NOT_LISTING_OWNER"]
                #[status = FORBIDDEN]
                #[message = "`Listing` is owned by another `User`"]
                NotOwner,
            }
        }

        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::ListingNotExists(_) => {
                api::query::ListingError::NotExists.into()
            }
            Self::NotOwner { .. } => Error::NotOwner.into(),
        })
    }
}

impl AsError for command::create_booking::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::ListingNotExists(_) => {
                Some(api::query::ListingError::NotExists.into())
            }
            Self::PriceOverflow => Some(api::ValidationError::Price.into()),
        }
    }
}
