//! Request extractors and middleware.
//!
//! - [`auth`]: session token extraction and the [`auth::AuthUser`] extractor
//! - [`role`]: role gates, as extractors and as route middleware
//! - [`policy`]: the ownership rule for bootcamps, courses and reviews
//! - [`extract`]: path id and listing query extractors
//!
//! # Authentication flow
//!
//! 1. The client sends `Authorization: Bearer <token>` or the `token` cookie
//! 2. [`auth::AuthUser`] verifies the token and loads the user row
//! 3. A role gate checks the user's role
//! 4. The handler applies [`policy::authorize_owner`] before mutating an
//!    owned resource
//!
//! ```ignore
//! async fn update_bootcamp(
//!     State(state): State<AppState>,
//!     RequirePublisher(auth_user): RequirePublisher,
//!     ResourceId(id): ResourceId,
//!     ValidatedJson(dto): ValidatedJson<UpdateBootcampDto>,
//! ) -> Result<Json<ApiResponse<Bootcamp>>, AppError> {
//!     let bootcamp = BootcampService::get_bootcamp(&state.db, id).await?;
//!     authorize_owner(&auth_user, &bootcamp, Action::Update)?;
//!     // ...
//! }
//! ```

pub mod auth;
pub mod extract;
pub mod policy;
pub mod role;
