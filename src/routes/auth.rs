use crate::{
    auth::{generate_token, hash_password, verify_password, SignInRequest, SignInResponse, SignUpRequest},
    error::AppError,
    repository::UserRepository,
};
use actix_web::{post, web, HttpResponse, Responder};
use sqlx::PgPool;
use validator::Validate;

/// Sign up a new account
///
/// Creates a new user account and returns its public representation.
/// A duplicate email yields a 409 conflict with the constraint detail.
#[post("/sign-up")]
pub async fn sign_up(
    pool: web::Data<PgPool>,
    sign_up_data: web::Json<SignUpRequest>,
) -> Result<impl Responder, AppError> {
    // Validate input
    sign_up_data.validate()?;

    // Hash password
    let password_hash = hash_password(&sign_up_data.password)?;

    let users = UserRepository::new(pool.get_ref().clone());
    let user = users
        .create(&sign_up_data.email, &password_hash, &sign_up_data.name, false)
        .await?;

    log::info!("new account id={}", user.id);
    Ok(HttpResponse::Created().json(user))
}

/// Sign in
///
/// Authenticates a user by email and password and returns an access token.
/// A missing account, a wrong password and an inactive account are all the
/// same 401 to the caller.
#[post("/sign-in")]
pub async fn sign_in(
    pool: web::Data<PgPool>,
    sign_in_data: web::Json<SignInRequest>,
) -> Result<impl Responder, AppError> {
    // Validate input
    sign_in_data.validate()?;

    let users = UserRepository::new(pool.get_ref().clone());
    let user = users.find_by_email(&sign_in_data.email).await?;

    match user {
        Some(user) => {
            if !verify_password(&sign_in_data.password, &user.password)? {
                return Err(AppError::Unauthorized("Invalid credentials".into()));
            }
            if !user.is_active {
                return Err(AppError::Unauthorized("Invalid credentials".into()));
            }
            let access_token = generate_token(user.id)?;
            Ok(HttpResponse::Ok().json(SignInResponse {
                access_token,
                user_id: user.id,
            }))
        }
        None => Err(AppError::Unauthorized("Invalid credentials".into())),
    }
}
