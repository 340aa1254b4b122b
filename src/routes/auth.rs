use crate::{
    auth::{LoginRequest, RegisterRequest},
    error::AppError,
    response::ApiResponse,
    services::AuthService,
};
use actix_web::{post, web, HttpResponse, Responder};
use validator::Validate;

/// Register a new user
///
/// `201` with `{user_id, user_email, createdAt}`; `409` when the email is
/// taken; `400` on validation failure. Registration never logs the user in.
#[post("/register")]
pub async fn register(
    auth: web::Data<AuthService>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;

    let user = auth
        .register(&register_data.email, &register_data.password)
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(user, "User registered successfully!")))
}

/// Login user
///
/// `200` with `{access_token}`; `401` with the same message whether the email
/// is unknown or the password is wrong. Mounted behind the login limiter.
pub async fn login(
    auth: web::Data<AuthService>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;

    let token = auth.login(&login_data.email, &login_data.password).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(token, "User signed in successfully")))
}
