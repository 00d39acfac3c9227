//! User API Handlers
//!
//! Registration is two-step: `register` parks the sign-up with an emailed
//! 6-digit code, `verify` turns it into a user row. Password reset follows
//! the same shape with an opaque token. Login always burns a fixed delay so
//! response timing says nothing about which usernames exist.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::{ensure_admin, load_user, parse_record_id};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{User, UserProfile, UserRole, UserUpdate};
use crate::db::repository::UserRepository;
use crate::services::mailer::{OutgoingMail, templates};
use crate::services::registration::{PendingRegistration, PendingReset};
use crate::utils::error::{AppError, AppResult};
use crate::utils::AppResponse;

/// Fixed cost for every login attempt, hit or miss
const LOGIN_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 30))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    pub phone_number: Option<String>,
    #[validate(length(min = 8))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 8))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Serialize)]
pub struct TokenCheck {
    pub valid: bool,
}

/// Best-effort background mail dispatch
fn dispatch_mail(state: &ServerState, to: String, subject: String, body: String) {
    let mailer = Arc::clone(&state.mailer);
    let from = state.config.default_from_email.clone();
    tokio::spawn(async move {
        let mail = OutgoingMail {
            from,
            to: vec![to],
            subject: subject.clone(),
            body,
        };
        if let Err(e) = mailer.send(mail).await {
            tracing::warn!("Failed to send mail '{subject}': {e}");
        }
    });
}

fn issue_token(state: &ServerState, user: &User) -> AppResult<String> {
    let id = user
        .id
        .as_ref()
        .ok_or_else(|| AppError::database("User record has no id"))?;
    state
        .jwt_service()
        .generate_token(&id.to_string(), &user.username, &user.email, user.role)
        .map_err(|e| AppError::internal(format!("Token generation failed: {e}")))
}

/// POST /api/users/register - park a sign-up and mail its code
pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<Json<AppResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let repo = UserRepository::new(state.db.clone());
    if repo.find_by_email(&payload.email).await?.is_some() {
        return Err(AppError::conflict("Email already registered"));
    }
    if repo.find_by_username(&payload.username).await?.is_some() {
        return Err(AppError::conflict("Username already taken"));
    }

    let hash_pass = User::hash_password(&payload.password)
        .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;
    let code = state.pending.generate_code()?;

    state.pending.put_registration(&PendingRegistration {
        username: payload.username.clone(),
        email: payload.email.clone(),
        phone_number: payload.phone_number,
        hash_pass,
        code: code.clone(),
    })?;

    dispatch_mail(
        &state,
        payload.email,
        "Your verification code".to_string(),
        templates::verification_code(&payload.username, &code),
    );

    Ok(Json(AppResponse {
        code: "OK".to_string(),
        message: "Verification code sent".to_string(),
    }))
}

/// POST /api/users/verify - redeem the code and create the account
pub async fn verify(
    State(state): State<ServerState>,
    Json(payload): Json<VerifyRequest>,
) -> AppResult<Json<AuthResponse>> {
    let pending = state
        .pending
        .get_registration(&payload.email)
        .ok_or_else(|| AppError::validation("No pending registration for this email"))?;

    if pending.code != payload.code {
        return Err(AppError::validation("Invalid verification code"));
    }

    let repo = UserRepository::new(state.db.clone());
    let user = repo
        .create(
            pending.username,
            pending.email.clone(),
            pending.phone_number,
            pending.hash_pass,
            UserRole::User,
        )
        .await?;
    state.pending.remove_registration(&pending.email);

    let token = issue_token(&state, &user)?;
    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

/// POST /api/users/login - authenticate and issue a token
pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    tokio::time::sleep(LOGIN_DELAY).await;

    let repo = UserRepository::new(state.db.clone());
    let user = repo
        .find_by_username(&payload.username)
        .await?
        .ok_or_else(AppError::invalid_credentials)?;

    let ok = user
        .verify_password(&payload.password)
        .map_err(|e| AppError::internal(format!("Password verification failed: {e}")))?;
    if !ok {
        return Err(AppError::invalid_credentials());
    }
    if !user.is_verified {
        return Err(AppError::validation("Account is not verified"));
    }

    let token = issue_token(&state, &user)?;
    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

/// GET /api/users/profile - current user's profile
pub async fn profile(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> AppResult<Json<UserProfile>> {
    let user = load_user(&state, &current).await?;
    Ok(Json(user.into()))
}

/// PUT|PATCH /api/users/profile - update the current user's profile
pub async fn update_profile(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(payload): Json<UserUpdate>,
) -> AppResult<Json<UserProfile>> {
    let mut user = load_user(&state, &current).await?;
    let repo = UserRepository::new(state.db.clone());

    if let Some(username) = payload.username
        && username != user.username
    {
        if repo.find_by_username(&username).await?.is_some() {
            return Err(AppError::conflict("Username already taken"));
        }
        user.username = username;
    }
    if let Some(email) = payload.email
        && email != user.email
    {
        if repo.find_by_email(&email).await?.is_some() {
            return Err(AppError::conflict("Email already registered"));
        }
        user.email = email;
    }
    if let Some(phone_number) = payload.phone_number {
        user.phone_number = Some(phone_number);
    }
    if let Some(password) = payload.password {
        if password.len() < 8 {
            return Err(AppError::validation(
                "Password must be at least 8 characters",
            ));
        }
        user.hash_pass = User::hash_password(&password)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;
    }

    let id = user
        .id
        .clone()
        .ok_or_else(|| AppError::database("User record has no id"))?;
    let updated = repo.update(&id, user).await?;
    Ok(Json(updated.into()))
}

/// DELETE /api/users/profile - delete the current user's account
pub async fn delete_account(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> AppResult<Json<AppResponse>> {
    let id = parse_record_id("user", &current.id)?;
    let repo = UserRepository::new(state.db.clone());
    repo.delete(&id).await?;

    Ok(Json(AppResponse {
        code: "OK".to_string(),
        message: "Account deleted".to_string(),
    }))
}

/// GET /api/users/all-users - all accounts (admin)
pub async fn list_users(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> AppResult<Json<Vec<UserProfile>>> {
    ensure_admin(&current)?;
    let repo = UserRepository::new(state.db.clone());
    let users = repo.find_all().await?;
    Ok(Json(users.into_iter().map(UserProfile::from).collect()))
}

/// DELETE /api/users/:id/delete - delete an account (admin); admins cannot delete
/// themselves or other admins through this route
pub async fn delete_user(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse>> {
    ensure_admin(&current)?;

    let target_id = parse_record_id("user", &id)?;
    let own_id = parse_record_id("user", &current.id)?;
    if target_id == own_id {
        return Err(AppError::validation(
            "Use the profile endpoint to delete your own account",
        ));
    }

    let repo = UserRepository::new(state.db.clone());
    let target = repo
        .find_by_id(&target_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {id} not found")))?;
    if target.is_admin() {
        return Err(AppError::forbidden("Cannot delete another admin account"));
    }

    repo.delete(&target_id).await?;
    Ok(Json(AppResponse {
        code: "OK".to_string(),
        message: "User deleted".to_string(),
    }))
}

/// POST /api/users/forgot-password - mail a reset link; the response never
/// reveals whether the account exists
pub async fn forgot_password(
    State(state): State<ServerState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> AppResult<Json<AppResponse>> {
    let repo = UserRepository::new(state.db.clone());
    if let Some(user) = repo.find_by_email(&payload.email).await?
        && let Some(id) = &user.id
    {
        let token = state.pending.generate_reset_token()?;
        state.pending.put_reset(
            &token,
            &PendingReset {
                user_id: id.to_string(),
                email: user.email.clone(),
            },
        )?;

        let reset_url = format!(
            "{}/reset-password/{token}",
            state.config.frontend_url.trim_end_matches('/')
        );
        dispatch_mail(
            &state,
            user.email.clone(),
            "Password reset".to_string(),
            templates::password_reset(&user.username, &reset_url),
        );
    }

    Ok(Json(AppResponse {
        code: "OK".to_string(),
        message: "If the account exists, a reset link has been sent".to_string(),
    }))
}

/// GET /api/users/reset-password/:token - is this link still valid?
pub async fn reset_password_check(
    State(state): State<ServerState>,
    Path(token): Path<String>,
) -> AppResult<Json<TokenCheck>> {
    Ok(Json(TokenCheck {
        valid: state.pending.get_reset(&token).is_some(),
    }))
}

/// POST /api/users/reset-password/:token - set the new password
pub async fn reset_password(
    State(state): State<ServerState>,
    Path(token): Path<String>,
    Json(payload): Json<ResetPasswordRequest>,
) -> AppResult<Json<AppResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let pending = state
        .pending
        .get_reset(&token)
        .ok_or_else(|| AppError::validation("Reset link is invalid or expired"))?;

    let user_id = parse_record_id("user", &pending.user_id)?;
    let repo = UserRepository::new(state.db.clone());
    let mut user = repo
        .find_by_id(&user_id)
        .await?
        .ok_or_else(|| AppError::not_found("Account no longer exists"))?;

    user.hash_pass = User::hash_password(&payload.password)
        .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;
    repo.update(&user_id, user).await?;
    state.pending.remove_reset(&token);

    Ok(Json(AppResponse {
        code: "OK".to_string(),
        message: "Password updated".to_string(),
    }))
}
