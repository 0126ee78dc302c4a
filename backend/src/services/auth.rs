//! Authentication service for admin and driver accounts

use std::sync::Arc;

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::config::{BootstrapConfig, Config};
use crate::error::{AppError, AppResult};
use crate::models::{Admin, AdminRole, Driver, VehicleInfo};
use crate::store::{DataStore, NewAdmin, NewDriver};
use shared::{normalize_phone, validate_password, validate_phone};

const INVALID_CREDENTIALS: &str = "Invalid credentials";
const ACCOUNT_DISABLED: &str = "Account is disabled";

/// Which account table a token belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    Admin,
    Driver,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Account ID
    pub kind: AccountKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Debug, Deserialize)]
pub struct AdminLoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverLoginInput {
    pub phone_number: String,
    pub password: String,
}

/// Driver self-registration
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterDriverInput {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,
    pub phone_number: String,
    #[validate(length(min = 1, max = 50, message = "License number is required"))]
    pub license_number: String,
    pub password: String,
    #[serde(default)]
    pub vehicle: VehicleInfo,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSession {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub admin: Admin,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverSession {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub driver: Driver,
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn DataStore>,
    jwt_secret: String,
    admin_token_expiry: i64,
    driver_token_expiry: i64,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(store: Arc<dyn DataStore>, config: &Config) -> Self {
        Self {
            store,
            jwt_secret: config.jwt.secret.clone(),
            admin_token_expiry: config.jwt.admin_token_expiry,
            driver_token_expiry: config.jwt.driver_token_expiry,
        }
    }

    /// Authenticate an admin with email and password
    pub async fn admin_login(&self, input: AdminLoginInput) -> AppResult<AdminSession> {
        let email = input.email.trim().to_lowercase();
        let (admin, password_hash) = self
            .store
            .find_admin_credentials(&email)
            .await?
            .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        if !verify_password(&input.password, &password_hash)? {
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }
        if !admin.is_active {
            return Err(AppError::Unauthorized(ACCOUNT_DISABLED.to_string()));
        }

        let token = self.issue_token(
            admin.id,
            AccountKind::Admin,
            Some(admin.role.as_str()),
            self.admin_token_expiry,
        )?;
        tracing::info!(admin_id = %admin.id, "Admin logged in");

        Ok(AdminSession {
            token,
            token_type: "Bearer".to_string(),
            expires_in: self.admin_token_expiry,
            admin,
        })
    }

    /// Authenticate a driver with phone number and password
    pub async fn driver_login(&self, input: DriverLoginInput) -> AppResult<DriverSession> {
        let phone_number = normalize_phone(&input.phone_number);
        let (driver, password_hash) = self
            .store
            .find_driver_credentials(&phone_number)
            .await?
            .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        if !verify_password(&input.password, &password_hash)? {
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }
        if !driver.is_active {
            return Err(AppError::Unauthorized(ACCOUNT_DISABLED.to_string()));
        }

        let token = self.issue_token(
            driver.id,
            AccountKind::Driver,
            None,
            self.driver_token_expiry,
        )?;
        tracing::info!(driver_id = %driver.id, "Driver logged in");

        Ok(DriverSession {
            token,
            token_type: "Bearer".to_string(),
            expires_in: self.driver_token_expiry,
            driver,
        })
    }

    /// Driver self-registration; the account waits for admin activation
    pub async fn register_driver(&self, input: RegisterDriverInput) -> AppResult<Driver> {
        let driver = new_driver(input, false)?;
        let driver = self.store.insert_driver(driver).await?;
        tracing::info!(driver_id = %driver.id, "Driver registered");
        Ok(driver)
    }

    /// Validate access token and return claims
    pub fn validate_token(&self, token: &str) -> AppResult<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))?;

        Ok(token_data.claims)
    }

    /// Create the configured super admin if it does not exist yet
    pub async fn ensure_bootstrap_admin(
        &self,
        bootstrap: &BootstrapConfig,
    ) -> AppResult<Option<Admin>> {
        let (Some(email), Some(password)) = (&bootstrap.admin_email, &bootstrap.admin_password)
        else {
            return Ok(None);
        };
        let email = email.trim().to_lowercase();

        if self.store.find_admin_credentials(&email).await?.is_some() {
            return Ok(None);
        }

        validate_password(password).map_err(AppError::validation)?;
        let admin = self
            .store
            .insert_admin(NewAdmin {
                name: bootstrap
                    .admin_name
                    .clone()
                    .unwrap_or_else(|| "Super Admin".to_string()),
                email,
                password_hash: hash_password(password)?,
                role: AdminRole::SuperAdmin,
            })
            .await?;

        tracing::info!(admin_id = %admin.id, "Bootstrap super admin created");
        Ok(Some(admin))
    }

    /// Sign a token for an account
    pub fn issue_token(
        &self,
        account_id: Uuid,
        kind: AccountKind,
        role: Option<&str>,
        expiry_seconds: i64,
    ) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: account_id.to_string(),
            kind,
            role: role.map(str::to_string),
            exp: (now + Duration::seconds(expiry_seconds)).timestamp(),
            iat: now.timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
    }
}

/// Validate a registration and hash its password
pub(crate) fn new_driver(input: RegisterDriverInput, approved: bool) -> AppResult<NewDriver> {
    input.validate()?;

    let mut errors = Vec::new();
    if let Err(msg) = validate_phone(&input.phone_number) {
        errors.push(msg.to_string());
    }
    if let Err(msg) = validate_password(&input.password) {
        errors.push(msg.to_string());
    }
    if !errors.is_empty() {
        return Err(AppError::ValidationErrors(errors));
    }

    Ok(NewDriver {
        name: input.name.trim().to_string(),
        phone_number: normalize_phone(&input.phone_number),
        license_number: input.license_number.trim().to_string(),
        password_hash: hash_password(&input.password)?,
        vehicle: input.vehicle,
        is_active: approved,
        is_verified: approved,
    })
}

pub fn hash_password(password: &str) -> AppResult<String> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

fn verify_password(password: &str, password_hash: &str) -> AppResult<bool> {
    verify(password, password_hash)
        .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))
}
