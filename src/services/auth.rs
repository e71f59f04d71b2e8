use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::{self, password, Claims};
use crate::config;
use crate::db::Database;
use crate::error::ApiError;
use crate::models::{Organization, Role, SafeUser, User};
use crate::repositories::{OrganizationRepository, UserRepository};
use crate::validation;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub organization_name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Shape shared by register and login responses
#[derive(Debug, Serialize)]
pub struct AuthPayload {
    pub token: String,
    pub user: SafeUser,
    pub organization: Organization,
}

/// Tenant onboarding and credential verification
pub struct AuthService {
    db: Database,
}

impl AuthService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Create a tenant and its admin user atomically, then issue a token.
    /// Both inserts run in one transaction so a failed user insert never
    /// leaves a dangling organization.
    pub async fn register(&self, input: RegisterInput) -> Result<AuthPayload, ApiError> {
        validation::validate_name("First name", &input.first_name)?;
        validation::validate_name("Last name", &input.last_name)?;
        validation::validate_email(&input.email)?;
        validation::validate_password(&input.password)?;
        validation::validate_name("Organization name", &input.organization_name)?;

        let email = input.email.trim().to_lowercase();
        let slug = validation::slugify(&input.organization_name);
        if slug.is_empty() {
            return Err(ApiError::validation("Organization name must contain letters or digits"));
        }

        let users = UserRepository::new(self.db.pool().clone());
        let orgs = OrganizationRepository::new(self.db.pool().clone());

        if users.email_taken(&email).await? {
            return Err(ApiError::conflict("Email already registered"));
        }
        if orgs.slug_taken(&slug).await? {
            return Err(ApiError::conflict("Organization name already taken"));
        }

        let password_hash = password::hash(&input.password)?;
        let now = Utc::now();

        let organization = Organization {
            id: Uuid::new_v4(),
            name: input.organization_name.trim().to_string(),
            slug,
            plan: "starter".to_string(),
            status: "active".to_string(),
            settings: Organization::default_settings(),
            billing_period_start: now,
            billing_period_end: now + Duration::days(30),
            created_at: now,
            updated_at: now,
        };

        let user = User {
            id: Uuid::new_v4(),
            organization_id: organization.id,
            email,
            password_hash,
            first_name: input.first_name.trim().to_string(),
            last_name: input.last_name.trim().to_string(),
            role: Role::Admin.as_str().to_string(),
            is_active: true,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.db.pool().begin().await?;
        let organization = OrganizationRepository::insert_tx(&mut tx, &organization).await?;
        let user = UserRepository::insert_tx(&mut tx, &user).await?;
        tx.commit().await?;

        info!(organization = %organization.slug, "Registered tenant");

        let token = self.issue_token(&user)?;
        Ok(AuthPayload {
            token,
            user: user.to_safe(),
            organization,
        })
    }

    /// Authenticate credentials. The failure message never reveals whether
    /// the email, password or account status was at fault.
    pub async fn login(&self, input: LoginInput) -> Result<AuthPayload, ApiError> {
        let users = UserRepository::new(self.db.pool().clone());

        let user = users
            .find_by_email(&input.email)
            .await?
            .ok_or_else(invalid_credentials)?;

        if !user.is_active {
            return Err(invalid_credentials());
        }
        if !password::verify(&input.password, &user.password_hash)? {
            return Err(invalid_credentials());
        }

        let now = Utc::now();
        users.set_last_login(user.id, now).await?;

        let organization = OrganizationRepository::new(self.db.pool().clone())
            .find_by_id(user.organization_id)
            .await?
            // A user without an organization is an integrity violation
            .ok_or_else(|| ApiError::not_found("Organization not found"))?;

        let mut user = user;
        user.last_login_at = Some(now);

        let token = self.issue_token(&user)?;
        Ok(AuthPayload {
            token,
            user: user.to_safe(),
            organization,
        })
    }

    /// Resolve verified claims to the current user and organization.
    /// Always sourced fresh from storage: deactivation revokes otherwise
    /// valid tokens, and role changes apply immediately.
    pub async fn verify(&self, claims: &Claims) -> Result<(User, Organization), ApiError> {
        let user = UserRepository::new(self.db.pool().clone())
            .find_by_id(claims.sub)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| ApiError::unauthorized("Invalid or expired token"))?;

        let organization = OrganizationRepository::new(self.db.pool().clone())
            .find_by_id(user.organization_id)
            .await?
            .ok_or_else(|| ApiError::unauthorized("Invalid or expired token"))?;

        Ok((user, organization))
    }

    fn issue_token(&self, user: &User) -> Result<String, ApiError> {
        let claims = Claims::new(
            user.id,
            user.email.clone(),
            user.organization_id,
            user.role.clone(),
            config::config().auth.token_ttl_days,
        );
        Ok(auth::issue_token(&claims)?)
    }
}

fn invalid_credentials() -> ApiError {
    ApiError::unauthorized("Invalid credentials")
}
