//! Controlador de autenticación
//!
//! Registro y login de clientes, login y alta de personal, refresco de
//! tokens y resolución del principal autenticado.

use sqlx::PgPool;
use tracing::{info, warn};
use validator::Validate;

use crate::dto::auth_dto::{
    AccessTokenResponse, AuthResponse, CreateAdminRequest, LoginRequest, MeResponse, Profile,
    RefreshTokenRequest, RegisterRequest,
};
use crate::dto::common_dto::ApiResponse;
use crate::models::{Actor, Admin, AdminRole, User};
use crate::repositories::admin_repository::{AdminRepository, NewAdmin};
use crate::repositories::loyalty_repository::LoyaltyRepository;
use crate::repositories::station_repository::StationRepository;
use crate::repositories::user_repository::UserRepository;
use crate::utils::errors::{bad_request_error, conflict_error, not_found_error, AppError};
use crate::utils::jwt::{
    generate_token, generate_token_pair, verify_token_of_type, JwtConfig, TokenType, CUSTOMER_ROLE,
};
use crate::utils::password::{hash_password, verify_password};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

pub struct AuthController {
    users: UserRepository,
    admins: AdminRepository,
    stations: StationRepository,
    loyalty: LoyaltyRepository,
    jwt: JwtConfig,
}

impl AuthController {
    pub fn new(pool: PgPool, jwt: JwtConfig) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            admins: AdminRepository::new(pool.clone()),
            stations: StationRepository::new(pool.clone()),
            loyalty: LoyaltyRepository::new(pool),
            jwt,
        }
    }

    /// Registro de cliente con su cuenta de fidelización en BASIC
    pub async fn register(&self, request: RegisterRequest) -> Result<ApiResponse<AuthResponse<User>>, AppError> {
        request.validate()?;

        if request.password != request.confirm_password {
            return Err(bad_request_error("Passwords do not match"));
        }

        let email = request.email.trim().to_lowercase();
        if self.users.email_exists(&email).await? {
            return Err(conflict_error("User", "email", &email));
        }

        let password_hash = hash_password(&request.password)?;
        let user = self
            .users
            .create(
                request.name.trim(),
                &email,
                request.phone.as_deref(),
                request.district.as_deref(),
                &password_hash,
            )
            .await?;

        self.loyalty.get_or_create(user.id).await?;

        info!("👤 Usuario registrado: {}", user.id);

        let actor = Actor::Customer { user_id: user.id };
        let response = AuthResponse {
            tokens: generate_token_pair(&actor, &self.jwt)?,
            role: CUSTOMER_ROLE.to_string(),
            profile: user,
        };

        Ok(ApiResponse::success_with_message(response, "User registered successfully"))
    }

    pub async fn login(&self, request: LoginRequest) -> Result<ApiResponse<AuthResponse<User>>, AppError> {
        request.validate()?;

        let user = self
            .users
            .find_by_email(request.email.trim())
            .await?
            .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        if !verify_password(&request.password, &user.password_hash)? {
            warn!("🔒 Login fallido para usuario {}", user.id);
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        if !user.is_active {
            return Err(AppError::Unauthorized("User account is inactive".to_string()));
        }

        let actor = Actor::Customer { user_id: user.id };
        let response = AuthResponse {
            tokens: generate_token_pair(&actor, &self.jwt)?,
            role: CUSTOMER_ROLE.to_string(),
            profile: user,
        };

        Ok(ApiResponse::success_with_message(response, "Login successful"))
    }

    /// Login de personal: el token lleva rol y estación
    pub async fn admin_login(&self, request: LoginRequest) -> Result<ApiResponse<AuthResponse<Admin>>, AppError> {
        request.validate()?;

        let admin = self
            .admins
            .find_by_email(request.email.trim())
            .await?
            .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        if !verify_password(&request.password, &admin.password_hash)? {
            warn!("🔒 Login fallido para admin {}", admin.id);
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        if !admin.is_active {
            return Err(AppError::Unauthorized("Admin account is inactive".to_string()));
        }

        let role = admin.role()?;
        let actor = Actor::Staff {
            admin_id: admin.id,
            role,
            station_id: admin.station_id,
        };
        let tokens = generate_token_pair(&actor, &self.jwt)?;
        self.admins.touch_last_login(admin.id).await?;

        info!("🔑 Login de admin {} ({})", admin.id, role);

        Ok(ApiResponse::success_with_message(
            AuthResponse {
                tokens,
                role: role.as_str().to_string(),
                profile: admin,
            },
            "Login successful",
        ))
    }

    /// Nuevo token de acceso a partir de un token de refresco
    pub async fn refresh(&self, request: RefreshTokenRequest) -> Result<ApiResponse<AccessTokenResponse>, AppError> {
        request.validate()?;

        let claims = verify_token_of_type(&request.refresh_token, TokenType::Refresh, &self.jwt)?;
        let actor = self.resolve_actor(claims.actor()?).await?;

        Ok(ApiResponse::success(AccessTokenResponse {
            access_token: generate_token(&actor, TokenType::Access, &self.jwt)?,
            token_type: "Bearer",
            expires_in: self.jwt.expiration,
        }))
    }

    /// Recargar el principal desde la base de datos
    ///
    /// El rol y la estación se toman de la fila actual, no del token, y
    /// las cuentas inactivas o borradas se rechazan.
    pub async fn resolve_actor(&self, claimed: Actor) -> Result<Actor, AppError> {
        match claimed {
            Actor::Customer { user_id } => {
                let user = self
                    .users
                    .find_by_id(user_id)
                    .await?
                    .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;

                if !user.is_active {
                    return Err(AppError::Unauthorized("User account is inactive".to_string()));
                }

                Ok(Actor::Customer { user_id: user.id })
            }
            Actor::Staff { admin_id, .. } => {
                let admin = self
                    .admins
                    .find_by_id(admin_id)
                    .await?
                    .ok_or_else(|| AppError::Unauthorized("Admin not found".to_string()))?;

                if !admin.is_active {
                    return Err(AppError::Unauthorized("Admin account is inactive".to_string()));
                }

                Ok(Actor::Staff {
                    admin_id: admin.id,
                    role: admin.role()?,
                    station_id: admin.station_id,
                })
            }
        }
    }

    pub async fn me(&self, actor: &Actor) -> Result<ApiResponse<MeResponse>, AppError> {
        let response = match actor {
            Actor::Customer { user_id } => {
                let user = self
                    .users
                    .find_by_id(*user_id)
                    .await?
                    .ok_or_else(|| not_found_error("User", &user_id.to_string()))?;
                MeResponse {
                    role: CUSTOMER_ROLE.to_string(),
                    profile: Profile::User(user),
                }
            }
            Actor::Staff { admin_id, role, .. } => {
                let admin = self
                    .admins
                    .find_by_id(*admin_id)
                    .await?
                    .ok_or_else(|| not_found_error("Admin", &admin_id.to_string()))?;
                MeResponse {
                    role: role.as_str().to_string(),
                    profile: Profile::Admin(admin),
                }
            }
        };

        Ok(ApiResponse::success(response))
    }

    /// Alta de personal (solo SUPER_ADMIN)
    pub async fn create_admin(
        &self,
        actor: &Actor,
        request: CreateAdminRequest,
    ) -> Result<ApiResponse<Admin>, AppError> {
        let creator_id = actor.require_role(&[AdminRole::SuperAdmin])?;
        request.validate()?;

        let email = request.email.trim().to_lowercase();
        if self.admins.email_exists(&email).await? {
            return Err(conflict_error("Admin", "email", &email));
        }

        if request.role == AdminRole::StationMaster {
            let station_id = request
                .station_id
                .ok_or_else(|| bad_request_error("Station masters must be assigned to a station"))?;
            if self.stations.find_by_id(station_id).await?.is_none() {
                return Err(not_found_error("Station", &station_id.to_string()));
            }
        }

        let password_hash = hash_password(&request.password)?;
        let admin = self
            .admins
            .create(NewAdmin {
                first_name: request.first_name.trim(),
                last_name: request.last_name.trim(),
                email: &email,
                phone_number: request.phone_number.as_deref(),
                password_hash: &password_hash,
                role: request.role,
                station_id: request.station_id,
                created_by: Some(creator_id),
            })
            .await?;

        info!("🛡️ Admin {} creado con rol {} por {}", admin.id, request.role, creator_id);

        Ok(ApiResponse::success_with_message(admin, "Admin created successfully"))
    }

    /// Crear el primer SUPER_ADMIN si todavía no existe ninguno
    pub async fn bootstrap_super_admin(&self, email: &str, password: &str) -> Result<Option<Admin>, AppError> {
        if self.admins.super_admin_exists().await? {
            return Ok(None);
        }

        let email = email.trim().to_lowercase();
        if self.admins.email_exists(&email).await? {
            warn!("⚠️ El email de bootstrap {} ya pertenece a otro admin", email);
            return Ok(None);
        }

        let password_hash = hash_password(password)?;
        let admin = self
            .admins
            .create(NewAdmin {
                first_name: "Super",
                last_name: "Admin",
                email: &email,
                phone_number: None,
                password_hash: &password_hash,
                role: AdminRole::SuperAdmin,
                station_id: None,
                created_by: None,
            })
            .await?;

        Ok(Some(admin))
    }
}
