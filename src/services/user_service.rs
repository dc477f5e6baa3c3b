use chrono::Utc;
use sea_orm::*;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::models::dto::{CreateAdminRequest, CreateUserRequest, UpdateUserRequest};
use crate::models::users::{self, Column as UserColumn, Entity as Users};
use crate::permissions::Role;
use crate::utils::password;

pub struct UserService;

impl UserService {
    /// Crée un compte (inscription ou création par un admin).
    /// L'unicité de l'email est vérifiée sur les comptes actifs ET inactifs.
    pub async fn create_user(
        db: &DatabaseConnection,
        request: CreateUserRequest,
    ) -> Result<users::Model, ServiceError> {
        Self::insert_user(
            db,
            request.email,
            request.password,
            request.full_name,
            request.role,
            request.department,
            request.phone,
        )
        .await
    }

    /// Inscription publique (sans session). Le rôle admin ne peut jamais
    /// être attribué par cette voie : seul /auth/create-admin crée un
    /// admin sans session, et une seule fois.
    pub async fn register_user(
        db: &DatabaseConnection,
        request: CreateUserRequest,
    ) -> Result<users::Model, ServiceError> {
        if request.role == Role::Admin {
            return Err(ServiceError::Forbidden);
        }

        Self::create_user(db, request).await
    }

    /// Bootstrap du tout premier administrateur.
    /// Ne réussit que si aucun admin n'existe encore.
    pub async fn create_admin(
        db: &DatabaseConnection,
        request: CreateAdminRequest,
    ) -> Result<users::Model, ServiceError> {
        let admin_count = Users::find()
            .filter(UserColumn::Role.eq(Role::Admin))
            .count(db)
            .await?;

        if admin_count > 0 {
            return Err(ServiceError::Conflict(
                "Un administrateur existe déjà".to_string(),
            ));
        }

        Self::insert_user(
            db,
            request.email,
            request.password,
            request.full_name,
            Role::Admin,
            request.department,
            request.phone,
        )
        .await
    }

    async fn insert_user(
        db: &DatabaseConnection,
        email: String,
        password: String,
        full_name: String,
        role: Role,
        department: String,
        phone: Option<String>,
    ) -> Result<users::Model, ServiceError> {
        let existing = Users::find()
            .filter(UserColumn::Email.eq(&email))
            .one(db)
            .await?;

        if existing.is_some() {
            return Err(ServiceError::Conflict(
                "Cet email est déjà utilisé".to_string(),
            ));
        }

        let password_hash = password::hash_password(&password)
            .map_err(|e| ServiceError::Database(DbErr::Custom(e)))?;

        let new_user = users::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email),
            password_hash: Set(password_hash),
            full_name: Set(full_name),
            role: Set(role),
            department: Set(department),
            phone: Set(phone),
            is_active: Set(true),
            created_at: Set(Utc::now()),
            last_login: Set(None),
        };

        Ok(new_user.insert(db).await?)
    }

    /// Vérifie les identifiants et met à jour la date de dernière connexion.
    /// Email inconnu, compte désactivé et mot de passe faux renvoient tous
    /// la même erreur (pas d'indice sur la cause).
    pub async fn authenticate(
        db: &DatabaseConnection,
        email: &str,
        password: &str,
    ) -> Result<users::Model, ServiceError> {
        let user = Users::find()
            .filter(UserColumn::Email.eq(email))
            .filter(UserColumn::IsActive.eq(true))
            .one(db)
            .await?
            .ok_or(ServiceError::Unauthorized)?;

        if !password::verify_password(password, &user.password_hash) {
            return Err(ServiceError::Unauthorized);
        }

        let mut active: users::ActiveModel = user.into();
        active.last_login = Set(Some(Utc::now()));

        Ok(active.update(db).await?)
    }

    pub async fn get_user(db: &DatabaseConnection, id: Uuid) -> Result<users::Model, ServiceError> {
        Users::find_by_id(id)
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound("Utilisateur"))
    }

    /// Résout l'utilisateur d'une session vérifiée. Un compte supprimé ou
    /// désactivé après émission du cookie est traité comme une session
    /// invalide (401), jamais comme une ressource manquante.
    pub async fn current_user(
        db: &DatabaseConnection,
        id: Uuid,
    ) -> Result<users::Model, ServiceError> {
        let user = Users::find_by_id(id)
            .one(db)
            .await?
            .ok_or(ServiceError::Unauthorized)?;

        if !user.is_active {
            return Err(ServiceError::Unauthorized);
        }

        Ok(user)
    }

    pub async fn list_users(db: &DatabaseConnection) -> Result<Vec<users::Model>, ServiceError> {
        Ok(Users::find()
            .order_by_desc(UserColumn::CreatedAt)
            .all(db)
            .await?)
    }

    /// Met à jour les champs mutables d'un compte (nom, rôle, service,
    /// téléphone). Email et mot de passe ne passent jamais par ici.
    pub async fn update_user(
        db: &DatabaseConnection,
        id: Uuid,
        request: UpdateUserRequest,
    ) -> Result<users::Model, ServiceError> {
        let user = Self::get_user(db, id).await?;

        let mut active: users::ActiveModel = user.into();
        if let Some(full_name) = request.full_name {
            active.full_name = Set(full_name);
        }
        if let Some(role) = request.role {
            active.role = Set(role);
        }
        if let Some(department) = request.department {
            active.department = Set(department);
        }
        if let Some(phone) = request.phone {
            active.phone = Set(Some(phone));
        }

        Ok(active.update(db).await?)
    }

    /// Désactive un compte (soft-disable, jamais de suppression physique).
    /// Un acteur ne peut jamais désactiver son propre compte, quel que soit
    /// son rôle : la garde s'applique avant toute mutation.
    pub async fn deactivate_user(
        db: &DatabaseConnection,
        actor_id: Uuid,
        target_id: Uuid,
    ) -> Result<users::Model, ServiceError> {
        if actor_id == target_id {
            return Err(ServiceError::SelfDeactivation);
        }

        let user = Self::get_user(db, target_id).await?;

        let mut active: users::ActiveModel = user.into();
        active.is_active = Set(false);

        Ok(active.update(db).await?)
    }
}
