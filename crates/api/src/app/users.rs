use std::sync::Arc;

use chrono::Utc;

use roster_auth::{
    NewUser, PasswordHasher, Principal, Role, UserPatch, ensure_can_assign, ensure_can_edit, require_role,
};
use roster_core::{DomainError, UserId};
use roster_infra::{AuditLog, MailConfig, Mailer, OutgoingMail, UserQuery, UserStore, secrets, templates};

use crate::app::dto::{AuditLogQuery, AuditLogResponse, Reply, UserListQuery, UserListResponse};
use crate::app::errors::ServiceError;

pub const USERS_PER_PAGE: usize = 10;
pub const AUDIT_PER_PAGE: usize = 15;

/// Panel user administration. Mutations are reserved to administrators and
/// bounded by the role hierarchy.
#[derive(Clone)]
pub struct UserAdminService {
    users: Arc<dyn UserStore>,
    audit: Arc<dyn AuditLog>,
    mailer: Arc<dyn Mailer>,
    hasher: Arc<dyn PasswordHasher>,
    mail: MailConfig,
}

impl UserAdminService {
    pub fn new(
        users: Arc<dyn UserStore>,
        audit: Arc<dyn AuditLog>,
        mailer: Arc<dyn Mailer>,
        hasher: Arc<dyn PasswordHasher>,
        mail: MailConfig,
    ) -> Self {
        Self {
            users,
            audit,
            mailer,
            hasher,
            mail,
        }
    }

    /// Reload the caller from the store so role changes apply immediately.
    fn actor(&self, principal: &Principal) -> Result<Principal, ServiceError> {
        let user = self
            .users
            .get(principal.user_id)?
            .ok_or_else(|| ServiceError::NotFound("Usuário não encontrado".into()))?;
        Ok(Principal::new(user.id, user.username, user.role))
    }

    fn admin(&self, principal: &Principal) -> Result<Principal, ServiceError> {
        let actor = self.actor(principal)?;
        require_role(&actor, &[Role::ADMINISTRADOR])?;
        Ok(actor)
    }

    fn record(&self, message: String) {
        if let Err(e) = self.audit.record(message) {
            tracing::error!(error = %e, "audit entry not recorded");
        }
    }

    pub fn list_users(&self, principal: &Principal, query: &UserListQuery) -> Result<UserListResponse, ServiceError> {
        self.actor(principal)?;
        let page = query.page.unwrap_or(1).max(1);
        let listing = self.users.list(&UserQuery {
            search: query.search.clone(),
            status: query.status,
            role: query.role.clone(),
            page,
            per_page: USERS_PER_PAGE,
        })?;

        Ok(UserListResponse {
            total_pages: listing.total_pages(USERS_PER_PAGE),
            users: listing.items,
            page,
        })
    }

    pub fn list_roles(&self) -> Result<Vec<Role>, ServiceError> {
        let mut roles = self.users.roles()?;
        roles.sort();
        Ok(roles)
    }

    pub async fn create_user(&self, principal: &Principal, input: NewUser) -> Result<Reply, ServiceError> {
        let actor = self.admin(principal)?;
        input.validate().map_err(|e| match e {
            DomainError::Validation(msg) if msg == "missing required fields" => {
                ServiceError::BadRequest("Campos obrigatórios ausentes".into())
            }
            other => other.into(),
        })?;

        let email = input.email.as_deref().unwrap_or_default().trim().to_string();
        if self.users.email_taken(&email, None)? {
            return Err(ServiceError::Conflict("Email já cadastrado".into()));
        }

        let role = input
            .requested_role()
            .cloned()
            .ok_or_else(|| ServiceError::BadRequest("Campos obrigatórios ausentes".into()))?;
        if ensure_can_assign(&actor, &role).is_err() {
            return Err(ServiceError::Forbidden(
                "Você não tem permissão para criar um usuário com este perfil.".into(),
            ));
        }
        if !self.users.role_exists(&role)? {
            return Err(ServiceError::BadRequest("Perfil inválido".into()));
        }

        let temporary_password = secrets::temporary_password();
        let hash = self.hasher.hash(&temporary_password)?;
        let id = self.users.next_id()?;
        let user = input.into_user(id, hash, Utc::now())?;
        self.users.insert(user.clone())?;

        self.record(format!(
            "{} criou um novo usuário: Usuário criado: id={}, username='{}', email='{}', Perfil de usuario='{}'",
            actor.username, user.id, user.username, user.email, user.role
        ));
        tracing::info!(actor = %actor.user_id, user_id = %user.id, role = %user.role, "user created");

        let welcome = OutgoingMail {
            to: user.email.clone(),
            from: self.mail.default_sender.clone(),
            subject: templates::WELCOME_SUBJECT.into(),
            html_body: templates::welcome(&user.username, &user.email, &temporary_password),
        };
        if let Err(e) = self.mailer.send(welcome).await {
            tracing::warn!(user_id = %user.id, error = %e, "welcome mail not sent");
        }

        Ok(Reply::created("Usuário criado com sucesso. A senha foi enviada por e-mail."))
    }

    pub fn update_user(&self, principal: &Principal, id: UserId, patch: UserPatch) -> Result<Reply, ServiceError> {
        let actor = self.admin(principal)?;
        let mut target = self
            .users
            .get(id)?
            .ok_or_else(|| ServiceError::NotFound("Usuário não encontrado".into()))?;

        ensure_can_edit(&actor, &target)?;
        if let Some(role) = &patch.role {
            ensure_can_assign(&actor, role)?;
        }
        if let Some(email) = &patch.email {
            if self.users.email_taken(email.trim(), Some(id))? {
                return Err(ServiceError::Conflict("Email já em uso por outro usuário".into()));
            }
        }
        if let Some(role) = &patch.role {
            if !self.users.role_exists(role)? {
                return Err(ServiceError::BadRequest("Perfil inválido".into()));
            }
        }
        if patch.is_empty() {
            return Err(ServiceError::BadRequest("Nenhum dado para atualizar".into()));
        }
        patch.validate()?;

        target.apply(&patch);
        self.users.update(&target)?;

        self.record(format!(
            "{} editou o Usuário : id={}, {}",
            actor.username,
            id,
            patch.describe()
        ));
        tracing::info!(actor = %actor.user_id, user_id = %id, "user updated");

        Ok(Reply::ok("Usuário atualizado com sucesso"))
    }

    pub fn list_audit_log(&self, principal: &Principal, query: &AuditLogQuery) -> Result<AuditLogResponse, ServiceError> {
        self.admin(principal)?;
        let page = query.page.unwrap_or(1).max(1);
        let listing = self.audit.list(query.search.as_deref(), page, AUDIT_PER_PAGE)?;

        Ok(AuditLogResponse {
            logs: listing.items,
            page,
            per_page: AUDIT_PER_PAGE,
            total: listing.total,
        })
    }
}
