use crate::domain::model::{Principal, Session};
use crate::domain::ports::{AuthGateway, EmployeeStore};
use crate::utils::error::{CizError, Result};
use std::sync::Arc;

pub struct AuthService<A: AuthGateway + ?Sized, E: EmployeeStore + ?Sized> {
    gateway: Arc<A>,
    employees: Arc<E>,
}

impl<A: AuthGateway + ?Sized, E: EmployeeStore + ?Sized> AuthService<A, E> {
    pub fn new(gateway: Arc<A>, employees: Arc<E>) -> Self {
        Self { gateway, employees }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(CizError::validation(
                "メールアドレスとパスワードを入力してください",
            ));
        }

        let session = self.gateway.sign_in(email, password).await?;
        tracing::info!("User {} signed in", session.user.id);
        Ok(session)
    }

    /// token -> 使用者、角色 (沒有 user_roles 資料時為 Member)、對應的社員
    pub async fn authenticate(&self, access_token: &str) -> Result<Principal> {
        if access_token.trim().is_empty() {
            return Err(CizError::Unauthorized);
        }

        let user = self.gateway.user_for_token(access_token).await?;
        let role = self.gateway.role_for(&user.id).await?.unwrap_or_default();
        let employee_id = self
            .employees
            .find_employee_by_user(&user.id)
            .await?
            .map(|e| e.id);

        Ok(Principal {
            user,
            role,
            employee_id,
        })
    }
}

pub fn require_admin(principal: &Principal) -> Result<()> {
    if principal.is_admin() {
        Ok(())
    } else {
        Err(CizError::Forbidden {
            message: format!("user {} is not an admin", principal.user.id),
        })
    }
}
