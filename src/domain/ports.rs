use crate::domain::model::{
    AuthUser, CizAdjustment, CizBalance, CizTransaction, Employee, EmployeePatch, Event,
    ImportSummary, NewEmployee, NewEvent, Participation, RawEmployee, Role, Session,
};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// 匯入流程需要的設定
pub trait ConfigProvider: Send + Sync {
    fn max_rows(&self) -> usize;
    fn batch_size(&self) -> usize;
    fn fallback_encoding(&self) -> &str;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<RawEmployee>>;
    async fn transform(&self, rows: Vec<RawEmployee>) -> Result<Vec<NewEmployee>>;
    async fn load(&self, employees: Vec<NewEmployee>) -> Result<ImportSummary>;
}

#[async_trait]
pub trait EmployeeStore: Send + Sync {
    async fn list_employees(&self) -> Result<Vec<Employee>>;

    async fn find_employee(&self, id: i64) -> Result<Option<Employee>>;

    async fn find_employee_by_user(&self, user_id: &str) -> Result<Option<Employee>>;

    /// 回傳更新後的資料，不存在時為 None
    async fn update_employee(&self, id: i64, patch: &EmployeePatch) -> Result<Option<Employee>>;

    /// 回傳是否有資料被刪除
    async fn delete_employee(&self, id: i64) -> Result<bool>;

    /// 透過 stored procedure 一次寫入多筆，回傳寫入筆數
    async fn import_employees(&self, employees: &[NewEmployee]) -> Result<usize>;
}

#[async_trait]
pub trait CizStore: Send + Sync {
    async fn find_balance(&self, employee_id: i64) -> Result<Option<CizBalance>>;

    async fn list_history(&self, employee_id: i64, limit: usize) -> Result<Vec<CizTransaction>>;

    /// 餘額更新與歷史紀錄由後端在同一個交易內完成
    async fn adjust(&self, adjustment: &CizAdjustment) -> Result<CizBalance>;
}

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn list_events(&self) -> Result<Vec<Event>>;

    async fn find_event(&self, id: i64) -> Result<Option<Event>>;

    async fn create_event(&self, event: &NewEvent) -> Result<Event>;

    async fn list_participants(&self, event_id: i64) -> Result<Vec<Participation>>;

    async fn find_participation(
        &self,
        event_id: i64,
        employee_id: i64,
    ) -> Result<Option<Participation>>;

    async fn add_participant(&self, event_id: i64, employee_id: i64) -> Result<Participation>;

    async fn set_attendance(
        &self,
        event_id: i64,
        employee_id: i64,
        attended: bool,
    ) -> Result<Participation>;
}

#[async_trait]
pub trait AuthGateway: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session>;

    async fn user_for_token(&self, access_token: &str) -> Result<AuthUser>;

    async fn role_for(&self, user_id: &str) -> Result<Option<Role>>;
}
