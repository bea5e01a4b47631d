// 託管後端的 client (PostgREST 資料 API 與密碼登入)

use crate::domain::model::{
    AuthUser, CizAdjustment, CizBalance, CizTransaction, Employee, EmployeePatch, Event,
    NewEmployee, NewEvent, Participation, Role, Session,
};
use crate::domain::ports::{AuthGateway, CizStore, EmployeeStore, EventStore};
use crate::utils::error::{CizError, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct BackendSettings {
    pub url: String,
    pub anon_key: String,
    pub service_key: Option<String>,
    pub timeout: Duration,
    pub import_rpc: String,
}

#[derive(Debug, Clone)]
pub struct RestBackend {
    client: Client,
    base_url: String,
    anon_key: String,
    service_key: Option<String>,
    import_rpc: String,
}

/// adjust_ciz 低於 p_floor 時 raise 的訊息
const INSUFFICIENT_CIZ_MESSAGE: &str = "insufficient_ciz";

#[derive(Deserialize)]
struct RoleRow {
    role: Role,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(alias = "msg", alias = "error_description")]
    message: Option<String>,
}

/// return=representation 的 INSERT 沒有回傳資料列時視為後端異常
fn missing_row(table: &str) -> CizError {
    CizError::BackendError {
        status: StatusCode::BAD_GATEWAY.as_u16(),
        message: format!("insert into {} returned no row", table),
    }
}

impl RestBackend {
    pub fn new(settings: BackendSettings) -> Result<Self> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self {
            client,
            base_url: settings.url.trim_end_matches('/').to_string(),
            anon_key: settings.anon_key,
            service_key: settings.service_key,
            import_rpc: settings.import_rpc,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn rpc_url(&self, function: &str) -> String {
        format!("{}/rest/v1/rpc/{}", self.base_url, function)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    /// 資料 API 請求: 有 service key 時用它繞過 row level security
    fn data_request(&self, method: Method, url: String) -> RequestBuilder {
        let bearer = self.service_key.as_deref().unwrap_or(&self.anon_key);
        self.client
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|body| body.message)
            .unwrap_or(text);

        tracing::debug!("Backend error {}: {}", status, message);
        Err(CizError::BackendError {
            status: status.as_u16(),
            message,
        })
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = Self::check(request.send().await?).await?;
        Ok(response.json().await?)
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, String)],
    ) -> Result<Vec<T>> {
        tracing::debug!("GET {} {:?}", table, filters);
        let request = self
            .data_request(Method::GET, self.table_url(table))
            .query(&[("select", "*")])
            .query(filters);
        self.fetch(request).await
    }

    async fn select_one<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, String)],
    ) -> Result<Option<T>> {
        let rows: Vec<T> = self.select(table, filters).await?;
        Ok(rows.into_iter().next())
    }
}

fn eq<T: std::fmt::Display>(value: T) -> String {
    format!("eq.{}", value)
}

#[async_trait]
impl EmployeeStore for RestBackend {
    async fn list_employees(&self) -> Result<Vec<Employee>> {
        self.select("employees", &[("order", "employee_number.asc".to_string())])
            .await
    }

    async fn find_employee(&self, id: i64) -> Result<Option<Employee>> {
        self.select_one("employees", &[("id", eq(id))]).await
    }

    async fn find_employee_by_user(&self, user_id: &str) -> Result<Option<Employee>> {
        self.select_one("employees", &[("user_id", eq(user_id))])
            .await
    }

    async fn update_employee(&self, id: i64, patch: &EmployeePatch) -> Result<Option<Employee>> {
        let request = self
            .data_request(Method::PATCH, self.table_url("employees"))
            .query(&[("id", eq(id))])
            .header("Prefer", "return=representation")
            .json(patch);
        let rows: Vec<Employee> = self.fetch(request).await?;
        Ok(rows.into_iter().next())
    }

    async fn delete_employee(&self, id: i64) -> Result<bool> {
        let request = self
            .data_request(Method::DELETE, self.table_url("employees"))
            .query(&[("id", eq(id))])
            .header("Prefer", "return=representation");
        let rows: Vec<serde_json::Value> = self.fetch(request).await?;
        Ok(!rows.is_empty())
    }

    async fn import_employees(&self, employees: &[NewEmployee]) -> Result<usize> {
        tracing::debug!(
            "POST rpc/{} with {} employees",
            self.import_rpc,
            employees.len()
        );
        let request = self
            .data_request(Method::POST, self.rpc_url(&self.import_rpc))
            .json(&json!({ "employees": employees }));
        let inserted: serde_json::Value = self.fetch(request).await?;

        // procedure 回傳寫入筆數；舊版回傳 void 時視為全部成功
        Ok(inserted
            .as_u64()
            .map(|n| n as usize)
            .unwrap_or(employees.len()))
    }
}

#[async_trait]
impl CizStore for RestBackend {
    async fn find_balance(&self, employee_id: i64) -> Result<Option<CizBalance>> {
        self.select_one("ciz_balances", &[("employee_id", eq(employee_id))])
            .await
    }

    async fn list_history(&self, employee_id: i64, limit: usize) -> Result<Vec<CizTransaction>> {
        self.select(
            "ciz_history",
            &[
                ("employee_id", eq(employee_id)),
                ("order", "created_at.desc".to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }

    async fn adjust(&self, adjustment: &CizAdjustment) -> Result<CizBalance> {
        let request = self
            .data_request(Method::POST, self.rpc_url("adjust_ciz"))
            .json(&json!({
                "p_employee_id": adjustment.employee_id,
                "p_delta": adjustment.delta,
                "p_reason": adjustment.reason,
                "p_floor": adjustment.floor,
            }));

        match self.fetch(request).await {
            Err(CizError::BackendError { message, .. })
                if message.contains(INSUFFICIENT_CIZ_MESSAGE) =>
            {
                // procedure 在交易內拒絕，回報當下的餘額
                let balance = self
                    .find_balance(adjustment.employee_id)
                    .await?
                    .map(|b| b.balance)
                    .unwrap_or(0);
                Err(CizError::InsufficientCiz {
                    balance,
                    requested: -adjustment.delta,
                })
            }
            other => other,
        }
    }
}

#[async_trait]
impl EventStore for RestBackend {
    async fn list_events(&self) -> Result<Vec<Event>> {
        self.select("events", &[("order", "starts_at.asc".to_string())])
            .await
    }

    async fn find_event(&self, id: i64) -> Result<Option<Event>> {
        self.select_one("events", &[("id", eq(id))]).await
    }

    async fn create_event(&self, event: &NewEvent) -> Result<Event> {
        let request = self
            .data_request(Method::POST, self.table_url("events"))
            .header("Prefer", "return=representation")
            .json(event);
        let rows: Vec<Event> = self.fetch(request).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| missing_row("events"))
    }

    async fn list_participants(&self, event_id: i64) -> Result<Vec<Participation>> {
        self.select(
            "event_participants",
            &[
                ("event_id", eq(event_id)),
                ("order", "joined_at.asc".to_string()),
            ],
        )
        .await
    }

    async fn find_participation(
        &self,
        event_id: i64,
        employee_id: i64,
    ) -> Result<Option<Participation>> {
        self.select_one(
            "event_participants",
            &[("event_id", eq(event_id)), ("employee_id", eq(employee_id))],
        )
        .await
    }

    async fn add_participant(&self, event_id: i64, employee_id: i64) -> Result<Participation> {
        let request = self
            .data_request(Method::POST, self.table_url("event_participants"))
            .header("Prefer", "return=representation")
            .json(&json!({ "event_id": event_id, "employee_id": employee_id }));

        let rows: Vec<Participation> = match self.fetch(request).await {
            Err(CizError::BackendError { status: 409, .. }) => {
                return Err(CizError::Conflict {
                    message: "既に参加登録されています".to_string(),
                })
            }
            other => other?,
        };
        rows.into_iter()
            .next()
            .ok_or_else(|| missing_row("event_participants"))
    }

    async fn set_attendance(
        &self,
        event_id: i64,
        employee_id: i64,
        attended: bool,
    ) -> Result<Participation> {
        let request = self
            .data_request(Method::PATCH, self.table_url("event_participants"))
            .query(&[("event_id", eq(event_id)), ("employee_id", eq(employee_id))])
            .header("Prefer", "return=representation")
            .json(&json!({ "attended": attended }));
        let rows: Vec<Participation> = self.fetch(request).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| CizError::not_found(format!("participant {} of event {}", employee_id, event_id)))
    }
}

#[async_trait]
impl AuthGateway for RestBackend {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let response = self
            .client
            .post(self.auth_url("token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        if matches!(
            response.status(),
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED
        ) {
            tracing::info!("Sign-in rejected for {}", email);
            return Err(CizError::Unauthorized);
        }

        Ok(Self::check(response).await?.json().await?)
    }

    async fn user_for_token(&self, access_token: &str) -> Result<AuthUser> {
        let response = self
            .client
            .get(self.auth_url("user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            return Err(CizError::Unauthorized);
        }

        Ok(Self::check(response).await?.json().await?)
    }

    async fn role_for(&self, user_id: &str) -> Result<Option<Role>> {
        let row: Option<RoleRow> = self
            .select_one("user_roles", &[("user_id", eq(user_id))])
            .await?;
        Ok(row.map(|r| r.role))
    }
}
