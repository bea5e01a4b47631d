// 單元測試用的記憶體後端，實作所有 port

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::RwLock;

pub use crate::adapters::storage::MemoryStorage;
use crate::domain::model::{
    AuthUser, CizAdjustment, CizBalance, CizTransaction, Employee, EmployeePatch, Event, Gender,
    NewEmployee, NewEvent, Participation, Role, Session,
};
use crate::domain::ports::{AuthGateway, CizStore, EmployeeStore, EventStore};
use crate::utils::error::{CizError, Result};

pub fn test_employee(id: i64, employee_number: i64, user_id: Option<&str>) -> Employee {
    Employee {
        id,
        employee_number,
        last_name: "山田".to_string(),
        first_name: "太郎".to_string(),
        display_name: "Taro Yamada".to_string(),
        email: format!("taro{}@example.jp", employee_number),
        gender: Gender::Male,
        user_id: user_id.map(str::to_string),
        created_at: Utc::now(),
    }
}

struct TestUser {
    email: String,
    password: String,
    user: AuthUser,
}

#[derive(Default)]
struct State {
    employees: Vec<Employee>,
    users: Vec<TestUser>,
    roles: HashMap<String, Role>,
    balances: HashMap<i64, i64>,
    history: Vec<CizTransaction>,
    events: Vec<Event>,
    participants: Vec<Participation>,
    import_budget: Option<usize>,
    fail_next_adjust: bool,
    stale_balances: HashMap<i64, i64>,
}

#[derive(Default)]
pub struct InMemoryBackend {
    state: RwLock<State>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_employee(self, employee: Employee) -> Self {
        self.state.write().unwrap().employees.push(employee);
        self
    }

    pub fn with_user(self, email: &str, password: &str, user_id: &str, role: Option<Role>) -> Self {
        {
            let mut state = self.state.write().unwrap();
            state.users.push(TestUser {
                email: email.to_string(),
                password: password.to_string(),
                user: AuthUser {
                    id: user_id.to_string(),
                    email: Some(email.to_string()),
                },
            });
            if let Some(role) = role {
                state.roles.insert(user_id.to_string(), role);
            }
        }
        self
    }

    /// 前 n 次 import 成功，之後回傳後端錯誤
    pub fn fail_imports_after(&self, batches: usize) {
        self.state.write().unwrap().import_budget = Some(batches);
    }

    /// 下一次 adjust 回傳 503
    pub fn fail_next_adjust(&self) {
        self.state.write().unwrap().fail_next_adjust = true;
    }

    /// find_balance 回傳過時的餘額，模擬同時扣點
    pub fn stale_balance(&self, employee_id: i64, balance: i64) {
        self.state
            .write()
            .unwrap()
            .stale_balances
            .insert(employee_id, balance);
    }

    pub fn employees(&self) -> Vec<Employee> {
        self.state.read().unwrap().employees.clone()
    }
}

fn token_for(user_id: &str) -> String {
    format!("token-{}", user_id)
}

#[async_trait]
impl EmployeeStore for InMemoryBackend {
    async fn list_employees(&self) -> Result<Vec<Employee>> {
        Ok(self.employees())
    }

    async fn find_employee(&self, id: i64) -> Result<Option<Employee>> {
        Ok(self
            .state
            .read()
            .unwrap()
            .employees
            .iter()
            .find(|e| e.id == id)
            .cloned())
    }

    async fn find_employee_by_user(&self, user_id: &str) -> Result<Option<Employee>> {
        Ok(self
            .state
            .read()
            .unwrap()
            .employees
            .iter()
            .find(|e| e.user_id.as_deref() == Some(user_id))
            .cloned())
    }

    async fn update_employee(&self, id: i64, patch: &EmployeePatch) -> Result<Option<Employee>> {
        let mut state = self.state.write().unwrap();
        let Some(employee) = state.employees.iter_mut().find(|e| e.id == id) else {
            return Ok(None);
        };
        if let Some(v) = &patch.last_name {
            employee.last_name = v.clone();
        }
        if let Some(v) = &patch.first_name {
            employee.first_name = v.clone();
        }
        if let Some(v) = &patch.display_name {
            employee.display_name = v.clone();
        }
        if let Some(v) = &patch.email {
            employee.email = v.clone();
        }
        if let Some(v) = patch.gender {
            employee.gender = v;
        }
        Ok(Some(employee.clone()))
    }

    async fn delete_employee(&self, id: i64) -> Result<bool> {
        let mut state = self.state.write().unwrap();
        let before = state.employees.len();
        state.employees.retain(|e| e.id != id);
        Ok(state.employees.len() != before)
    }

    async fn import_employees(&self, employees: &[NewEmployee]) -> Result<usize> {
        let mut state = self.state.write().unwrap();
        if let Some(budget) = state.import_budget.as_mut() {
            if *budget == 0 {
                return Err(CizError::BackendError {
                    status: 500,
                    message: "import rejected".to_string(),
                });
            }
            *budget -= 1;
        }

        for new in employees {
            let id = state.employees.iter().map(|e| e.id).max().unwrap_or(0) + 1;
            state.employees.push(Employee {
                id,
                employee_number: new.employee_number,
                last_name: new.last_name.clone(),
                first_name: new.first_name.clone(),
                display_name: new.display_name.clone(),
                email: new.email.clone(),
                gender: new.gender,
                user_id: None,
                created_at: Utc::now(),
            });
        }
        Ok(employees.len())
    }
}

#[async_trait]
impl CizStore for InMemoryBackend {
    async fn find_balance(&self, employee_id: i64) -> Result<Option<CizBalance>> {
        let state = self.state.read().unwrap();
        Ok(state
            .stale_balances
            .get(&employee_id)
            .or_else(|| state.balances.get(&employee_id))
            .map(|balance| CizBalance {
                employee_id,
                balance: *balance,
            }))
    }

    async fn list_history(&self, employee_id: i64, limit: usize) -> Result<Vec<CizTransaction>> {
        let state = self.state.read().unwrap();
        Ok(state
            .history
            .iter()
            .rev()
            .filter(|t| t.employee_id == employee_id)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn adjust(&self, adjustment: &CizAdjustment) -> Result<CizBalance> {
        let mut state = self.state.write().unwrap();
        if std::mem::take(&mut state.fail_next_adjust) {
            return Err(CizError::BackendError {
                status: 503,
                message: "service unavailable".to_string(),
            });
        }
        let current = state
            .balances
            .get(&adjustment.employee_id)
            .copied()
            .unwrap_or(0);
        if adjustment
            .floor
            .is_some_and(|floor| current + adjustment.delta < floor)
        {
            return Err(CizError::InsufficientCiz {
                balance: current,
                requested: -adjustment.delta,
            });
        }
        let balance = current + adjustment.delta;
        state.balances.insert(adjustment.employee_id, balance);
        let id = state.history.len() as i64 + 1;
        state.history.push(CizTransaction {
            id,
            employee_id: adjustment.employee_id,
            delta: adjustment.delta,
            reason: adjustment.reason.clone(),
            balance_after: balance,
            created_at: Utc::now(),
        });
        Ok(CizBalance {
            employee_id: adjustment.employee_id,
            balance,
        })
    }
}

#[async_trait]
impl EventStore for InMemoryBackend {
    async fn list_events(&self) -> Result<Vec<Event>> {
        Ok(self.state.read().unwrap().events.clone())
    }

    async fn find_event(&self, id: i64) -> Result<Option<Event>> {
        Ok(self
            .state
            .read()
            .unwrap()
            .events
            .iter()
            .find(|e| e.id == id)
            .cloned())
    }

    async fn create_event(&self, event: &NewEvent) -> Result<Event> {
        let mut state = self.state.write().unwrap();
        let created = Event {
            id: state.events.len() as i64 + 1,
            title: event.title.clone(),
            starts_at: event.starts_at,
            ends_at: event.ends_at,
            reward_ciz: event.reward_ciz,
        };
        state.events.push(created.clone());
        Ok(created)
    }

    async fn list_participants(&self, event_id: i64) -> Result<Vec<Participation>> {
        Ok(self
            .state
            .read()
            .unwrap()
            .participants
            .iter()
            .filter(|p| p.event_id == event_id)
            .cloned()
            .collect())
    }

    async fn find_participation(
        &self,
        event_id: i64,
        employee_id: i64,
    ) -> Result<Option<Participation>> {
        Ok(self
            .state
            .read()
            .unwrap()
            .participants
            .iter()
            .find(|p| p.event_id == event_id && p.employee_id == employee_id)
            .cloned())
    }

    async fn add_participant(&self, event_id: i64, employee_id: i64) -> Result<Participation> {
        let participation = Participation {
            event_id,
            employee_id,
            attended: false,
            joined_at: Utc::now(),
        };
        self.state
            .write()
            .unwrap()
            .participants
            .push(participation.clone());
        Ok(participation)
    }

    async fn set_attendance(
        &self,
        event_id: i64,
        employee_id: i64,
        attended: bool,
    ) -> Result<Participation> {
        let mut state = self.state.write().unwrap();
        let participation = state
            .participants
            .iter_mut()
            .find(|p| p.event_id == event_id && p.employee_id == employee_id)
            .ok_or_else(|| CizError::not_found("participant"))?;
        participation.attended = attended;
        Ok(participation.clone())
    }
}

#[async_trait]
impl AuthGateway for InMemoryBackend {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let state = self.state.read().unwrap();
        let user = state
            .users
            .iter()
            .find(|u| u.email == email && u.password == password)
            .ok_or(CizError::Unauthorized)?;
        Ok(Session {
            access_token: token_for(&user.user.id),
            refresh_token: None,
            expires_in: Some(3600),
            user: user.user.clone(),
        })
    }

    async fn user_for_token(&self, access_token: &str) -> Result<AuthUser> {
        let state = self.state.read().unwrap();
        state
            .users
            .iter()
            .find(|u| token_for(&u.user.id) == access_token)
            .map(|u| u.user.clone())
            .ok_or(CizError::Unauthorized)
    }

    async fn role_for(&self, user_id: &str) -> Result<Option<Role>> {
        Ok(self.state.read().unwrap().roles.get(user_id).copied())
    }
}
