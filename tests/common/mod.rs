//! Shared harness for integration tests: two mock servers standing in for
//! the ledger and split-expense APIs, and a runner wired to them.

use std::sync::Once;

use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use splitsync::config::{LedgerConfig, Mode, SharedExpenseConfig};
use splitsync::services::{LedgerClient, ReconciliationRunner, SharedExpenseClient};

static INIT: Once = Once::new();

/// Initialize tracing for tests (only once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info,splitsync=debug")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub const GROUP_ID: u64 = 42;
pub const SELF_ID: u64 = 7;
pub const PARTNER_ID: u64 = 8;
pub const REIMBURSEMENT_CATEGORY_ID: u64 = 9;

pub struct TestApp {
    pub ledger: MockServer,
    pub shared: MockServer,
}

pub async fn spawn_app() -> TestApp {
    init_tracing();
    TestApp {
        ledger: MockServer::start().await,
        shared: MockServer::start().await,
    }
}

impl TestApp {
    pub fn runner(&self, mode: Mode) -> ReconciliationRunner {
        let ledger = LedgerClient::new(LedgerConfig {
            base_url: self.ledger.uri(),
            token: "ledger-token".to_string(),
        });
        let shared = SharedExpenseClient::new(SharedExpenseConfig {
            base_url: self.shared.uri(),
            token: "split-token".to_string(),
            group_id: GROUP_ID,
        });
        ReconciliationRunner::new(ledger, shared, mode)
    }

    /// Mount every read endpoint a run touches, each expected exactly once.
    pub async fn mount_reads(&self, transactions: Vec<Value>, start: &str, end: &str) {
        Mock::given(method("GET"))
            .and(path("/v1/categories"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "categories": [
                    {"id": 1, "name": "Food"},
                    {"id": REIMBURSEMENT_CATEGORY_ID, "name": "Reimbursements"},
                ]
            })))
            .expect(1)
            .mount(&self.ledger)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1/transactions"))
            .and(query_param("start_date", start))
            .and(query_param("end_date", end))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"transactions": transactions})),
            )
            .expect(1)
            .mount(&self.ledger)
            .await;

        Mock::given(method("GET"))
            .and(path("/get_current_user"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"user": {"id": SELF_ID, "first_name": "Me"}})),
            )
            .expect(1)
            .mount(&self.shared)
            .await;

        Mock::given(method("GET"))
            .and(path(format!("/get_group/{GROUP_ID}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "group": {"members": [{"id": SELF_ID}, {"id": PARTNER_ID}]}
            })))
            .expect(1)
            .mount(&self.shared)
            .await;
    }
}

pub fn tx(id: u64, payee: &str, amount: &str, tags: &[&str], parent_id: Option<u64>) -> Value {
    json!({
        "id": id,
        "payee": payee,
        "amount": amount,
        "category_id": 1,
        "tags": tags.iter().map(|name| json!({"name": name})).collect::<Vec<_>>(),
        "parent_id": parent_id,
        "notes": null,
        "original_name": payee,
    })
}
