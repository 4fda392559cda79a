//! Calculator to relay over real HTTP.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use calc_cli::{FileStore, HttpLeadSink};
use calc_core::{
    CalculatorError, Catalog, ContactUpdate, LeadSink, ProjectCalculator, ProjectType, SinkError,
    Step,
};
use calc_relay::{Mailer, MailerError, OutgoingMail, RelayConfig, RelayState, router};
use pretty_assertions::assert_eq;

#[derive(Default)]
struct Outbox {
    sent: Mutex<Vec<OutgoingMail>>,
}

#[async_trait]
impl Mailer for Outbox {
    async fn send(
        &self,
        mail: &OutgoingMail,
    ) -> Result<(), MailerError> {
        self.sent.lock().unwrap().push(mail.clone());
        Ok(())
    }
}

async fn spawn_relay(outbox: Arc<Outbox>) -> SocketAddr {
    let config = RelayConfig {
        max_requests: 5,
        window: Duration::from_secs(3600),
        ..RelayConfig::default()
    };
    let app = router(Arc::new(RelayState::new(config, outbox)));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn endpoint(addr: SocketAddr) -> String {
    format!("http://{addr}/api/send-lead")
}

fn ready_calculator(
    store: FileStore,
    sink: Arc<dyn LeadSink>,
) -> ProjectCalculator {
    let catalog = Arc::new(Catalog::builtin());
    let mut calculator = ProjectCalculator::new(catalog, Box::new(store), sink);
    calculator.advance().unwrap();
    calculator.set_project_type(ProjectType::Website);
    let seo = calculator.available_addons()[0].clone();
    calculator.toggle_addon(&seo);
    calculator.jump_to(Step::Summary);
    calculator.update_contact(ContactUpdate {
        first_name: Some("Jan".to_string()),
        email: Some("jan@example.com".to_string()),
        phone: Some("+48 123 456 789".to_string()),
        gdpr_consent: Some(true),
    });
    calculator
}

#[tokio::test]
async fn lead_reaches_relay_and_state_is_cleared() {
    let outbox = Arc::new(Outbox::default());
    let addr = spawn_relay(outbox.clone()).await;
    let dir = tempfile::tempdir().unwrap();
    let state_path = dir.path().join("state.json");
    let sink = Arc::new(HttpLeadSink::new(endpoint(addr)));

    let mut calculator = ready_calculator(FileStore::new(&state_path), sink);
    assert!(state_path.exists());

    let lead = calculator.submit_lead().await.unwrap();

    assert_eq!(lead.total_cost, 15_490);
    assert_eq!(calculator.current_step(), Step::Welcome);
    assert!(!state_path.exists());

    let sent = outbox.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].reply_to, "jan@example.com");
    assert!(sent[0].body.contains("Całkowity koszt: 15\u{a0}490\u{a0}zł"));
}

#[tokio::test]
async fn sixth_submission_is_rate_limited_and_keeps_state() {
    let outbox = Arc::new(Outbox::default());
    let addr = spawn_relay(outbox.clone()).await;
    let dir = tempfile::tempdir().unwrap();
    let sink: Arc<dyn LeadSink> = Arc::new(HttpLeadSink::new(endpoint(addr)));

    for _ in 0..5 {
        let mut calculator =
            ready_calculator(FileStore::new(dir.path().join("state.json")), sink.clone());
        calculator.submit_lead().await.unwrap();
    }

    let mut calculator =
        ready_calculator(FileStore::new(dir.path().join("state.json")), sink.clone());
    let result = calculator.submit_lead().await;

    assert_eq!(result, Err(CalculatorError::Sink(SinkError::RateLimited)));
    assert_eq!(calculator.current_step(), Step::Summary);
    assert_eq!(calculator.state().total_cost(), 15_490);
    assert_eq!(outbox.sent.lock().unwrap().len(), 5);

    let resumed = ProjectCalculator::new(
        Arc::new(Catalog::builtin()),
        Box::new(FileStore::new(dir.path().join("state.json"))),
        sink,
    );
    assert_eq!(resumed.state(), calculator.state());
}

#[tokio::test]
async fn relay_validation_error_is_surfaced() {
    let addr = spawn_relay(Arc::new(Outbox::default())).await;
    let sink = HttpLeadSink::new(endpoint(addr));
    let mut lead_json = serde_json::json!({
        "projectType": "website",
        "selectedAddons": [],
        "totalCost": 14990,
        "notes": "",
        "contactData": {
            "firstName": "Jan",
            "email": "jan@example.com",
            "phone": "123456789",
            "gdprConsent": true
        },
        "timestamp": "2025-03-01T10:30:00Z"
    });
    lead_json["contactData"]["phone"] = serde_json::json!("12");
    let lead = serde_json::from_value(lead_json).unwrap();

    let result = sink.send(&lead).await;

    assert_eq!(
        result,
        Err(SinkError::Rejected {
            status: 400,
            message: "Valid phone number is required".to_string(),
        })
    );
}
