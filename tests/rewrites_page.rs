use mockito::{Matcher, Mock, Server};
use serde_json::json;

use dnsrewrites_rs::adguard::AdGuardBackend;
use dnsrewrites_rs::common::RewriteIdentity;
use dnsrewrites_rs::panel::{
    controls, Command, FilePreferences, MemoryPreferences, PageController, PreferenceStore,
};

const TEST_DOMAIN: &str = "test-example.org";
const TEST_ANSWER: &str = "192.168.1.100";
const UPDATED_DOMAIN: &str = "updated-example.org";
const UPDATED_ANSWER: &str = "192.168.1.200";

fn backend(server: &Server) -> AdGuardBackend {
    AdGuardBackend::new(&url::Url::parse(&server.url()).unwrap())
        .with_credentials("admin", "hunter2")
}

/// The list endpoint as it answers after a step.
fn list_mock(server: &mut Server, records: serde_json::Value) -> Mock {
    server
        .mock("GET", "/control/rewrite/list")
        .match_header("authorization", Matcher::Regex("^Basic ".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(records.to_string())
        .create()
}

fn visible<P: PreferenceStore>(controller: &PageController<P>, text: &str) -> bool {
    controller
        .page()
        .rows
        .iter()
        .any(|row| row.record.domain == text || row.record.answer == text)
}

fn row_enabled<P: PreferenceStore>(controller: &PageController<P>, domain: &str) -> Option<bool> {
    controller
        .page()
        .rows
        .iter()
        .find(|row| row.toggle.id == controls::row_toggle(domain))
        .map(|row| row.record.enabled)
}

#[test]
fn add_toggle_edit_delete_scenario() {
    let mut controller = PageController::new(MemoryPreferences::default());

    // Initial load.
    let mut server = Server::new();
    let list = list_mock(&mut server, json!([]));
    let settings = server
        .mock("GET", "/control/rewrite/settings")
        .with_status(200)
        .with_body(json!({"enabled": true}).to_string())
        .create();
    controller.dispatch(Command::Mount, &mut backend(&server));
    list.assert();
    settings.assert();
    assert!(controller.page().is_empty());

    // Add.
    let mut server = Server::new();
    let add = server
        .mock("POST", "/control/rewrite/add")
        .match_body(Matcher::Json(json!({
            "domain": TEST_DOMAIN, "answer": TEST_ANSWER, "enabled": true
        })))
        .with_status(200)
        .create();
    let list = list_mock(
        &mut server,
        json!([{"domain": TEST_DOMAIN, "answer": TEST_ANSWER, "enabled": true}]),
    );
    let mut step = backend(&server);
    assert_eq!(controller.page().add.id, controls::ADD_REWRITE);
    controller.dispatch(Command::OpenAdd, &mut step);
    assert!(controller.dialog_controls().unwrap().submit.disabled);
    controller.dispatch(Command::SetDomain(TEST_DOMAIN.into()), &mut step);
    controller.dispatch(Command::SetAnswer(TEST_ANSWER.into()), &mut step);
    let save = controller.dialog_controls().unwrap().submit;
    assert_eq!(save.id, controls::SAVE_BUTTON);
    assert!(!save.disabled);
    controller.dispatch(Command::Submit, &mut step);
    add.assert();
    list.assert();
    assert!(!controller.modal().is_open());
    assert!(visible(&controller, TEST_DOMAIN));
    assert!(visible(&controller, TEST_ANSWER));

    // Toggle off, using the flag held at toggle time.
    let mut server = Server::new();
    let update = server
        .mock("PUT", "/control/rewrite/update")
        .match_body(Matcher::Json(json!({
            "target": {"domain": TEST_DOMAIN, "answer": TEST_ANSWER},
            "update": {"domain": TEST_DOMAIN, "answer": TEST_ANSWER, "enabled": false}
        })))
        .with_status(200)
        .create();
    let _list = list_mock(
        &mut server,
        json!([{"domain": TEST_DOMAIN, "answer": TEST_ANSWER, "enabled": false}]),
    );
    controller.dispatch(
        Command::Toggle(RewriteIdentity::new(TEST_DOMAIN, TEST_ANSWER)),
        &mut backend(&server),
    );
    update.assert();
    assert_eq!(row_enabled(&controller, TEST_DOMAIN), Some(false));

    // Edit keeps the disabled flag.
    let mut server = Server::new();
    let update = server
        .mock("PUT", "/control/rewrite/update")
        .match_body(Matcher::Json(json!({
            "target": {"domain": TEST_DOMAIN, "answer": TEST_ANSWER},
            "update": {"domain": UPDATED_DOMAIN, "answer": UPDATED_ANSWER, "enabled": false}
        })))
        .with_status(200)
        .create();
    let _list = list_mock(
        &mut server,
        json!([{"domain": UPDATED_DOMAIN, "answer": UPDATED_ANSWER, "enabled": false}]),
    );
    let mut step = backend(&server);
    controller.dispatch(
        Command::OpenEdit(RewriteIdentity::new(TEST_DOMAIN, TEST_ANSWER)),
        &mut step,
    );
    controller.dispatch(Command::SetDomain(UPDATED_DOMAIN.into()), &mut step);
    controller.dispatch(Command::SetAnswer(UPDATED_ANSWER.into()), &mut step);
    controller.dispatch(Command::Submit, &mut step);
    update.assert();
    assert!(!visible(&controller, TEST_DOMAIN));
    assert!(!visible(&controller, TEST_ANSWER));
    assert!(visible(&controller, UPDATED_DOMAIN));
    assert!(visible(&controller, UPDATED_ANSWER));

    // Delete.
    let mut server = Server::new();
    let delete = server
        .mock("POST", "/control/rewrite/delete")
        .match_body(Matcher::Json(json!({
            "domain": UPDATED_DOMAIN, "answer": UPDATED_ANSWER
        })))
        .with_status(200)
        .create();
    let _list = list_mock(&mut server, json!([]));
    let mut step = backend(&server);
    controller.dispatch(
        Command::OpenDelete(RewriteIdentity::new(UPDATED_DOMAIN, UPDATED_ANSWER)),
        &mut step,
    );
    controller.dispatch(Command::ConfirmDelete, &mut step);
    delete.assert();
    assert!(!visible(&controller, UPDATED_DOMAIN));
    assert!(controller.page().is_empty());
}

#[test]
fn rejected_add_keeps_dialog_open() {
    let mut controller = PageController::new(MemoryPreferences::default());
    let mut server = Server::new();
    let _list = list_mock(&mut server, json!([]));
    let _settings = server
        .mock("GET", "/control/rewrite/settings")
        .with_status(200)
        .with_body(json!({"enabled": true}).to_string())
        .create();
    let _add = server
        .mock("POST", "/control/rewrite/add")
        .with_status(400)
        .with_body("rule already exists")
        .create();

    let mut step = backend(&server);
    controller.dispatch(Command::Mount, &mut step);
    controller.dispatch(Command::OpenAdd, &mut step);
    controller.dispatch(Command::SetDomain(TEST_DOMAIN.into()), &mut step);
    controller.dispatch(Command::SetAnswer(TEST_ANSWER.into()), &mut step);
    controller.dispatch(Command::Submit, &mut step);

    assert!(controller.modal().is_open());
    assert!(controller
        .modal()
        .error()
        .unwrap()
        .contains("rule already exists"));
    assert!(!controller.store().busy().adding);
}

#[test]
fn global_switch_flips_and_restores() {
    let mut controller = PageController::new(MemoryPreferences::default());
    let mut server = Server::new();
    let _list = list_mock(&mut server, json!([]));
    let _settings = server
        .mock("GET", "/control/rewrite/settings")
        .with_status(200)
        .with_body(json!({"enabled": true}).to_string())
        .create();
    let off = server
        .mock("PUT", "/control/rewrite/settings/update")
        .match_body(Matcher::Json(json!({"enabled": false})))
        .with_status(200)
        .create();
    let on = server
        .mock("PUT", "/control/rewrite/settings/update")
        .match_body(Matcher::Json(json!({"enabled": true})))
        .with_status(200)
        .create();

    let mut step = backend(&server);
    controller.dispatch(Command::Mount, &mut step);
    let initial = controller.store().settings().map(|s| s.enabled);
    assert_eq!(initial, Some(true));

    controller.dispatch(Command::ToggleAll, &mut step);
    assert_eq!(controller.store().settings().map(|s| s.enabled), Some(false));
    controller.dispatch(Command::ToggleAll, &mut step);
    assert_eq!(controller.store().settings().map(|s| s.enabled), initial);

    off.assert();
    on.assert();
}

#[test]
fn page_size_survives_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("preferences.json");

    let mut server = Server::new();
    let records: Vec<serde_json::Value> = (1..=12)
        .map(|i| json!({"domain": format!("r{i}.example"), "answer": "10.0.0.1"}))
        .collect();
    let _list = list_mock(&mut server, json!(records));
    let _settings = server
        .mock("GET", "/control/rewrite/settings")
        .with_status(200)
        .with_body(json!({"enabled": true}).to_string())
        .create();

    let mut controller = PageController::new(FilePreferences::load(&path).unwrap());
    controller.dispatch(Command::Mount, &mut backend(&server));
    assert_eq!(controller.page().rows.len(), 10);
    controller.dispatch(Command::SetPageSize(5), &mut backend(&server));
    assert_eq!(controller.page().rows.len(), 5);
    drop(controller);

    let mut reloaded = PageController::new(FilePreferences::load(&path).unwrap());
    reloaded.dispatch(Command::Mount, &mut backend(&server));
    let page = reloaded.page();
    assert_eq!(page.page_size, 5);
    assert_eq!(page.rows.len(), 5);
    assert_eq!(page.page_count, 3);
}
