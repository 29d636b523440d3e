//! Login Flow Example
//!
//! Drives a headless login screen with keel rules.
//! The "view" is a set of listeners that print what a UI would show, and
//! user input is simulated by calling `update` the way input handlers would.

use keel_core::{Payload, Store, Value};
use keel_journal::{Auditor, ExportFormat, Exporter};
use keel_script::Loader;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const LOGIN_RULES: &str = r#"
(
    data: {
        "page": (),
        "authenticated": false,
        "instruction_key": (),
        "email_input": (),
        "email_valid": false,
        "password_input": (),
        "password_valid": false,
        "submit_enabled": (),
        "alert": (),
    },
    expressions: {
        "rejected": "page was loading and page is login",
        "logout": "authenticated is now false",
        "clear_session": "logout or rejected",
        "input": "email_input has changed or password_input has changed",
    },
    rules: [
        "if page was null and page is login then set instruction_key sign_in",
        "if email_valid is true and password_valid is true then set submit_enabled true",
        "if email_valid is false or password_valid is false then set submit_enabled false",
        "if page is loading then set instruction_key wait",
        "if authenticated is now true then set page home",
        "if page is now home then set instruction_key enjoy",
        "if rejected then set alert try_again",
        "if clear_session then set page login",
        "if clear_session then set password_input null",
        "if clear_session then set email_input null",
    ],
)
"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    println!("=== Keel Login Flow Example ===\n");

    let mut loader = Loader::new();
    loader.load_str(LOGIN_RULES)?;
    let mut store = loader.build()?;
    info!(
        fields = store.fields().count(),
        rules = store.rules().len(),
        "store ready"
    );

    // Listen to state
    store.on("page", show_page)?;
    store.on_props("instruction_key", &["instruction_key"], show_instruction)?;
    store.on_props("submit_enabled", &["submit_enabled"], show_submit)?;
    store.on_props("input", &["email_input", "password_input"], validate_login)?;
    store.on_props("alert", &["alert"], show_alert)?;
    store.on("clear_session", clear_input_fields)?;

    // Entry point
    store.update([("page", "login")])?;

    println!("\n> typing a short email");
    store.update([("email_input", "me")])?;

    println!("\n> typing full credentials");
    store.update([("email_input", "me@example.com")])?;
    store.update([("password_input", "correct horse")])?;

    println!("\n> bad login");
    store.update([("page", "loading")])?;
    store.update([("page", "login")])?;

    println!("\n> good login");
    store.update([("email_input", "me@example.com")])?;
    store.update([("password_input", "correct horse")])?;
    store.update([("page", "loading")])?;
    store.update([("authenticated", true)])?;

    println!("\n> logout");
    store.update([("authenticated", false)])?;

    println!();
    let auditor = Auditor::new(store.history());
    println!("{}", auditor.generate_report());

    let csv = Exporter::new(store.history()).export(ExportFormat::Csv)?;
    println!("=== History (CSV) ===\n{}", csv);

    Ok(())
}

fn show_page(_: &mut Store, state: &Payload) {
    if let Some(page) = state.get("page").and_then(Value::as_str) {
        println!("[page] {}", page.to_uppercase());
    }
}

fn show_instruction(_: &mut Store, key: &Payload) {
    let text = match key.value().and_then(Value::as_str) {
        Some("sign_in") => "Please sign in.",
        Some("email_short") => "EMAIL must be at least FIVE characters long",
        Some("password_short") => "PASSWORD must be at least EIGHT characters long",
        Some("submit") => "You're good.",
        Some("wait") => "Please wait.",
        Some("enjoy") => "Enjoy!",
        _ => return,
    };
    println!("[instruction] {}", text);
}

fn show_submit(_: &mut Store, enabled: &Payload) {
    let shown = enabled.value().is_some_and(Value::is_truthy);
    println!("[buttons] {}", if shown { "shown" } else { "hidden" });
}

fn validate_login(store: &mut Store, inputs: &Payload) {
    let email = inputs.get("email_input").and_then(Value::as_str);
    let password = inputs.get("password_input").and_then(Value::as_str);

    let email_valid = email.is_some_and(|e| e.len() > 4);
    let password_valid = password.is_some_and(|p| p.len() > 7);
    let instruction_key = if email.map_or(true, str::is_empty) {
        "sign_in"
    } else if !email_valid {
        "email_short"
    } else if !password_valid {
        "password_short"
    } else {
        "submit"
    };

    let result = store.update([
        ("email_valid", Value::from(email_valid)),
        ("password_valid", Value::from(password_valid)),
        ("instruction_key", Value::from(instruction_key)),
    ]);
    if let Err(e) = result {
        error!(error = %e, "failed to record validation");
    }
}

fn show_alert(store: &mut Store, key: &Payload) {
    if key.value().and_then(Value::as_str) == Some("try_again") {
        println!("[alert] Sorry, we don't recognize you. Try again.");
        if let Err(e) = store.set("alert", Value::Null) {
            error!(error = %e, "failed to dismiss alert");
        }
    }
}

fn clear_input_fields(_: &mut Store, _: &Payload) {
    println!("[inputs] cleared");
}
