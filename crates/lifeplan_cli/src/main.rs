//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `lifeplan_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use lifeplan_core::{PlannerService, SqliteDocumentRepository};

fn main() {
    println!("lifeplan_core version={}", lifeplan_core::core_version());

    let conn = match lifeplan_core::db::open_db_in_memory() {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("error: failed to open in-memory store: {err}");
            std::process::exit(1);
        }
    };
    let repo = match SqliteDocumentRepository::try_new(&conn) {
        Ok(repo) => repo,
        Err(err) => {
            eprintln!("error: storage not ready: {err}");
            std::process::exit(1);
        }
    };
    let service = match PlannerService::load(repo) {
        Ok(service) => service,
        Err(err) => {
            eprintln!("error: failed to load document: {err}");
            std::process::exit(1);
        }
    };

    let document = service.document();
    println!(
        "document version={} years={} currency={}",
        document.version,
        document.years.len(),
        document.settings.currency
    );
}
