use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use souschef::auth::AuthService;
use souschef::store::types::{PlanTier, UserAccount};
use souschef::store::Database;

#[allow(dead_code)]
pub fn create_temp_database() -> (Database, TempDir) {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let db_path = tmp.path().join("souschef.db");
    let db = Database::open_at(db_path).expect("failed to open database at temp path");
    (db, tmp)
}

#[allow(dead_code)]
pub fn create_seeded_database() -> (Database, TempDir) {
    let (db, tmp) = create_temp_database();
    db.recipes()
        .seed_samples()
        .expect("failed to seed sample recipes");
    (db, tmp)
}

#[allow(dead_code)]
pub fn create_account(db: &Database, email: &str, plan: PlanTier) -> UserAccount {
    let service = AuthService::new(db);
    service
        .register(email, "hunter22")
        .expect("failed to register account");
    if plan.is_premium() {
        db.users()
            .set_plan(email, plan)
            .expect("failed to set plan");
    }
    db.users()
        .find_by_email(email)
        .expect("failed to look up account")
        .expect("account missing after registration")
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}
