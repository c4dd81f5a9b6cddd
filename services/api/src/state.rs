use sea_orm::DatabaseConnection;

use crate::config::TokenKeys;
use crate::infra::db::{DbUserRepository, DbVerificationRepository};
use crate::infra::google::GoogleTokenClient;
use crate::infra::notify::HttpNotifier;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub token_keys: TokenKeys,
    pub production: bool,
    pub google: GoogleTokenClient,
    pub notifier: HttpNotifier,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn verification_repo(&self) -> DbVerificationRepository {
        DbVerificationRepository {
            db: self.db.clone(),
        }
    }

    pub fn notifier(&self) -> HttpNotifier {
        self.notifier.clone()
    }

    pub fn google_verifier(&self) -> GoogleTokenClient {
        self.google.clone()
    }
}
