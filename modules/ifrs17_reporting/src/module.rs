//! Module wiring: storage, domain service, authentication and routes

use crate::api::native::NativeClient;
use crate::config::Config;
use crate::contract::ReportingApi;
use crate::domain::{Authenticator, EventPublisher, Repositories, Service, TracingEventPublisher};
use crate::infra::files::LocalFileStore;
use crate::infra::storage::migrations::Migrator;
use crate::infra::storage::repositories::{
    SeaOrmAlertRepository, SeaOrmInstitutionRepository, SeaOrmMetricsRepository,
    SeaOrmQualityCheckRepository, SeaOrmSubmissionRepository, SeaOrmUserRepository,
};
use anyhow::Result;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;
use std::time::Duration;

/// IFRS 17 reporting module
pub struct ReportingModule {
    service: Arc<Service>,
    authenticator: Arc<Authenticator>,
}

impl ReportingModule {
    /// Run migrations and build the module over an open connection
    pub async fn init(db: DatabaseConnection, config: Config, session_ttl: Duration) -> Result<Self> {
        Migrator::up(&db, None).await?;
        tracing::info!("Reporting module migrations completed");

        tokio::fs::create_dir_all(&config.upload_root).await?;

        let conn = Arc::new(db);
        let repos = Repositories {
            institutions: Arc::new(SeaOrmInstitutionRepository::new(conn.clone())),
            submissions: Arc::new(SeaOrmSubmissionRepository::new(conn.clone())),
            metrics: Arc::new(SeaOrmMetricsRepository::new(conn.clone())),
            quality_checks: Arc::new(SeaOrmQualityCheckRepository::new(conn.clone())),
            alerts: Arc::new(SeaOrmAlertRepository::new(conn.clone())),
            files: Arc::new(LocalFileStore::new(&config.upload_root)),
        };
        let users = Arc::new(SeaOrmUserRepository::new(conn));

        let event_publisher: Arc<dyn EventPublisher> = Arc::new(TracingEventPublisher);
        let service = Arc::new(Service::new(repos, event_publisher, config));
        let authenticator = Arc::new(Authenticator::new(users, session_ttl));

        tracing::info!(
            upload_root = %service.config().upload_root.display(),
            duplicate_match = ?service.config().duplicate_match,
            "Reporting module initialized"
        );
        Ok(Self {
            service,
            authenticator,
        })
    }

    /// Assemble a module from already-built parts
    pub fn from_parts(service: Arc<Service>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            service,
            authenticator,
        }
    }

    /// HTTP routes of the module, login included
    pub fn router(&self) -> axum::Router {
        crate::api::rest::routes::register_routes(self.service.clone(), self.authenticator.clone())
    }

    /// In-process client for other modules
    pub fn client(&self) -> Arc<dyn ReportingApi> {
        Arc::new(NativeClient::new(self.service.clone()))
    }

    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }

    pub fn authenticator(&self) -> Arc<Authenticator> {
        self.authenticator.clone()
    }
}
