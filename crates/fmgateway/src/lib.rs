//! fmgateway library - services, http surface and the file pipeline.
//!
//! the binary wires four pieces together: the relational store
//! ([`fmgateway_db::FmgDb`]), the blob store, the axum application from
//! [`create_app`], and the [`pipeline::FileWorker`].

pub mod blob_store;
pub mod caf_service;
pub mod cli;
pub mod company_service;
pub mod document_service;
pub mod error;
pub mod handlers;
pub mod pipeline;
pub mod thermal;

use axum::{
    routing::{get, post},
    Router,
};

use fmgateway_db::FmgDb;
use fmgateway_types::Config;

use blob_store::LocalBlobStore;
use caf_service::CafService;
use company_service::CompanyService;
use document_service::DocumentService;

/// application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// relational store.
    pub db: FmgDb,
    /// application configuration.
    pub config: Config,
    /// company management.
    pub companies: CompanyService,
    /// CAF ingestion and folio reservation.
    pub cafs: CafService<LocalBlobStore>,
    /// per-invoice stamping workflow.
    pub documents: DocumentService<LocalBlobStore>,
}

impl AppState {
    /// assemble the service graph over a store and blob backend.
    pub fn new(db: FmgDb, blobs: LocalBlobStore, config: Config) -> Self {
        let companies = CompanyService::new(db.clone());
        let cafs = CafService::new(db.clone(), blobs);
        let documents = DocumentService::new(companies.clone(), cafs.clone());
        Self {
            db,
            config,
            companies,
            cafs,
            documents,
        }
    }
}

/// create the axum application with all routes.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/companies",
            post(handlers::companies::create).get(handlers::companies::list),
        )
        .route("/companies/{id}", get(handlers::companies::get))
        .route(
            "/companies/{id}/activities",
            post(handlers::companies::add_activity).get(handlers::companies::list_activities),
        )
        .route(
            "/companies/{id}/activities/{activity_id}",
            axum::routing::delete(handlers::companies::remove_activity),
        )
        .route(
            "/companies/{id}/cafs",
            post(handlers::cafs::create).get(handlers::cafs::list),
        )
        .route("/companies/{id}/stamps", post(handlers::stamps::create))
        .with_state(state)
}
