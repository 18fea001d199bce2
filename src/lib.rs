//! coursechoice - faculty course-preference portal backend
//!
//! Administrators manage the course catalog, academic positions, faculty
//! accounts, and scheduling sessions. Faculty members rank the courses they
//! would like to teach in each session they are assigned to, and may propose
//! elective courses which an administrator approves into the catalog or
//! rejects.
//!
//! The crate is organised as a thin REST layer ([`api`]) over per-entity
//! database services ([`database`]) sharing one [`sqlx::PgPool`]. The rank
//! bookkeeping used by the preference endpoints lives in [`ranking`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use coursechoice::database::{DatabaseConfig, DatabaseManager};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let db = DatabaseManager::new(DatabaseConfig::default()).await?;
//! let app = coursechoice::api::build_router(db.pool().clone());
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

// Error handling shared by all route handlers
pub mod error;

// Credential hashing
pub mod auth;

// Preference-rank bookkeeping
pub mod ranking;

// Row models and composed API shapes
pub mod models;

// Database services
pub mod database;

// REST routes
pub mod api;
