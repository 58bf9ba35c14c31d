//! OpenSuite Platform Core
//!
//! Session issuance and authenticated request dispatch:
//! - Credential verification (password or signed assertion)
//! - Session lifecycle (issue, validate, refresh, revoke)
//! - Typed request dispatch to registered handlers
//! - Environment-resolved configuration with fatal startup validation
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                        Platform Facade                         │
//! │          create_session          process_request               │
//! ├────────────────────────────────────────────────────────────────┤
//! │                                                                │
//! │  Credential ──► Session ──► Request ──► Handler ──► Handler    │
//! │  Verifier       Manager     Dispatcher  Registry               │
//! │     │              │            │          │                   │
//! │     ▼              ▼            ▼          ▼                   │
//! │  ┌────────┐  ┌──────────┐  ┌─────────┐ ┌──────────────┐       │
//! │  │ Argon2 │  │  Token   │  │ Timeout │ │recommendation│       │
//! │  │  HS256 │  │  Table   │  │  Bound  │ │   (example)  │       │
//! │  └────────┘  └──────────┘  └─────────┘ └──────────────┘       │
//! │                                                                │
//! │        Profile Store          Sealed Cache (AES-256-GCM)       │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The facade is the only surface exposed to external collaborators; any
//! RPC/HTTP binding is layered on top of it.

pub mod authn;
pub mod cache;
pub mod crypto;
pub mod dispatch;
pub mod jwt;
pub mod platform;
pub mod profile;
pub mod recommend;
pub mod registry;
pub mod session;

// Re-exports
pub use authn::{Credential, CredentialVerifier, LocalUserStore};
pub use cache::{build_cache, CacheBackend, MemoryCache, SealedCache};
pub use crypto::SecretSealer;
pub use dispatch::RequestDispatcher;
pub use jwt::{AssertionKeys, Claims};
pub use platform::Platform;
pub use profile::ProfileStore;
pub use recommend::{RecommendationHandler, RECOMMENDATION_TYPE};
pub use registry::{HandlerRegistry, RequestHandler};
pub use session::{Session, SessionManager, SessionStats};
