//! # Jobdesk Repository
//!
//! Entity store for Jobdesk.
//!
//! ```text
//! CacheCoordinator / ListingService
//!   ↓  Arc<dyn EntityStore>        (kind-generic, eager loading)
//! RepositoryEntityStore
//!   ↓  Arc<dyn UserRepository>, Arc<dyn JobRepository>
//! MySqlUserRepository, MySqlJobRepository   (SQLx)
//!   ↓
//! MySQL
//! ```

pub mod entity_store;
pub mod mysql;
pub mod pool;
pub mod traits;

pub use entity_store::*;
pub use mysql::*;
pub use pool::*;
pub use traits::*;
