//! # Repository Implementations
//!
//! Database access organized by entity. Each repository wraps the shared
//! `SqlitePool` and exposes typed async operations.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Repository Organization                             │
//! │                                                                         │
//! │  Database (pool.rs)                                                    │
//! │       │                                                                 │
//! │       ├── products()   → ProductRepository    (catalog + stock)        │
//! │       ├── customers()  → CustomerRepository   (directory)              │
//! │       ├── addresses()  → AddressRepository    (address book)           │
//! │       ├── orders()     → OrderRepository      (placement + lifecycle)  │
//! │       └── settings()   → SettingsRepository   (season gate, zones)     │
//! │                                                                         │
//! │  Cross-repository writes (order placement reserving stock) share one   │
//! │  transaction via pub(crate) connection-level helpers.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod address;
pub mod customer;
pub mod order;
pub mod product;
pub mod settings;
