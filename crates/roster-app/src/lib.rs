// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod auth;
pub mod debounce;
pub mod error;
pub mod filter;
pub mod ids;
pub mod loading;
pub mod notify;
pub mod paginate;
pub mod query;
pub mod resource;
pub mod sort;
pub mod state;
pub mod value;

pub use auth::*;
pub use debounce::*;
pub use error::*;
pub use filter::*;
pub use ids::*;
pub use loading::*;
pub use notify::*;
pub use paginate::*;
pub use query::*;
pub use resource::*;
pub use sort::*;
pub use state::*;
pub use value::*;
