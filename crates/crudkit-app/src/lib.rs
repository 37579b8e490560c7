// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod edit;
pub mod fields;
pub mod filter;
pub mod forms;
pub mod i18n;
pub mod ids;
pub mod pagination;
pub mod path;
pub mod permissions;
pub mod refresh;
pub mod state;
pub mod table;

pub use edit::*;
pub use fields::*;
pub use filter::*;
pub use forms::*;
pub use i18n::*;
pub use ids::*;
pub use pagination::*;
pub use path::*;
pub use permissions::*;
pub use refresh::*;
pub use state::*;
pub use table::*;
