// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! State-changing operations.
//!
//! - `directory`: seeding and live directory updates
//! - `versions`: structure version lifecycle
//! - `history`: idempotent history inserts
//! - `audit`: audit log appends
//!
//! Only `last_insert_rowid()` comes from the backend module; everything
//! else is Diesel DSL.

pub mod audit;
pub mod directory;
pub mod history;
pub mod versions;
