// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries.
//!
//! - `directory`: live org units, positions and employees
//! - `versions`: structure versions
//! - `history`: employee history
//! - `audit`: audit log

pub mod audit;
pub mod directory;
pub mod history;
pub mod versions;
