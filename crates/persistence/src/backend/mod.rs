// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Backend-specific code.
//!
//! Limited to connection setup, migrations, PRAGMA configuration and the
//! `last_insert_rowid()` helper. Everything else is Diesel DSL in
//! `queries/` and `mutations/`.

pub mod sqlite;
