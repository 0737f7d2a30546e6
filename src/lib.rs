// Copyright (c) 2025 The gaiamaps authors.
// See LICENSE file in root directory for license terms.

pub mod file_catalog;
pub mod overhead_engine;
