// Copyright (c) 2025 The gaiamaps authors.
// See LICENSE file in root directory for license terms.

pub mod astro_util;
pub mod catalog_trait;
pub mod projector;
pub mod rotation;
pub mod star_info;
pub mod star_record;
pub mod zenith_frame;
