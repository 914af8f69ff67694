//! Paste store integration tests.

use super::*;
use crate::test_support::{read_all, setup_temp_store, temp_store_config, wait_until};
use std::time::Duration;
