// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

#[test]
#[serial]
fn find_migrd_binary_honors_explicit_override() {
    std::env::set_var("MIGRD_BINARY", "/usr/local/bin/migrd-custom");
    assert_eq!(find_migrd_binary(), PathBuf::from("/usr/local/bin/migrd-custom"));
    std::env::remove_var("MIGRD_BINARY");
}

#[test]
#[serial]
fn find_migrd_binary_falls_back_to_path_lookup() {
    std::env::remove_var("MIGRD_BINARY");
    assert_eq!(find_migrd_binary(), PathBuf::from("migrd"));
}
