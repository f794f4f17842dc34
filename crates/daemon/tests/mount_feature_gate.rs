//! Say so when the FUSE adapter tests are skipped.
//!
//! `mount_integration.rs` is gated behind `#[cfg(feature = "fuse")]`; without
//! this file a `--no-default-features` run would drop that coverage silently.

#[cfg(not(feature = "fuse"))]
#[test]
fn fuse_tests_skipped_warning() {
    eprintln!(
        "\n\x1b[33mwarning\x1b[0m: skipping FUSE adapter tests: built without the `fuse` feature.\n\
         Run them with: cargo test -p issuefs-daemon --features fuse\n"
    );
}
