//! UniFFI bindgen entry point for generating host bindings from libleap.
//!
//! Run: cargo run --bin uniffi-bindgen -- generate --library target/release/libleap.dylib --language swift --out-dir out

fn main() {
    uniffi::uniffi_bindgen_main()
}
