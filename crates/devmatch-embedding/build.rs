// SPDX-FileCopyrightText: 2026 Devmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=proto/embedding.proto");
    println!("cargo:rerun-if-env-changed=PROTOC");
    // Fall back to the bundled compiler when no protoc is configured.
    if std::env::var_os("PROTOC").is_none() {
        let protoc = protoc_bin_vendored::protoc_bin_path()?;
        // SAFETY: the build script is single-threaded.
        unsafe { std::env::set_var("PROTOC", protoc) };
    }
    tonic_build::configure().compile_protos_with_config(
        tonic_build::Config::default(),
        &["proto/embedding.proto"],
        &["proto"],
    )?;
    Ok(())
}
