//! Compiles the `chomp.v1beta1` protobuf schema.
//!
//! The schema is parsed with `protox`, so no system `protoc` is needed. The
//! encoded descriptor set is written next to the generated code and embedded
//! by the reflection endpoints.

use std::path::PathBuf;

use prost::Message;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let out_dir = PathBuf::from(std::env::var("OUT_DIR")?);

    let fds = protox::compile(["chomp/v1beta1/chomp.proto"], ["proto"])?;
    std::fs::write(out_dir.join("chomp_descriptor.bin"), fds.encode_to_vec())?;

    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .type_attribute(".chomp.v1beta1", "#[derive(serde::Serialize)]")
        .compile_fds(fds)?;

    println!("cargo:rerun-if-changed=proto");
    Ok(())
}
