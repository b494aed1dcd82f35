//! Build script for the `api-shared` crate.
//!
//! ## Purpose
//! Generates Rust protobuf types, servers and clients from the `hospital.v1` protos and emits a
//! file-descriptor set.
//!
//! ## Intended use
//! The generated types are shared by the gRPC services, the REST gateway and the appointment
//! service's staff client. The descriptor set is used for gRPC reflection.

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let manifest_dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
    let proto_include_root = manifest_dir.join("proto");
    let proto_files: Vec<std::path::PathBuf> = ["common", "patient", "staff", "appointment"]
        .iter()
        .map(|name| proto_include_root.join(format!("hospital/v1/{name}.proto")))
        .collect();

    for proto_file in &proto_files {
        println!("cargo:rerun-if-changed={}", proto_file.display());
    }

    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .type_attribute(
            ".",
            "#[derive(serde::Serialize, serde::Deserialize, utoipa::ToSchema)]",
        )
        .message_attribute(".", "#[serde(default)]")
        .file_descriptor_set_path(
            std::path::Path::new(&std::env::var("OUT_DIR")?).join("proto_descriptor.bin"),
        )
        .compile_protos(&proto_files, &[proto_include_root])?;

    Ok(())
}
