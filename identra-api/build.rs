fn main() {
    println!("cargo:rerun-if-changed=proto/auth.proto");
    println!("cargo:rerun-if-changed=gen/identra.auth.v1.rs");
    if tonic_build::compile_protos("proto/auth.proto").is_err() {
        // protoc is unavailable; fall back to the checked-in pregenerated file.
        let out_dir = std::env::var("OUT_DIR").expect("OUT_DIR not set");
        let out = std::path::Path::new(&out_dir).join("identra.auth.v1.rs");
        std::fs::copy("gen/identra.auth.v1.rs", &out)
            .expect("Failed to compile auth.proto: protoc missing and no pregenerated fallback");
    }
}
