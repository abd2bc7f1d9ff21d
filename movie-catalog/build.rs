fn main() -> Result<(), Box<dyn std::error::Error>> {
    tonic_prost_build::configure().compile_protos(&["proto/movies/v1/movies.proto"], &["proto"])?;

    println!("cargo:rerun-if-changed=proto/movies/v1/movies.proto");
    println!("cargo:rerun-if-changed=build.rs");

    Ok(())
}
