fn main() {
    // Assets are read from ./assets at runtime; only rebuild when they or the shaders change.
    println!("cargo:rerun-if-changed=assets/*");
    println!("cargo:rerun-if-changed=src/pipelines");
}
