fn main() {
    println!("cargo:rerun-if-env-changed=EXEMPI_LIB_DIR");

    #[cfg(feature = "exempi")]
    {
        // Only add a search path when the library lives outside the default linker paths
        if let Ok(dir) = std::env::var("EXEMPI_LIB_DIR") {
            if !dir.is_empty() {
                println!("cargo:rustc-link-search=native={dir}");
            }
        }
    }
}
