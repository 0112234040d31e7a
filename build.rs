use std::env;

fn main() {
    // The return-code table is embedded with `include_str!`; validate it at
    // build time so a malformed table fails the build instead of the first run.
    println!("cargo:rerun-if-changed=src/error_codes.toml");
    let path = env::var("CARGO_MANIFEST_DIR")
        .map(|d| std::path::Path::new(&d).join("src").join("error_codes.toml"));
    if let Ok(path) = path {
        if let Ok(s) = std::fs::read_to_string(&path) {
            if let Err(e) = s.parse::<toml::Table>() {
                panic!("src/error_codes.toml is not valid TOML: {e}");
            }
        }
    }
}
