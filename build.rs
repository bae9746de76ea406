use vergen::EmitBuilder;

pub fn main() -> Result<(), Box<dyn std::error::Error>> {
    EmitBuilder::builder()
        .build_timestamp()
        .git_sha(true)
        .emit()?;
    Ok(())
}
