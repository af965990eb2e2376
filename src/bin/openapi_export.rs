use std::{fs, path::PathBuf};

use modas_pathy_api::openapi::openapi_json;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let json = openapi_json()?;

    let output_dir = PathBuf::from("openapi");
    fs::create_dir_all(&output_dir)?;

    let output_path = output_dir.join("modas-pathy.v1.json");
    fs::write(&output_path, json)?;

    println!("OpenAPI document written to {}", output_path.display());
    Ok(())
}
