pub mod mode;
pub mod pair;
pub mod plots;
pub mod summary;

use std::path::Path;

use crate::config::{BackendKind, SoarisConfig};

pub fn init(path: &Path, data_dir: &Path, backend: BackendKind, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }
    let config = SoarisConfig::scaffold(data_dir, backend);
    std::fs::write(path, config.to_toml_string()?)?;
    println!("✓ Generated {}", path.display());
    Ok(())
}
