// src/commands/checksums.rs
//! Download checksum resolution

use anyhow::{Context, Result};
use bpm_utils::package::PACKAGE_INFO_FILE;
use bpm_utils::version::write_package_info;
use bpm_utils::{ChecksumResolver, PackageInfo};
use std::path::Path;

/// Print (and optionally store) the checksum of each download in `dir/pkg.info`
pub fn cmd_checksums(dir: &Path, write: bool) -> Result<()> {
    let info_path = dir.join(PACKAGE_INFO_FILE);
    let mut info = PackageInfo::from_file(&info_path)
        .with_context(|| format!("could not read {}", info_path.display()))?;

    let resolver = ChecksumResolver::new()?;
    let resolved = resolver
        .resolve_all(&info)
        .with_context(|| format!("could not calculate checksums for {}", info.name))?;

    if resolved.is_empty() {
        println!("No downloads require a checksum");
        return Ok(());
    }

    for (index, checksum) in &resolved {
        println!("{} {}", checksum, info.downloads[*index].url);
    }

    if write {
        for (index, checksum) in resolved {
            info.downloads[index].checksum = checksum;
        }
        write_package_info(&info_path, &info)
            .with_context(|| format!("could not write {}", info_path.display()))?;
        println!("Checksums written to {}", info_path.display());
    }
    Ok(())
}
