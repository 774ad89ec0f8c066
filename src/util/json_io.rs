use anyhow::Context;
use std::io::{BufWriter, Write};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Name of the settings snapshot inside the debug folder
pub const SETTINGS_FILENAME: &str = "cli_settings.json";

/// Writes the run settings as pretty JSON into the debug folder and returns the written path.
/// The file always ends with a newline so it can be diffed between runs.
/// # Errors
/// * if the file cannot be created or written
/// * if JSON serialization fails
pub fn save_settings_json<T: serde::Serialize>(settings: &T, debug_folder: &Path) -> anyhow::Result<PathBuf> {
    let out_filename = debug_folder.join(SETTINGS_FILENAME);
    let file = File::create(&out_filename)
        .with_context(|| format!("Error while creating {out_filename:?}:"))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, settings)
        .with_context(|| format!("Error while serializing {out_filename:?}:"))?;
    writeln!(writer)
        .and_then(|()| writer.flush())
        .with_context(|| format!("Error while flushing output to {out_filename:?}:"))?;
    Ok(out_filename)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_save_settings_json() {
        let debug_folder = std::env::temp_dir().join(format!("om_hts_svc_debug_{}", std::process::id()));
        std::fs::create_dir_all(&debug_folder).unwrap();
        let data: BTreeMap<&str, u64> = [("distance_variance", 500), ("threads", 2)].into_iter().collect();
        let out_fn = save_settings_json(&data, &debug_folder).unwrap();
        assert_eq!(out_fn, debug_folder.join(SETTINGS_FILENAME));

        let written = std::fs::read_to_string(&out_fn).unwrap();
        assert!(written.ends_with("}\n"));
        let parsed: BTreeMap<String, u64> = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed.get("distance_variance"), Some(&500));
        assert_eq!(parsed.get("threads"), Some(&2));
        std::fs::remove_dir_all(&debug_folder).unwrap();
    }

    #[test]
    fn test_save_settings_missing_folder() {
        let debug_folder = std::env::temp_dir().join(format!("om_hts_svc_missing_{}", std::process::id())).join("nested");
        assert!(save_settings_json(&[1u8, 2], &debug_folder).is_err());
    }
}
