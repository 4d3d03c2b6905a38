//! File rotation for the rotating log writer

use std::fs;
use std::path::{Path, PathBuf};

use jiff::{Timestamp, Zoned};

use crate::logger::config::{RotationConfig, RotationStrategy};
use crate::logger::error::LoggerError;

pub struct RotationManager {
    config: RotationConfig,
    last_rotation: Timestamp,
}

impl RotationManager {
    pub fn new(config: RotationConfig) -> Self {
        Self {
            config,
            last_rotation: Timestamp::now(),
        }
    }

    pub fn should_rotate(&self, current_size: u64) -> bool {
        self.should_rotate_at(current_size, Timestamp::now())
    }

    fn should_rotate_at(&self, current_size: u64, now: Timestamp) -> bool {
        match self.config.strategy {
            RotationStrategy::Size => current_size >= self.config.max_size,
            RotationStrategy::Time(unit) => unit.elapsed_since(self.last_rotation, now),
            RotationStrategy::Never => false,
        }
    }

    /// Renames the active file aside and prunes old rotations.
    pub fn rotate(&mut self, current: &Path) -> Result<PathBuf, LoggerError> {
        let rotated = self.rotated_path(current, &Zoned::now());

        if current.exists() {
            fs::rename(current, &rotated).map_err(|e| {
                LoggerError::rotation(format!(
                    "failed to rename {} to {}: {e}",
                    current.display(),
                    rotated.display()
                ))
            })?;
        }

        self.last_rotation = Timestamp::now();
        self.cleanup(current)?;
        Ok(rotated)
    }

    fn rotated_path(&self, base: &Path, at: &Zoned) -> PathBuf {
        let suffix = match self.config.strategy {
            RotationStrategy::Time(unit) => unit.suffix(at),
            _ => at.strftime("%Y%m%d_%H%M%S").to_string(),
        };
        let stem = base.file_stem().unwrap_or_default().to_string_lossy();

        let name = match base.extension() {
            Some(ext) => format!("{stem}.{suffix}.{}", ext.to_string_lossy()),
            None => format!("{stem}.{suffix}"),
        };
        let mut candidate = base.with_file_name(&name);

        // Several rotations inside one second or period
        let mut n = 1;
        while candidate.exists() {
            candidate = base.with_file_name(format!("{name}.{n}"));
            n += 1;
        }
        candidate
    }

    /// Keeps at most `max_files` rotated siblings, removing the oldest first.
    pub fn cleanup(&self, base: &Path) -> Result<(), LoggerError> {
        let parent = match base.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let stem = base.file_stem().unwrap_or_default().to_string_lossy();
        let prefix = format!("{stem}.");

        let mut rotated: Vec<(PathBuf, Option<std::time::SystemTime>)> = fs::read_dir(parent)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path != base
                    && path
                        .file_name()
                        .map(|n| n.to_string_lossy().starts_with(&prefix))
                        .unwrap_or(false)
            })
            .map(|path| {
                let modified = fs::metadata(&path).and_then(|m| m.modified()).ok();
                (path, modified)
            })
            .collect();

        if rotated.len() <= self.config.max_files {
            return Ok(());
        }

        rotated.sort_by(|a, b| a.1.cmp(&b.1));
        let excess = rotated.len() - self.config.max_files;
        for (path, _) in rotated.into_iter().take(excess) {
            fs::remove_file(&path)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::config::TimeUnit;
    use filetime::{FileTime, set_file_mtime};
    use proptest::prelude::*;
    use tempfile::tempdir;

    fn size_config(max_size: u64, max_files: usize) -> RotationConfig {
        RotationConfig::new(RotationStrategy::Size, max_size, max_files).unwrap()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn size_rotation_triggers_at_threshold(current in 0u64..10_000_000, max in 1u64..10_000_000) {
            let manager = RotationManager::new(size_config(max, 5));
            prop_assert_eq!(manager.should_rotate(current), current >= max);
        }
    }

    #[test]
    fn time_rotation_waits_for_period() {
        let config = RotationConfig::new(RotationStrategy::Time(TimeUnit::Hourly), 0, 3).unwrap();
        let manager = RotationManager::new(config);
        let now = manager.last_rotation;

        assert!(!manager.should_rotate_at(u64::MAX, now));
        let later = now.checked_add(jiff::SignedDuration::from_mins(61)).unwrap();
        assert!(manager.should_rotate_at(0, later));
    }

    #[test]
    fn never_strategy_never_rotates() {
        let config = RotationConfig::new(RotationStrategy::Never, 0, 1).unwrap();
        assert!(!RotationManager::new(config).should_rotate(u64::MAX));
    }

    #[test]
    fn rotate_moves_file_aside() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        fs::write(&path, b"line\n").unwrap();

        let mut manager = RotationManager::new(size_config(1, 5));
        let rotated = manager.rotate(&path).unwrap();

        assert!(!path.exists());
        assert_eq!(fs::read(&rotated).unwrap(), b"line\n");
        let name = rotated.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("app.") && name.ends_with(".log"), "{name}");
    }

    #[test]
    fn cleanup_removes_oldest_rotations() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("app.log");
        fs::write(&base, b"active").unwrap();
        fs::write(dir.path().join("other.log"), b"unrelated").unwrap();

        for i in 0..4 {
            let path = dir.path().join(format!("app.2026010{i}.log"));
            fs::write(&path, b"old").unwrap();
            set_file_mtime(&path, FileTime::from_unix_time(1_700_000_000 + i * 60, 0)).unwrap();
        }

        RotationManager::new(size_config(1, 2)).cleanup(&base).unwrap();

        assert!(base.exists());
        assert!(dir.path().join("other.log").exists());
        assert!(!dir.path().join("app.20260100.log").exists());
        assert!(!dir.path().join("app.20260101.log").exists());
        assert!(dir.path().join("app.20260102.log").exists());
        assert!(dir.path().join("app.20260103.log").exists());
    }
}
