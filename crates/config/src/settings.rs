use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use figment::Figment;
use figment::providers::{Env, Format, Json, Toml, Yaml};
use keeper_jobs::{ArchiveJobSpec, TransferJobSpec};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Prefix of environment variables that override file settings.
pub const ENV_PREFIX: &str = "KEEPER_";
const FILE_STEM: &str = "settings";
const EXTENSIONS: [&str; 4] = ["toml", "yaml", "yml", "json"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable, for terminals.
    #[default]
    Pretty,
    /// One JSON object per event, for log shippers.
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Default `tracing` filter directive. `RUST_LOG` takes precedence.
    pub level: String,
    pub format: LogFormat,
}
impl Default for LogSettings {
    fn default() -> Self {
        Self { level: "info".to_string(), format: LogFormat::default() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ArchiveSettings {
    /// Upper bound on concurrently running archive units, across all jobs.
    pub max_workers: usize,
    pub jobs: Vec<ArchiveJobSpec>,
}
impl Default for ArchiveSettings {
    fn default() -> Self {
        Self { max_workers: 4, jobs: Vec::new() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TransferSettings {
    /// Location of the transfer log.
    pub registry: PathBuf,
    pub jobs: Vec<TransferJobSpec>,
}
impl Default for TransferSettings {
    fn default() -> Self {
        Self { registry: PathBuf::from(keeper_registry::DEFAULT_LOG_PATH), jobs: Vec::new() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NotifySettings {
    /// Connection URL of the database notification statements run against.
    /// Without it, jobs with a notification template only log a warning.
    pub database: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub log: LogSettings,
    pub archive: ArchiveSettings,
    pub transfer: TransferSettings,
    pub notify: NotifySettings,
}

impl Settings {
    /// Load settings from `path`, or from the first config file found in the
    /// default locations, with environment overrides applied on top.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::from_file(Self::locate(path)?.as_deref())
    }

    /// The config file [`Settings::load`] would read: `path` itself, which
    /// must exist, or the first existing [candidate](Settings::candidates).
    /// `None` means defaults and environment only.
    pub fn locate(path: Option<&Path>) -> Result<Option<PathBuf>> {
        match path {
            Some(path) if path.is_file() => Ok(Some(path.to_path_buf())),
            Some(path) => exn::bail!(ErrorKind::NotFound(path.to_path_buf())),
            None => Ok(Self::discover()),
        }
    }

    /// Load settings from `file` (if any) with environment overrides.
    pub fn from_file(file: Option<&Path>) -> Result<Self> {
        Self::from_figment(Self::figment(file)?)
    }

    /// Default config file locations, in the order they are tried.
    pub fn candidates() -> Vec<PathBuf> {
        let mut dirs = vec![PathBuf::from(".")];
        if let Some(project) = ProjectDirs::from("", "", "keeper") {
            dirs.push(project.config_dir().to_path_buf());
        }
        dirs.iter()
            .flat_map(|dir| EXTENSIONS.iter().map(move |ext| dir.join(format!("{FILE_STEM}.{ext}"))))
            .collect()
    }

    fn discover() -> Option<PathBuf> {
        Self::candidates().into_iter().find(|candidate| candidate.is_file())
    }

    /// The provider stack: `file` (if any) overridden by the environment.
    pub fn figment(file: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::new();
        if let Some(file) = file {
            let extension = file.extension().and_then(|ext| ext.to_str()).map(str::to_ascii_lowercase);
            figment = match extension.as_deref() {
                Some("toml") => figment.merge(Toml::file(file)),
                Some("yaml" | "yml") => figment.merge(Yaml::file(file)),
                Some("json") => figment.merge(Json::file(file)),
                _ => exn::bail!(ErrorKind::UnsupportedFormat(file.to_path_buf())),
            };
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Extract, number and validate settings from any provider stack.
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let mut settings: Self = figment.extract().map_err(|err| ErrorKind::Parse(err.to_string()))?;
        settings.assign_ids();
        settings.validate()?;
        Ok(settings)
    }

    /// Jobs without an id (or with id 0) are numbered by their 1-based
    /// position in their list.
    fn assign_ids(&mut self) {
        fn position(index: usize) -> u32 {
            u32::try_from(index + 1).unwrap_or(u32::MAX)
        }
        for (index, job) in self.archive.jobs.iter_mut().enumerate() {
            if job.id == 0 {
                job.id = position(index);
            }
        }
        for (index, job) in self.transfer.jobs.iter_mut().enumerate() {
            if job.id == 0 {
                job.id = position(index);
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        fn empty(path: &Path) -> bool {
            path.as_os_str().is_empty()
        }

        if self.archive.max_workers == 0 {
            exn::bail!(ErrorKind::Invalid("archive.max_workers must be at least 1".to_string()));
        }
        for job in &self.archive.jobs {
            if empty(&job.source_dir) || empty(&job.dest_dir) {
                exn::bail!(ErrorKind::Invalid(format!("archive job {} needs source_dir and dest_dir", job.id)));
            }
            if job.patterns().next().is_none() {
                exn::bail!(ErrorKind::Invalid(format!("archive job {} has no file patterns", job.id)));
            }
        }
        for job in &self.transfer.jobs {
            if empty(&job.source_dir) || empty(&job.dest_dir) {
                exn::bail!(ErrorKind::Invalid(format!("transfer job {} needs source_dir and dest_dir", job.id)));
            }
            if job.file_pattern.trim().is_empty() {
                exn::bail!(ErrorKind::Invalid(format!("transfer job {} has an empty file_pattern", job.id)));
            }
        }
        if empty(&self.transfer.registry) {
            exn::bail!(ErrorKind::Invalid("transfer.registry must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use keeper_compress::Compression;
    use rstest::rstest;

    const TOML: &str = r#"
        [log]
        format = "json"

        [archive]
        max_workers = 2

        [[archive.jobs]]
        source_dir = "/var/log/app"
        dest_dir = "/backup/app"
        file_patterns = "*.log,*.out"
        pattern_separator = ","
        delete_original = true
        compression = "bzip2"

        [[archive.jobs]]
        id = 9
        source_dir = "/var/log/db"
        dest_dir = "/backup/db"
        file_patterns = "*.log"
        min_age_hours = 0

        [[transfer.jobs]]
        file_pattern = "report_YYYYMMDD.csv"
        transfer_type = "MOVE"
        source_dir = "/srv/outgoing"
        dest_dir = "/srv/inbox"
        process_once = true
        notify_template = "INSERT INTO uploads VALUES ('FILENAME')"

        [notify]
        database = "sqlite:///var/lib/keeper/uploads.db"
    "#;

    #[test]
    fn test_load_toml() {
        Jail::expect_with(|jail| {
            jail.create_file("keeper.toml", TOML)?;
            let settings = Settings::load(Some(Path::new("keeper.toml"))).unwrap();

            assert_eq!(settings.log, LogSettings { level: "info".to_string(), format: LogFormat::Json });
            assert_eq!(settings.archive.max_workers, 2);
            let [first, second] = settings.archive.jobs.as_slice() else { panic!("expected two archive jobs") };
            assert_eq!(first.id, 1);
            assert_eq!(first.min_age_hours, 24);
            assert_eq!(first.compression, Compression::Bzip2);
            assert!(first.delete_original);
            assert_eq!(first.patterns().collect::<Vec<_>>(), vec!["*.log", "*.out"]);
            assert_eq!(second.id, 9);
            assert_eq!(second.min_age_hours, 0);
            assert_eq!(second.compression, Compression::Deflate);

            assert_eq!(settings.transfer.registry, PathBuf::from("./processed_files.csv"));
            let [transfer] = settings.transfer.jobs.as_slice() else { panic!("expected one transfer job") };
            assert_eq!(transfer.identity(), "Job_1_MOVE");
            assert!(transfer.process_once);
            assert_eq!(settings.notify.database.as_deref(), Some("sqlite:///var/lib/keeper/uploads.db"));
            Ok(())
        });
    }

    #[test]
    fn test_load_yaml() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "keeper.yml",
                concat!(
                    "transfer:\n",
                    "  registry: /tmp/log.csv\n",
                    "  jobs:\n",
                    "    - file_pattern: \"*.dat\"\n",
                    "      transfer_type: copy\n",
                    "      source_dir: /in\n",
                    "      dest_dir: /out\n",
                ),
            )?;
            let settings = Settings::load(Some(Path::new("keeper.yml"))).unwrap();
            assert_eq!(settings.transfer.registry, PathBuf::from("/tmp/log.csv"));
            assert_eq!(settings.transfer.jobs[0].identity(), "Job_1_copy");
            assert!(!settings.transfer.jobs[0].process_once);
            Ok(())
        });
    }

    #[test]
    fn test_discovers_settings_in_working_directory() {
        Jail::expect_with(|jail| {
            jail.create_file("settings.json", r#"{"archive": {"max_workers": 7}}"#)?;
            assert_eq!(Settings::load(None).unwrap().archive.max_workers, 7);
            Ok(())
        });
    }

    #[test]
    fn test_environment_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("settings.toml", TOML)?;
            jail.set_env("KEEPER_ARCHIVE__MAX_WORKERS", "16");
            jail.set_env("KEEPER_LOG__LEVEL", "debug");
            let settings = Settings::load(None).unwrap();
            assert_eq!(settings.archive.max_workers, 16);
            assert_eq!(settings.log.level, "debug");
            assert_eq!(settings.archive.jobs.len(), 2);
            Ok(())
        });
    }

    #[test]
    fn test_defaults_without_file() {
        Jail::expect_with(|_jail| {
            let settings = Settings::from_figment(Settings::figment(None).unwrap()).unwrap();
            assert_eq!(settings, Settings::default());
            assert_eq!(settings.archive.max_workers, 4);
            Ok(())
        });
    }

    #[test]
    fn test_locate() {
        Jail::expect_with(|jail| {
            assert_eq!(Settings::locate(None).unwrap(), None);
            jail.create_file("settings.yaml", "archive: {}")?;
            jail.create_file("other.toml", "")?;
            assert_eq!(Settings::locate(None).unwrap(), Some(PathBuf::from("./settings.yaml")));
            assert_eq!(Settings::locate(Some(Path::new("other.toml"))).unwrap(), Some(PathBuf::from("other.toml")));
            Ok(())
        });
    }

    #[test]
    fn test_missing_explicit_file() {
        Jail::expect_with(|_jail| {
            let err = Settings::load(Some(Path::new("absent.toml"))).unwrap_err();
            assert!(matches!(&*err, ErrorKind::NotFound(_)));
            Ok(())
        });
    }

    #[test]
    fn test_unsupported_format() {
        Jail::expect_with(|jail| {
            jail.create_file("settings.ini", "[archive]")?;
            let err = Settings::load(Some(Path::new("settings.ini"))).unwrap_err();
            assert!(matches!(&*err, ErrorKind::UnsupportedFormat(_)));
            Ok(())
        });
    }

    #[rstest]
    #[case("[archive]\nmax_workers = 0")]
    #[case(concat!(
        "[[archive.jobs]]\nsource_dir = \"/a\"\ndest_dir = \"/b\"\n",
        "file_patterns = \" , \"\npattern_separator = \",\"",
    ))]
    #[case("[[archive.jobs]]\nsource_dir = \"\"\ndest_dir = \"/b\"\nfile_patterns = \"*\"")]
    #[case("[[transfer.jobs]]\nfile_pattern = \" \"\ntransfer_type = \"COPY\"\nsource_dir = \"/a\"\ndest_dir = \"/b\"")]
    fn test_invalid(#[case] toml: &str) {
        Jail::expect_with(|jail| {
            jail.create_file("settings.toml", toml)?;
            let err = Settings::load(None).unwrap_err();
            assert!(matches!(&*err, ErrorKind::Invalid(_)), "{err:?}");
            Ok(())
        });
    }

    #[rstest]
    #[case("[archive]\nmax_workers = \"many\"")]
    #[case("[[archive.jobs]]\nsource_dir = \"/a\"\ndest_dir = \"/b\"\nfile_patterns = \"*\"\ncompression = \"gzip\"")]
    #[case("[[transfer.jobs]]\nfile_pattern = \"*\"")]
    fn test_unparseable(#[case] toml: &str) {
        Jail::expect_with(|jail| {
            jail.create_file("settings.toml", toml)?;
            let err = Settings::load(None).unwrap_err();
            assert!(matches!(&*err, ErrorKind::Parse(_)), "{err:?}");
            Ok(())
        });
    }
}
