mod config;
mod registry;

use std::path::PathBuf;
use std::time::Instant;

use census_core::{IntegrityViolation, LoadedRecords, redact_database_url};
use census_generate::{GenerationError, Generator, LocaleKey};
use census_store::{
    CsvStore, FileNames, JsonStore, RecordStore, SheetNames, SqlStore, StoreError, XlsxStore,
};
use chrono::Utc;
use clap::{Args, Parser, Subcommand, ValueEnum};
use config::CensusConfig;
use registry::{OutputRecord, RegistryError, RunContext, init_logging, start_run, write_manifest};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
enum CliError {
    #[error("cannot read config file {path}: {source}")]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("integrity error: {0}")]
    Integrity(#[from] IntegrityViolation),
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "census", version, about = "Synthetic people, workplaces and addresses")]
struct Cli {
    /// Settings file (census.toml).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Emit console logs as JSON.
    #[arg(long, global = true, default_value_t = false)]
    log_json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a dataset and write it to every requested format.
    Generate(GenerateArgs),
    /// Read records back from one format and report them.
    Load(LoadArgs),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Csv,
    Json,
    Xlsx,
    Sql,
}

impl Format {
    fn as_str(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Xlsx => "xlsx",
            Self::Sql => "sql",
        }
    }
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Output formats, comma separated.
    #[arg(
        long = "format",
        value_enum,
        value_delimiter = ',',
        default_values_t = [Format::Csv, Format::Json, Format::Xlsx]
    )]
    formats: Vec<Format>,
    /// Output directory for runs.
    #[arg(long, default_value = "runs")]
    run_dir: PathBuf,
    #[arg(long)]
    people: Option<usize>,
    #[arg(long)]
    workplaces: Option<usize>,
    #[arg(long)]
    addresses: Option<usize>,
    #[arg(long)]
    seed: Option<u64>,
    /// Text locale (en_US, pt_BR, fr_FR).
    #[arg(long)]
    locale: Option<String>,
    /// Never repeat a generated name, company, city or country.
    #[arg(long, default_value_t = false)]
    unique: bool,
    #[arg(long, value_name = "CONNECTION_STRING")]
    database_url: Option<String>,
}

#[derive(Args, Debug)]
struct LoadArgs {
    #[arg(long, value_enum)]
    format: Format,
    /// Directory (csv, json) or workbook (xlsx) to read.
    #[arg(long, value_name = "PATH")]
    from: Option<PathBuf>,
    #[arg(long, value_name = "CONNECTION_STRING")]
    database_url: Option<String>,
    /// Print every record instead of the counts.
    #[arg(long, default_value_t = false)]
    records: bool,
}

#[derive(Debug, Serialize)]
struct LoadReport {
    format: &'static str,
    people: usize,
    workplaces: usize,
    addresses: usize,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let config = CensusConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Generate(args) => run_generate(config, args, cli.log_json).await,
        Command::Load(args) => run_load(config, args, cli.log_json).await,
    }
}

async fn run_generate(
    mut config: CensusConfig,
    args: GenerateArgs,
    log_json: bool,
) -> Result<(), CliError> {
    apply_generate_overrides(&mut config, &args)?;
    let csv_options = config.csv_options()?;

    let seed = config
        .seed
        .unwrap_or_else(|| Uuid::new_v4().as_u64_pair().0);
    let ctx = RunContext {
        run_id: Uuid::new_v4().to_string(),
        started_at: Utc::now(),
        seed,
        locale: config.locale.to_string(),
        out_dir: args.run_dir.clone(),
    };
    let paths = start_run(&ctx)?;
    init_logging(log_json, Some(&paths.logs_path))?;

    tracing::info!(
        event = "run_started",
        run_id = %ctx.run_id,
        seed,
        locale = %config.locale,
        dir = %paths.root.display()
    );
    let timer = Instant::now();

    let dataset = Generator::new(seed).generate_dataset(&config.dataset_request())?;
    dataset.verify_integrity()?;
    tracing::info!(event = "integrity_verified");

    let mut outputs = Vec::new();
    for format in dedup(&args.formats) {
        let location = match format {
            Format::Csv => {
                let dir = paths.root.join("csv");
                std::fs::create_dir_all(&dir)?;
                CsvStore::with_options(&dir, FileNames::with_extension("csv"), csv_options)
                    .write_dataset(&dataset)?;
                dir.display().to_string()
            }
            Format::Json => {
                let dir = paths.root.join("json");
                std::fs::create_dir_all(&dir)?;
                JsonStore::with_options(&dir, FileNames::with_extension("json"), config.json_options())
                    .write_dataset(&dataset)?;
                dir.display().to_string()
            }
            Format::Xlsx => {
                let path = paths.root.join(&config.xlsx.file);
                XlsxStore::with_options(&path, SheetNames::default(), config.xlsx_options())
                    .write_dataset(&dataset)?;
                path.display().to_string()
            }
            Format::Sql => {
                let options = config.sql_options();
                SqlStore::from_config(&options)
                    .await?
                    .write_dataset(&dataset)
                    .await?;
                options
                    .url
                    .as_deref()
                    .map(redact_database_url)
                    .unwrap_or_default()
            }
        };
        tracing::info!(event = "output_written", format = format.as_str(), location = %location);
        outputs.push(OutputRecord {
            format: format.as_str().to_string(),
            location,
        });
    }

    write_manifest(&ctx, &paths, dataset.summary(), outputs)?;
    tracing::info!(
        event = "run_finished",
        status = "success",
        duration_ms = timer.elapsed().as_millis()
    );
    println!("{}", paths.root.display());
    Ok(())
}

async fn run_load(config: CensusConfig, args: LoadArgs, log_json: bool) -> Result<(), CliError> {
    init_logging(log_json, None)?;

    let records: LoadedRecords = match args.format {
        Format::Csv => CsvStore::with_options(
            require_source(&args)?,
            FileNames::with_extension("csv"),
            config.csv_options()?,
        )
        .read_all()?,
        Format::Json => JsonStore::with_options(
            require_source(&args)?,
            FileNames::with_extension("json"),
            config.json_options(),
        )
        .read_all()?,
        Format::Xlsx => XlsxStore::with_options(
            require_source(&args)?,
            SheetNames::default(),
            config.xlsx_options(),
        )
        .read_all()?,
        Format::Sql => {
            let mut options = config.sql_options();
            if let Some(url) = args.database_url.clone() {
                options.url = Some(url);
            }
            SqlStore::from_config(&options).await?.read_all().await?
        }
    };

    let output = if args.records {
        serde_json::to_string_pretty(&records)?
    } else {
        serde_json::to_string_pretty(&LoadReport {
            format: args.format.as_str(),
            people: records.people.len(),
            workplaces: records.workplaces.len(),
            addresses: records.addresses.len(),
        })?
    };
    println!("{output}");
    Ok(())
}

fn apply_generate_overrides(config: &mut CensusConfig, args: &GenerateArgs) -> Result<(), CliError> {
    if let Some(people) = args.people {
        config.people.count = people;
    }
    if args.workplaces.is_some() {
        config.workplaces.count = args.workplaces;
    }
    if args.addresses.is_some() {
        config.addresses.count = args.addresses;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if let Some(locale) = &args.locale {
        config.locale = LocaleKey::resolve(locale)?;
    }
    if args.unique {
        config.unique = true;
    }
    if args.database_url.is_some() {
        config.database.url = args.database_url.clone();
    }
    Ok(())
}

fn require_source(args: &LoadArgs) -> Result<PathBuf, CliError> {
    args.from.clone().ok_or_else(|| {
        CliError::InvalidConfig(format!(
            "--from is required when loading {}",
            args.format.as_str()
        ))
    })
}

fn dedup(formats: &[Format]) -> Vec<Format> {
    let mut unique = Vec::with_capacity(formats.len());
    for format in formats {
        if !unique.contains(format) {
            unique.push(*format);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_defaults_to_file_formats() {
        let cli = Cli::try_parse_from(["census", "generate"]).expect("parse");
        let Command::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.formats, vec![Format::Csv, Format::Json, Format::Xlsx]);
        assert_eq!(args.run_dir, PathBuf::from("runs"));
    }

    #[test]
    fn generate_accepts_comma_separated_formats_and_overrides() {
        let cli = Cli::try_parse_from([
            "census",
            "--log-json",
            "generate",
            "--format",
            "csv,sql,csv",
            "--people",
            "10",
            "--seed",
            "99",
            "--locale",
            "fr_FR",
            "--database-url",
            "sqlite://census.db?mode=rwc",
        ])
        .expect("parse");
        assert!(cli.log_json);
        let Command::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(dedup(&args.formats), vec![Format::Csv, Format::Sql]);

        let mut config = CensusConfig::default();
        apply_generate_overrides(&mut config, &args).expect("overrides");
        assert_eq!(config.people.count, 10);
        assert_eq!(config.seed, Some(99));
        assert_eq!(config.locale, LocaleKey::FrFr);
        assert_eq!(
            config.database.url.as_deref(),
            Some("sqlite://census.db?mode=rwc")
        );
    }

    #[test]
    fn unsupported_locale_is_rejected() {
        let cli = Cli::try_parse_from(["census", "generate", "--locale", "hu_HU"]).expect("parse");
        let Command::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        let mut config = CensusConfig::default();
        assert!(matches!(
            apply_generate_overrides(&mut config, &args),
            Err(CliError::Generation(GenerationError::UnsupportedLocale(_)))
        ));
    }

    #[test]
    fn load_requires_a_source_for_files() {
        let cli = Cli::try_parse_from(["census", "load", "--format", "json"]).expect("parse");
        let Command::Load(args) = cli.command else {
            panic!("expected load");
        };
        assert!(matches!(
            require_source(&args),
            Err(CliError::InvalidConfig(_))
        ));
        assert!(Cli::try_parse_from(["census", "load"]).is_err());
    }
}
