use std::fmt;

use chrono::{DateTime, Utc};
use quiz_core::model::{Identity, Item};
use storage::repository::{CatalogRecord, CatalogScope, ItemRepository, Storage};

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    identity: Option<Identity>,
    items: u32,
    skip_general: bool,
    now: Option<DateTime<Utc>>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidIdentity { raw: String },
    InvalidItems { raw: String },
    InvalidDbUrl { raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidIdentity { raw } => write!(f, "invalid --identity value: {raw:?}"),
            ArgsError::InvalidItems { raw } => write!(f, "invalid --items value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidNow { raw } => {
                write!(f, "invalid --now value (expected RFC3339): {raw}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_identity(raw: String) -> Result<Identity, ArgsError> {
    Identity::new(raw.as_str()).map_err(|_| ArgsError::InvalidIdentity { raw })
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("QUIZ_DB_URL").unwrap_or_else(|_| "sqlite:dev.sqlite3?mode=rwc".into());
        let mut identity = match std::env::var("QUIZ_SEED_IDENTITY") {
            Ok(raw) => Some(parse_identity(raw)?),
            Err(_) => None,
        };
        let mut items = std::env::var("QUIZ_SEED_ITEMS")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(8);
        let mut skip_general = false;
        let mut now: Option<DateTime<Utc>> = None;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--identity" => {
                    let value = require_value(&mut args, "--identity")?;
                    identity = Some(parse_identity(value)?);
                }
                "--items" => {
                    let value = require_value(&mut args, "--items")?;
                    items = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidItems { raw: value.clone() })?;
                }
                "--skip-general" => skip_general = true,
                "--now" => {
                    let value = require_value(&mut args, "--now")?;
                    let parsed = DateTime::parse_from_rfc3339(&value)
                        .map_err(|_| ArgsError::InvalidNow { raw: value.clone() })?
                        .with_timezone(&Utc);
                    now = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            identity,
            items,
            skip_general,
            now,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite:dev.sqlite3?mode=rwc)");
    eprintln!("  --identity <id>           Also fill this learner's personal library");
    eprintln!("  --items <n>               Sample items per collection (default: 8)");
    eprintln!("  --skip-general            Do not touch the shared pool");
    eprintln!("  --now <rfc3339>           Fixed current time for deterministic seeding");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  QUIZ_DB_URL, QUIZ_SEED_IDENTITY, QUIZ_SEED_ITEMS");
}

const SAMPLES: [(&str, &str); 10] = [
    ("elma", "apple"),
    ("kedi", "cat"),
    ("köpek", "dog"),
    ("kitap", "book"),
    ("sandalye", "chair"),
    ("bardak", "cup"),
    ("saat", "clock"),
    ("araba", "car"),
    ("masa", "table"),
    ("telefon", "phone"),
];

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::sqlite(&args.db_url).await?;
    let now = args.now.unwrap_or_else(Utc::now);

    let mut scopes = Vec::new();
    if !args.skip_general {
        scopes.push(CatalogScope::General);
    }
    if let Some(identity) = &args.identity {
        scopes.push(CatalogScope::Personal(identity.clone()));
    }

    for scope in &scopes {
        for i in 0..args.items {
            let idx = (i as usize) % SAMPLES.len();
            let (label, slug) = SAMPLES[idx];
            let record = match scope {
                CatalogScope::General => CatalogRecord {
                    label: label.to_owned(),
                    photo_url: None,
                    image_url: Some(format!("https://img.example.org/general/{slug}.png")),
                    recognized_at: now,
                },
                CatalogScope::Personal(_) => {
                    let item = Item::parse(label, format!("photos/{slug}-{i}.jpg"))?;
                    CatalogRecord::from_item(&item, now)
                }
            };
            storage.items.insert_record(scope, &record).await?;
        }
    }

    println!(
        "Seeded {} items into {} collection(s) of {}",
        args.items,
        scopes.len(),
        args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
