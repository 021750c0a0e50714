//! Coursegate CLI - course login from the command line
//!
//! Runs the login form flow against a validation endpoint and manages the
//! course store.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use coursegate_client::{
    AccessForm, ClientConfig, EmailStore, FileStore, GrantStore, HttpValidationClient,
    MemoryStore, PrintNavigator, SubmitOutcome, TerminalView,
};
use coursegate_core::{
    derive_access_root, init_logging, log_operation_error, log_operation_start,
    log_operation_success, CourseRecord, LoggingConfig,
};
use coursegate_web::{store::SqliteCourseStore, StoreConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "coursegate")]
#[command(about = "Course access gate client")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in with an email and course code
    Login {
        /// Course code
        #[arg(short, long)]
        code: String,

        /// Laurier email; defaults to the last one that logged in
        #[arg(short, long)]
        email: Option<String>,

        /// Validation endpoint URL (falls back to COURSEGATE_ENDPOINT)
        #[arg(long)]
        endpoint: Option<String>,

        /// Login page URL carrying the next and course parameters
        #[arg(long)]
        page: Option<String>,

        /// Keep the grant and email in memory only
        #[arg(long)]
        no_save: bool,
    },

    /// Print the access root of each path
    Derive {
        /// Paths or URLs
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Show the stored access grant
    Whoami,

    /// Load course records from a JSON file into a SQLite course store
    Import {
        /// JSON array of course records
        file: PathBuf,

        /// SQLite URL (falls back to COURSEGATE_DATABASE_URL)
        #[arg(long)]
        database_url: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let logging_config = if cli.verbose {
        LoggingConfig::verbose()
    } else {
        LoggingConfig {
            level: "warn".to_string(),
            filter_directives: Vec::new(),
            ..LoggingConfig::default()
        }
    };
    if let Err(e) = init_logging(&logging_config) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    let result = match cli.command {
        Commands::Login {
            code,
            email,
            endpoint,
            page,
            no_save,
        } => handle_login(&code, email, endpoint, page, no_save).await,
        Commands::Derive { paths } => {
            handle_derive(&paths);
            Ok(())
        }
        Commands::Whoami => handle_whoami(),
        Commands::Import { file, database_url } => handle_import(&file, database_url).await,
    };

    if let Err(e) = result {
        error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn handle_login(
    code: &str,
    email: Option<String>,
    endpoint: Option<String>,
    page: Option<String>,
    no_save: bool,
) -> anyhow::Result<()> {
    let config = ClientConfig::resolve(endpoint.as_deref(), page.as_deref())?;
    info!(endpoint = %config.endpoint, "Using validation endpoint");

    let (grants, emails): (Arc<dyn GrantStore>, Arc<dyn EmailStore>) = if no_save {
        let memory = Arc::new(MemoryStore::new());
        (memory.clone(), memory)
    } else {
        (
            Arc::new(FileStore::session()?),
            Arc::new(FileStore::persistent()?),
        )
    };

    let form = AccessForm::new(
        HttpValidationClient::new(config.endpoint.clone()),
        grants,
        emails,
        config.page(),
    );

    let mut view = TerminalView::stdout();
    let mut navigator = PrintNavigator::new(config.page_url.clone());

    form.hydrate(&mut view);
    let email = email
        .or_else(|| view.prefilled_email().map(str::to_string))
        .unwrap_or_default();

    match form.submit(&email, code, &mut view, &mut navigator).await {
        SubmitOutcome::Granted { grant, .. } => {
            println!("Access root: {}", grant.access_root);
            Ok(())
        }
        SubmitOutcome::Invalid(field) => bail!("Invalid {:?}", field),
        SubmitOutcome::Denied => bail!("Access denied"),
    }
}

fn handle_derive(paths: &[String]) {
    for path in paths {
        println!("{}\t{}", path, derive_access_root(path));
    }
}

fn handle_whoami() -> anyhow::Result<()> {
    let store = FileStore::session()?;
    match store.load_grant()? {
        Some(grant) => {
            println!("Email:       {}", grant.email);
            println!("Access root: {}", grant.access_root);
            println!(
                "Granted at:  {}",
                grant.granted_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
        }
        None => println!("No access grant stored in {}", store.dir().display()),
    }
    Ok(())
}

async fn handle_import(file: &Path, database_url: Option<String>) -> anyhow::Result<()> {
    log_operation_start!("import", file = %file.display());

    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let records: Vec<CourseRecord> = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON array of course records", file.display()))?;

    let mut config = StoreConfig::from_env();
    if database_url.is_some() {
        config.database_url = database_url;
    }

    let store = SqliteCourseStore::create(&config).await?;
    for record in &records {
        if let Err(e) = store.upsert(record).await {
            log_operation_error!("import", e, code = record.code.as_str());
            return Err(e.into());
        }
    }
    store.pool().close().await;

    log_operation_success!("import", records = records.len());
    println!("Imported {} course record(s)", records.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use coursegate_core::CourseStore;

    #[test]
    fn test_login_args() {
        let cli = Cli::parse_from([
            "coursegate",
            "login",
            "--code",
            "CP104",
            "--email",
            "abcd1234@mylaurier.ca",
            "--page",
            "https://courses.example.com/login/?next=/cp104/",
        ]);
        match cli.command {
            Commands::Login {
                code,
                email,
                page,
                no_save,
                endpoint,
            } => {
                assert_eq!(code, "CP104");
                assert_eq!(email.as_deref(), Some("abcd1234@mylaurier.ca"));
                assert!(page.is_some());
                assert!(endpoint.is_none());
                assert!(!no_save);
            }
            _ => panic!("expected login"),
        }
    }

    #[test]
    fn test_derive_requires_paths() {
        assert!(Cli::try_parse_from(["coursegate", "derive"]).is_err());
        let cli = Cli::parse_from(["coursegate", "-v", "derive", "/a/b.html", "/c"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Derive { paths } if paths.len() == 2));
    }

    #[tokio::test]
    async fn test_import_into_new_database() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("courses.json");
        std::fs::write(
            &file,
            r#"[{"code":"CP104","redirectTo":"/cp104/"},{"code":"CP164","active":false}]"#,
        )
        .unwrap();
        let url = format!("sqlite://{}", dir.path().join("courses.db").display());

        handle_import(&file, Some(url.clone())).await.unwrap();

        let store = SqliteCourseStore::open(&StoreConfig::with_url(url))
            .await
            .unwrap();
        let hit = store.find_active("CP104").await.unwrap().unwrap();
        assert_eq!(hit.next_path(), "/cp104/");
        assert!(store.find_active("CP164").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_import_rejects_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("courses.json");
        std::fs::write(&file, "{}").unwrap();

        let url = format!("sqlite://{}", dir.path().join("courses.db").display());
        assert!(handle_import(&file, Some(url)).await.is_err());
    }
}
