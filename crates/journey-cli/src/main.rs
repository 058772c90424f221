use clap::{Args, Parser, Subcommand};
use journey_persistence::{build_dev_pool_from_env, PgJourneyStore};

mod commands;

use commands::{execute, CliError};

#[derive(Parser)]
#[command(name = "journey-cli")]
#[command(about = "Operaciones sobre journeys de miembros persistidos en Postgres", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub target: Target,

    #[command(subcommand)]
    pub command: Command,
}

/// Journey sobre el que opera el comando.
#[derive(Args, Debug, Clone)]
pub struct Target {
    #[arg(long, global = true, default_value = "")]
    pub business_group: String,

    #[arg(long, global = true, default_value = "")]
    pub reference_number: String,

    #[arg(long = "type", global = true, default_value = "")]
    pub journey_type: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Inicia el journey con su primera página
    Start {
        current_page_key: String,
        next_page_key: String,
        /// Página que marca el fin del journey
        #[arg(long)]
        terminal: Option<String>,
    },

    /// Envía una página y fija la siguiente
    Submit {
        current_page_key: String,
        next_page_key: String,
    },

    /// Muestra el resumen del journey
    Show,

    /// Lee el JSON de un formulario
    GetData { page_key: String, form_key: String },

    /// Guarda el JSON de un formulario
    SaveData {
        page_key: String,
        form_key: String,
        json: String,
    },

    /// Lee una lista de checkboxes
    GetCheckboxes { page_key: String, list_key: String },

    /// Guarda respuestas de checkboxes (`clave=true|false`, repetible)
    SaveCheckboxes {
        page_key: String,
        list_key: String,
        #[arg(short, long = "checkbox", value_parser = commands::parse_checkbox)]
        checkboxes: Vec<journey_domain::Checkbox>,
    },

    /// Página anterior a la indicada
    Previous { page_key: String },
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    env_logger::init();
    let cli = Cli::parse();

    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("[journey-cli] requiere DATABASE_URL para operar contra backend persistente");
        std::process::exit(4);
    }
    let pool = match build_dev_pool_from_env() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("[journey-cli] pool error: {e}");
            std::process::exit(5);
        }
    };
    let service = journey_core::JourneyService::new(PgJourneyStore::from_pool(pool));

    match execute(&service, &cli.target, cli.command).await {
        Ok(output) => println!("{output}"),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(exit_code(&e));
        }
    }
}

fn exit_code(err: &CliError) -> i32 {
    match err {
        CliError::Usage(_) => 2,
        CliError::Journey(e) if e.class() == journey_core::ErrorClass::Fatal => 5,
        CliError::Journey(_) => 4,
        CliError::Output(_) => 5,
    }
}
