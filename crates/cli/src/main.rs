use clap::{Parser, Subcommand};
use prs_core::{
    database_path_from_env_value, AccountService, CoreConfig, Database, NewAccount, PatientService,
};

#[derive(Parser)]
#[command(name = "prs")]
#[command(about = "PRS patient record system CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List all patients
    List,
    /// Show aggregate patient statistics
    Stats,
    /// Register a login account
    Register {
        /// Username for the new account
        username: String,
        /// Password for the new account
        password: String,
        /// Account email
        #[arg(long)]
        email: Option<String>,
        /// Account role: doctor, nurse or patient (default: patient)
        #[arg(long)]
        role: Option<String>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let cfg = CoreConfig::new(database_path_from_env_value(
        std::env::var("PRS_DATABASE_PATH").ok(),
    ));
    let db = Database::open(cfg.database_path())?;

    match cli.command {
        Some(Commands::List) => {
            let service = PatientService::new(db);
            let patients = service.list(None)?;
            if patients.is_empty() {
                println!("No patients found.");
            } else {
                for patient in patients {
                    println!(
                        "ID: {}, Name: {} {}, Created: {}",
                        patient.patient_id,
                        patient.first_name,
                        patient.last_name,
                        patient.created_at.to_rfc3339()
                    );
                }
            }
        }
        Some(Commands::Stats) => {
            let stats = PatientService::new(db).stats()?;
            println!("Total patients:  {}", stats.total_patients);
            println!("Male patients:   {}", stats.male_patients);
            println!("Female patients: {}", stats.female_patients);
            println!("Other patients:  {}", stats.other_patients);
        }
        Some(Commands::Register {
            username,
            password,
            email,
            role,
        }) => {
            let account = AccountService::new(db).register(NewAccount {
                username,
                password,
                email,
                role,
                first_name: None,
                last_name: None,
            })?;
            println!(
                "Registered account {} with role {}",
                account.username,
                account.role.as_str()
            );
        }
        None => {
            println!("No command given; try `prs --help`.");
        }
    }

    Ok(())
}
