use chrono::SecondsFormat;
use clap::{Args, Parser, Subcommand};
use preop_core::{
    config::persist_attempts_from_env_value, formulary, CoreConfig, PatientRecord, RawReading,
    RiskClassifier, Session, VitalSignKind,
};
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "preop")]
#[command(about = "Preop pre-anaesthetic assessment CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List anesthesia drugs and dosages
    Drugs,
    /// Show risk tier and anesthetic plan for an ASA class
    Classify {
        /// ASA classification (1-5)
        asa: String,
    },
    /// Record a patient's vital signs
    AddPatient(PatientArgs),
    /// Assess a procedure against the most recent patient
    Procedure {
        /// Procedure name
        name: String,
    },
    /// List all recorded patients
    List,
    /// Search patients by name
    Search {
        /// Case-insensitive name fragment
        query: String,
    },
    /// Show one patient record
    Show {
        /// Patient record UUID
        id: String,
    },
}

/// Raw form fields. Values are passed through as text and validated by the core engine.
#[derive(Args)]
struct PatientArgs {
    /// Patient name
    #[arg(long, default_value = "")]
    name: String,
    /// Age
    #[arg(long, default_value = "")]
    age: String,
    /// Weight (kg)
    #[arg(long, default_value = "")]
    weight: String,
    /// Height (cm)
    #[arg(long, default_value = "")]
    height: String,
    /// Blood pressure systolic (mmHg)
    #[arg(long, default_value = "")]
    bp_systolic: String,
    /// Blood pressure diastolic (mmHg)
    #[arg(long, default_value = "")]
    bp_diastolic: String,
    /// Heart rate (bpm)
    #[arg(long, default_value = "")]
    hr: String,
    /// Respiratory rate (breaths/min)
    #[arg(long, default_value = "")]
    rr: String,
    /// Temperature (°C)
    #[arg(long, default_value = "")]
    temp: String,
    /// Oxygen saturation (%)
    #[arg(long, default_value = "")]
    spo2: String,
    /// ASA classification (1-5)
    #[arg(long, default_value = "")]
    asa: String,
}

impl From<PatientArgs> for RawReading {
    fn from(args: PatientArgs) -> Self {
        RawReading {
            name: args.name,
            age: args.age,
            weight: args.weight,
            height: args.height,
            bp_systolic: args.bp_systolic,
            bp_diastolic: args.bp_diastolic,
            hr: args.hr,
            rr: args.rr,
            temp: args.temp,
            spo2: args.spo2,
            asa: args.asa,
        }
    }
}

fn open_session() -> Result<Session, Box<dyn std::error::Error>> {
    let patient_data_dir = std::env::var("PATIENT_DATA_DIR")
        .unwrap_or_else(|_| preop_core::DEFAULT_PATIENT_DATA_DIR.into());
    let persist_attempts =
        persist_attempts_from_env_value(std::env::var("PREOP_PERSIST_ATTEMPTS").ok())?;
    let cfg = CoreConfig::new(PathBuf::from(patient_data_dir), persist_attempts)?;
    Ok(Session::open(Arc::new(cfg))?)
}

fn print_record(record: &PatientRecord) {
    println!(
        "ID: {}, Name: {}, Age: {}, ASA: {}, Recorded: {}",
        record.id.simple(),
        record.name,
        record.age,
        record.asa,
        record
            .recorded_at
            .to_rfc3339_opts(SecondsFormat::Secs, true)
    );
}

fn print_details(record: &PatientRecord) {
    print_record(record);
    for kind in VitalSignKind::ALL {
        match record.vitals.get(kind) {
            Some(value) => println!("  {}: {} {}", kind.label(), value, kind.unit()),
            None => println!("  {}: (not recorded)", kind.label()),
        }
    }
    for finding in &record.findings {
        println!("  ! {finding}");
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Drugs) => {
            for drug in formulary() {
                println!("{:<28} {}", drug.name, drug.dosage);
            }
        }
        Some(Commands::Classify { asa }) => {
            match asa
                .trim()
                .parse::<i64>()
                .map_err(|_| "Please enter a valid ASA classification.".to_string())
                .and_then(|value| RiskClassifier::classify(value).map_err(|e| e.to_string()))
            {
                Ok(classification) => {
                    println!("Risk Level: {}", classification.tier);
                    println!("Anesthetic Plan: {}", classification.plan);
                }
                Err(e) => eprintln!("Error classifying ASA: {}", e),
            }
        }
        Some(Commands::AddPatient(args)) => {
            let mut session = open_session()?;
            match session.submit_patient(&args.into()) {
                Ok(record) if record.has_findings() => {
                    println!("Abnormal values:");
                    for finding in &record.findings {
                        println!("  {finding}");
                    }
                    println!("Recorded patient with ID: {}", record.id.simple());
                }
                Ok(record) => {
                    println!("Patient information submitted successfully.");
                    println!("Recorded patient with ID: {}", record.id.simple());
                }
                Err(e) => eprintln!("Error submitting patient: {}", e),
            }
        }
        Some(Commands::Procedure { name }) => {
            let session = open_session()?;
            match session.submit_procedure(&name) {
                Ok(advisory) => {
                    println!("Procedure Name: {}", advisory.procedure);
                    println!("Risk Level: {}", advisory.classification.tier);
                    println!("Anesthetic Plan: {}", advisory.classification.plan);
                    println!("{}", advisory.message);
                }
                Err(e) => eprintln!("Error submitting procedure: {}", e),
            }
        }
        Some(Commands::List) => {
            let session = open_session()?;
            if session.patients().is_empty() {
                println!("No patients found.");
            } else {
                for record in session.patients() {
                    print_record(record);
                }
            }
        }
        Some(Commands::Search { query }) => {
            let session = open_session()?;
            let hits = session.search(&query);
            if hits.is_empty() {
                println!("No patients match '{}'.", query);
            } else {
                for record in hits {
                    print_record(record);
                }
            }
        }
        Some(Commands::Show { id }) => {
            let id = Uuid::parse_str(id.trim())?;
            let session = open_session()?;
            match session.find(&id) {
                Some(record) => print_details(record),
                None => eprintln!("No patient with ID: {}", id.simple()),
            }
        }
        None => {
            println!("Use 'preop --help' for commands");
        }
    }

    Ok(())
}
