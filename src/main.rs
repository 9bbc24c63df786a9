use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use std::path::{Path, PathBuf};

use residual_tracker::config::Settings;
use residual_tracker::dosing::{load_records, records_between, DoseRecord};
use residual_tracker::engine::{
    active_substances, due_critical_reminders, next_peak_time, plan_dose_for_target,
    sample_curve, total_residual_amount, total_residual_percent,
};
use residual_tracker::models::{create_model, DecayModelKind};
use residual_tracker::output;
use residual_tracker::time::{format_local, next_daily_at, now_millis, MS_PER_HOUR};

#[derive(Parser)]
#[command(name = "residual-tracker")]
#[command(about = "Estimate how much of each logged substance remains active")]
struct Cli {
    /// Settings file (JSON); defaults are used when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Residual amount and lifetime-relative percent of one substance
    Level {
        #[arg(short, long)]
        records: PathBuf,
        #[arg(short, long)]
        substance: String,
        /// Query instant in ms since the epoch (default: now)
        #[arg(long)]
        at: Option<i64>,
    },

    /// Recently taken substances still above the minimum level
    Active {
        #[arg(short, long)]
        records: PathBuf,
        #[arg(long)]
        at: Option<i64>,
        /// Write the ranked list as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// When each substance will fall below the reminder threshold
    Reminder {
        #[arg(short, long)]
        records: PathBuf,
        /// Limit to one substance (default: all known substances)
        #[arg(short, long)]
        substance: Option<String>,
        #[arg(long)]
        at: Option<i64>,
    },

    /// Dose and intake time needed to reach a target amount at a target time
    Plan {
        #[arg(short, long)]
        substance: String,
        /// Target instant in ms since the epoch
        #[arg(long)]
        target_at: i64,
        #[arg(long)]
        target_amount: f64,
        /// Earlier intake whose residual counts toward the target
        #[arg(short, long)]
        records: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Sample one substance's curve to CSV
    Curve {
        #[arg(short, long)]
        records: PathBuf,
        #[arg(short, long)]
        substance: String,
        /// Start instant (default: 6 hours ago)
        #[arg(long)]
        from: Option<i64>,
        /// End instant (default: 18 hours ahead)
        #[arg(long)]
        to: Option<i64>,
        #[arg(long, default_value = "15")]
        step_minutes: i64,
        /// first_order or absorption_phase (default: from settings)
        #[arg(long)]
        model: Option<DecayModelKind>,
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Re-export records as CSV with local timestamps
    Export {
        #[arg(short, long)]
        records: PathBuf,
        /// Only records taken at or after this instant
        #[arg(long)]
        from: Option<i64>,
        /// Only records taken at or before this instant
        #[arg(long)]
        to: Option<i64>,
        #[arg(short, long)]
        output: PathBuf,
    },

    /// List known substances
    Catalog,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    let settings = match &cli.config {
        Some(path) => {
            let settings = Settings::from_file(path)
                .with_context(|| format!("loading settings from {:?}", path))?;
            info!("Loaded settings from {:?}", path);
            settings
        },
        None => Settings::default(),
    };
    let catalog = settings.catalog()?;
    let offset = settings.display_utc_offset_hours;

    match cli.command {
        Command::Level { records, substance, at } => {
            let records = read_records(&records)?;
            let profile = catalog.get(&substance)?;
            let at = at.unwrap_or_else(now_millis);

            let amount = total_residual_amount(&records, profile, settings.body_weight_kg, at);
            let percent = total_residual_percent(&records, profile, settings.body_weight_kg, at);
            println!(
                "{} at {}: {:.3} {} ({:.1}% of lifetime dose)",
                profile.name, format_local(at, offset), amount, profile.unit, percent
            );
            if let Some(peak_at) = next_peak_time(&records, profile, at) {
                println!("Next peak at {}", format_local(peak_at, offset));
            }
        },

        Command::Active { records, at, output: json_path } => {
            let records = read_records(&records)?;
            let at = at.unwrap_or_else(now_millis);
            let active = active_substances(
                &records,
                &catalog.profiles(),
                settings.body_weight_kg,
                at,
                &settings.active,
            );

            println!("{}", output::format_active(&active));
            if let Some(path) = json_path {
                output::save_json(&active, &path)?;
            }
        },

        Command::Reminder { records, substance, at } => {
            let records = read_records(&records)?;
            let now = at.unwrap_or_else(now_millis);
            let policy = settings.reminder_policy();

            let profiles = match substance {
                Some(name) => vec![catalog.get(&name)?.clone()],
                None => catalog.profiles(),
            };

            let reminders = policy.evaluate_all(&records, &profiles, settings.body_weight_kg, now);
            if reminders.is_empty() {
                println!("No reminders due");
            }
            for reminder in &reminders {
                println!("{}", output::format_reminder(reminder, offset));
            }

            let hour = settings.critical_reminder_hour;
            for profile in due_critical_reminders(&records, &profiles, now, hour, offset) {
                println!("{}: no intake recorded today", profile.name);
            }
            match next_daily_at(now, hour, offset) {
                Some(next) => info!("Next daily critical check at {}", format_local(next, offset)),
                None => warn!("Could not schedule the daily critical check after {}", now),
            }
        },

        Command::Plan { substance, target_at, target_amount, records, output: json_path } => {
            let profile = catalog.get(&substance)?;
            let existing = match records {
                Some(path) => read_records(&path)?,
                None => Vec::new(),
            };

            match plan_dose_for_target(profile, target_at, target_amount, settings.body_weight_kg, &existing) {
                Some(plan) => {
                    println!("{}", output::format_plan(&plan, offset));
                    if let Some(path) = json_path {
                        output::save_json(&plan, &path)?;
                    }
                },
                None => println!("No dose needed: residual already meets the target"),
            }
        },

        Command::Curve { records, substance, from, to, step_minutes, model, output: csv_path } => {
            let records = read_records(&records)?;
            let profile = catalog.get(&substance)?;
            let now = now_millis();
            let from = from.unwrap_or_else(|| now.saturating_sub(6 * MS_PER_HOUR));
            let to = to.unwrap_or_else(|| now.saturating_add(18 * MS_PER_HOUR));
            let model = create_model(model.unwrap_or(settings.decay_model));

            let curve = sample_curve(
                &records,
                profile,
                settings.body_weight_kg,
                from,
                to,
                step_minutes,
                model.as_ref(),
            );
            if curve.is_empty() {
                warn!("Empty time range {}..{} with step {} min", from, to, step_minutes);
            }
            output::save_curve_csv(&profile.name, &curve, &csv_path, offset)?;
        },

        Command::Export { records, from, to, output: csv_path } => {
            let records = read_records(&records)?;
            let window = records_between(
                &records,
                from.unwrap_or(i64::MIN),
                to.unwrap_or(i64::MAX),
            );
            output::export_records_csv(&window, &csv_path, offset)?;
        },

        Command::Catalog => {
            for profile in catalog.profiles() {
                println!(
                    "{:<24} t½ {:>6.2} h  tmax {:>4.2} h  {:<3}{}{}{}",
                    profile.name,
                    profile.half_life_hours,
                    profile.tmax_hours,
                    profile.unit,
                    if profile.is_lipophilic { "  lipophilic" } else { "" },
                    if profile.is_critical { "  critical" } else { "" },
                    if profile.is_custom { "  custom" } else { "" },
                );
            }
        },
    }

    Ok(())
}

fn read_records(path: &Path) -> Result<Vec<DoseRecord>> {
    load_records(path).with_context(|| format!("reading dose records from {:?}", path))
}
