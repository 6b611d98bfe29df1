//! MegaPass - Daily Wi-Fi password generator CLI

use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use megapass_cli::{Storage, WifiJoinCode};
use megapass_core::{
    Action, ConfirmReason, CredentialOrigin, CredentialService, DigitWidth, Error,
    SetManualOutcome, SystemClock, Theme, ThreadRngSource,
};

/// MegaPass - Daily Wi-Fi password generator
#[derive(Parser)]
#[command(name = "megapass")]
#[command(about = "Daily Wi-Fi password generator with scannable join codes")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the MegaPass data directory
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new password for today
    Generate {
        /// Skip printing the join code
        #[arg(long)]
        no_qr: bool,
    },

    /// Show today's password and its join code
    Show {
        /// Print only the join code
        #[arg(long)]
        qr_only: bool,
    },

    /// Set today's password manually (format Mega###* or Mega####*)
    Set {
        credential: String,

        /// Answer yes to confirmation prompts
        #[arg(long)]
        yes: bool,
    },

    /// Print the raw password for piping into a clipboard tool
    Copy,

    /// Show this month's passwords and recent actions
    History {
        /// Maximum number of actions to show
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Show month, entry count, and preferences
    Status,

    /// Update a preference
    Config {
        #[command(subcommand)]
        setting: ConfigSetting,
    },
}

#[derive(Subcommand)]
enum ConfigSetting {
    /// Color theme
    Theme { value: ThemeArg },

    /// Password digit format
    Digits { value: DigitsArg },

    /// Network name embedded in the join code
    Ssid { value: String },
}

/// Theme argument (CLI-facing version)
#[derive(Clone, Copy, ValueEnum)]
enum ThemeArg {
    Dark,
    Light,
}

impl From<ThemeArg> for Theme {
    fn from(arg: ThemeArg) -> Self {
        match arg {
            ThemeArg::Dark => Theme::Dark,
            ThemeArg::Light => Theme::Light,
        }
    }
}

/// Digit format argument (CLI-facing version)
#[derive(Clone, Copy, ValueEnum)]
enum DigitsArg {
    Three,
    Four,
}

impl From<DigitsArg> for DigitWidth {
    fn from(arg: DigitsArg) -> Self {
        match arg {
            DigitsArg::Three => DigitWidth::Three,
            DigitsArg::Four => DigitWidth::Four,
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "megapass=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => Storage::default_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine a data directory; pass --data-dir"))?,
    };
    let storage = Storage::new(data_dir)?;
    let mut service = CredentialService::open(storage, SystemClock, ThreadRngSource)?;

    match cli.command {
        Commands::Generate { no_qr } => {
            let entry = service.generate()?;
            info!("New password generated");

            println!("\n=== Today's Password ===\n");
            println!("{}", entry.value);
            if !no_qr {
                print_join_code(service.network_name(), &entry.value);
            }
        }

        Commands::Show { qr_only } => match service.reveal_today() {
            Ok(value) => {
                if !qr_only {
                    println!("\n=== Today's Password ===\n");
                    println!("{}", value);
                }
                print_join_code(service.network_name(), &value);
            }
            Err(Error::NoCredentialToday) => {
                println!("No password for today. Run 'megapass generate' first.");
            }
            Err(e) => return Err(e.into()),
        },

        Commands::Set { credential, yes } => match service.set_manual(&credential)? {
            SetManualOutcome::Applied(entry) => {
                println!("Manual password set successfully.");
                print_join_code(service.network_name(), &entry.value);
            }
            SetManualOutcome::NeedsConfirmation(reason) => {
                let prompt = match reason {
                    ConfirmReason::ReplaceToday => {
                        "A password for today already exists. Replace it?"
                    }
                    ConfirmReason::DuplicateValue => {
                        "This password has already been used this month. Use it anyway?"
                    }
                };

                if yes || confirm(prompt)? {
                    let entry = service.confirm_manual(&credential)?;
                    println!("Manual password set successfully.");
                    print_join_code(service.network_name(), &entry.value);
                } else {
                    println!("Aborted; nothing changed.");
                }
            }
        },

        Commands::Copy => {
            let value = service.copy_today()?;
            println!("{}", value);
        }

        Commands::History { limit } => {
            let ledger = service.ledger();

            println!("\n=== {} Passwords ===\n", ledger.month_key().name());
            if ledger.is_empty() {
                println!("No passwords generated this month.");
            }
            for entry in ledger.entries() {
                let marker = if entry.origin == CredentialOrigin::ManuallySet {
                    " (manual)"
                } else {
                    ""
                };
                println!(
                    "{} | {}{}",
                    entry.created_at.format("%b %e %Y %H:%M"),
                    entry.value,
                    marker
                );
            }

            println!("\n=== Recent Actions ===\n");
            if service.log().is_empty() {
                println!("No actions recorded.");
            }
            for entry in service.log().entries().iter().take(limit) {
                println!(
                    "{} | {}",
                    entry.timestamp.format("%b %e %Y %H:%M"),
                    describe_action(&entry.action)
                );
            }
        }

        Commands::Status => {
            println!("\n=== MegaPass Status ===\n");
            println!("Month: {}", service.ledger().month_key().name());
            println!("Passwords this month: {}", service.ledger().len());
            match service.today() {
                Some(entry) => println!(
                    "Today's password: set at {}",
                    entry.created_at.format("%H:%M")
                ),
                None => println!("Today's password: not yet generated"),
            }

            let prefs = service.prefs();
            println!("\nPreferences:");
            println!("  Theme:        {}", prefs.theme);
            println!("  Digit format: {}", prefs.digit_width);
            println!("  Network name: {}", prefs.network_name);
        }

        Commands::Config { setting } => match setting {
            ConfigSetting::Theme { value } => {
                let theme = Theme::from(value);
                service.set_theme(theme)?;
                println!("Theme switched to {} mode", theme);
            }
            ConfigSetting::Digits { value } => {
                let width = DigitWidth::from(value);
                service.set_digit_width(width)?;
                println!("Password format updated to {}-digit format", width);
            }
            ConfigSetting::Ssid { value } => {
                service.set_network_name(&value)?;
                println!("Network name updated to \"{}\"", value.trim());
            }
        },
    }

    Ok(())
}

/// Render the join code, falling back to a message on failure
fn print_join_code(network_name: &str, credential: &str) {
    let code = WifiJoinCode::new(network_name, credential);
    match code.render() {
        Some(rendered) => {
            println!("\nScan to join \"{}\":\n", network_name);
            println!("{}", rendered);
        }
        None => {
            warn!(
                "Could not render join code: {}",
                code.error().unwrap_or("unknown error")
            );
            println!("\nQR code generation failed; join manually with the password above.");
        }
    }
}

/// Human-readable description of a logged action
fn describe_action(action: &Action) -> String {
    match action {
        Action::Generate { password, .. } => format!("Generated password: {}", password),
        Action::Manual { password } => format!("Manually set password: {}", password),
        Action::Copy { password } => format!("Copied password: {}", password),
        Action::ThemeChange { theme } => format!("Changed theme to {}", theme),
        Action::DigitChange { format } => format!("Changed to {}-digit format", format),
        Action::SsidChange { ssid } => format!("Updated network name to \"{}\"", ssid),
        Action::Reset { message, .. } => message.clone(),
        Action::ShowPassword { password } => format!("Revealed password: {}", password),
    }
}

/// Ask the user a yes/no question on the terminal
fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(matches!(
        line.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}
