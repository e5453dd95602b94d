// apps/clinic-cli/src/commands.rs
use clap::{Parser, Subcommand};

use shared_models::SpecialtyId;

#[derive(Debug, Parser)]
#[clap(name = "clinic-cli", version, about = "Clinic scheduling maintenance commands")]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, PartialEq)]
pub enum Command {
    /// Rescore every doctor and persist the new popularity values.
    RecomputePopularity,
    /// Print appointment statistics for one calendar month (UTC).
    MonthlyReport {
        #[clap(long)]
        year: i32,
        #[clap(long)]
        month: u32,
    },
    /// List doctors. With a specialty, ranked by freshly recomputed popularity.
    Doctors {
        #[clap(long)]
        specialty_id: Option<SpecialtyId>,
        #[clap(long)]
        active_only: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_monthly_report() {
        let cli = Cli::parse_from(["clinic-cli", "monthly-report", "--year", "2024", "--month", "1"]);
        assert_eq!(cli.command, Command::MonthlyReport { year: 2024, month: 1 });
    }

    #[test]
    fn test_parses_doctor_filters() {
        let cli = Cli::parse_from(["clinic-cli", "doctors", "--specialty-id", "3", "--active-only"]);
        assert_eq!(
            cli.command,
            Command::Doctors {
                specialty_id: Some(3),
                active_only: true
            }
        );
    }

    #[test]
    fn test_monthly_report_requires_month() {
        assert!(Cli::try_parse_from(["clinic-cli", "monthly-report", "--year", "2024"]).is_err());
    }
}
