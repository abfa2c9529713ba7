use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "tablo")]
#[command(about = "Typed command-line access to hosted structured databases", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print a database's declared fields
    #[command(alias = "i")]
    Inspect {
        /// Database id (UUID, hyphens optional)
        database: String,
    },

    /// List pages with their title and last edit time
    #[command(alias = "ls")]
    Pages {
        /// Database id (UUID, hyphens optional)
        database: String,

        /// Only pages where this checkbox field is set
        #[arg(long, value_name = "FIELD")]
        done: Option<String>,

        /// Only pages where this checkbox field is unset
        #[arg(long, value_name = "FIELD", conflicts_with = "done")]
        not_done: Option<String>,
    },

    /// Archive finished rows and turn snoozes into reminders
    Todo {
        /// Database id (UUID, hyphens optional)
        database: String,
    },
}
