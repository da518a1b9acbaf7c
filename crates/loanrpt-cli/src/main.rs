mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "loanrpt",
    version,
    about = "Rebuild mortgage servicing reports (PDF, JSON) as CSV tables"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconstruct the table of a PDF report
    Convert {
        /// Path to the PDF report
        input_file: PathBuf,

        /// Predefined layout: new-loans, ots-cmr
        #[arg(short, long, value_name = "NAME", conflicts_with = "layout")]
        preset: Option<String>,

        /// Custom JSON layout file
        #[arg(short, long, value_name = "FILE")]
        layout: Option<PathBuf>,

        /// Output format: csv (default), json or table
        #[arg(short, long, default_value = "csv")]
        output: String,

        /// Write CSV rows to a file instead of stdout
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,

        /// Dump one row per word box (x0,y0,x1,y1,word,block,line,word_no) instead of a table
        #[arg(long)]
        words: bool,
    },
    /// Build the investor summary from a saved records response
    Aggregate {
        /// Path to a JSON response with a "results" array
        input_file: PathBuf,

        /// Output format: csv (default), json or table
        #[arg(short, long, default_value = "csv")]
        output: String,

        /// Write CSV rows to a file instead of stdout
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Decode a saved API response, keep the document and write its CSV
    Fetch {
        /// Path to the saved API response (JSON)
        response_file: PathBuf,

        /// Document name in the response; omit for a records response
        #[arg(short, long, value_name = "NAME")]
        document: Option<String>,

        /// Where to keep the decoded PDF
        #[arg(long, value_name = "FILE")]
        pdf_dest: Option<PathBuf>,

        /// Where to write the reconstructed rows
        #[arg(long, value_name = "FILE")]
        csv_dest: PathBuf,

        /// Predefined layout: new-loans, ots-cmr
        #[arg(short, long, value_name = "NAME", conflicts_with = "layout")]
        preset: Option<String>,

        /// Custom JSON layout file
        #[arg(short, long, value_name = "FILE")]
        layout: Option<PathBuf>,
    },
    /// Manage and inspect layouts
    Layouts {
        #[command(subcommand)]
        action: LayoutsAction,
    },
}

#[derive(Subcommand)]
enum LayoutsAction {
    /// List predefined layouts
    List,
    /// Explain a layout in plain language
    Explain {
        /// Preset name (e.g., "new-loans")
        preset: String,
    },
    /// Print the layout JSON schema with field descriptions
    Schema,
    /// Validate a custom layout file
    Validate {
        /// Path to JSON layout file
        file: PathBuf,
    },
}

fn main() {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Convert {
            input_file,
            preset,
            layout,
            output,
            out,
            words,
        } => commands::convert::run(input_file, preset, layout, &output, out, words),
        Commands::Aggregate {
            input_file,
            output,
            out,
        } => commands::aggregate::run(input_file, &output, out),
        Commands::Fetch {
            response_file,
            document,
            pdf_dest,
            csv_dest,
            preset,
            layout,
        } => commands::fetch::run(response_file, document, pdf_dest, csv_dest, preset, layout),
        Commands::Layouts { action } => match action {
            LayoutsAction::List => commands::layouts::list(),
            LayoutsAction::Explain { preset } => commands::layouts::explain(&preset),
            LayoutsAction::Schema => commands::layouts::schema(),
            LayoutsAction::Validate { file } => commands::layouts::validate(&file),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
