use clap::{Parser, Subcommand};
use cyoa_core::{Story, Template};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "cyoa")]
#[command(about = "Choose-your-own-adventure story tooling")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List chapter keys and titles
    Chapters {
        /// Story JSON document
        story: PathBuf,
    },
    /// Report options that point at missing chapters
    Check {
        /// Story JSON document
        story: PathBuf,
    },
    /// Render one chapter to stdout
    Render {
        /// Story JSON document
        story: PathBuf,
        /// Chapter key
        key: String,
        /// Template file to use instead of the built-in one
        #[arg(long)]
        template: Option<PathBuf>,
    },
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Chapters { story } => {
            let story = Story::from_path(&story)?;
            if story.is_empty() {
                println!("No chapters found.");
            }
            for key in story.keys() {
                let title = story.get(key).map(|c| c.title.as_str()).unwrap_or_default();
                println!("{key}: {title}");
            }
        }
        Commands::Check { story } => {
            let story = Story::from_path(&story)?;
            let dangling = story.dangling_options();
            if dangling.is_empty() {
                println!("All options point at existing chapters.");
            } else {
                for entry in &dangling {
                    println!("{entry}");
                }
                eprintln!("{} dangling option(s)", dangling.len());
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Render {
            story,
            key,
            template,
        } => {
            let story = Story::from_path(&story)?;
            let template = match template {
                Some(path) => std::sync::Arc::new(Template::from_path(&path)?),
                None => Template::builtin(),
            };
            let Some(chapter) = story.get(&key) else {
                eprintln!("Chapter not found: {key}");
                return Ok(ExitCode::FAILURE);
            };
            let mut stdout = std::io::stdout().lock();
            template.render(chapter, &mut stdout)?;
            stdout.flush()?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
