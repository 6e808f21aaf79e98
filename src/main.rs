use std::fs::File;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use lip::{archive, Reader, CARD_SIZE, EPOCH, MAGIC};

#[derive(Parser)]
#[command(name = "lip", version = "1.0.0", about = "The LIP archive format CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pack one or more paths into a LIP archive
    Pack {
        output: PathBuf,
        #[arg(required = true, num_args = 1..)]
        input: Vec<PathBuf>,
        /// LZ4-compress every regular file
        #[arg(long)]
        lz4: bool,
    },
    /// List archive contents
    List { input: PathBuf },
    /// Extract a LIP archive
    Extract {
        input: PathBuf,
        #[arg(short = 'C', long, default_value = ".")]
        into: PathBuf,
    },
    /// Show archive metadata
    Info { input: PathBuf },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    match Cli::parse().command {
        Commands::Pack { output, input, lz4 } => {
            archive::pack_directories(&input, &output, lz4)?;
            for root in &input {
                println!("  packed  {}", root.display());
            }
            let size = std::fs::metadata(&output)?.len();
            println!("Created: {}  ({} B on disk)", output.display(), size);
        }

        Commands::List { input } => {
            let reader = open_reader(&input)?;
            println!("Archive: {}", input.display());
            println!(
                "{:<10} {:>12} {:>4} {:>4}  {:>12}  Name",
                "Type", "Size", "Lz4", "Exe", "mtime"
            );
            for (name, card) in reader.iter() {
                let ty = match card.ftype()? {
                    lip::FType::RegularFile => "file",
                    lip::FType::Directory => "dir",
                    lip::FType::Symlink => "symlink",
                };
                println!(
                    "{:<10} {:>12} {:>4} {:>4}  {:>12}  {}",
                    ty,
                    card.size(),
                    if card.is_lz4_compressed() { "y" } else { "-" },
                    if card.is_executable() { "y" } else { "-" },
                    card.mtime,
                    String::from_utf8_lossy(name)
                );
            }
        }

        Commands::Extract { input, into } => {
            archive::unpack_archive(&input, &into)?;
            println!("Unpacked to: {}", into.display());
        }

        Commands::Info { input } => {
            let file = File::open(&input)?;
            let file_size = file.metadata()?.len();
            let reader = Reader::open(&file, file_size as i64)?;

            println!("── LIP Archive ──────────────────────────────────────────");
            println!("  Path         {}", input.display());
            println!("  File size    {} B", file_size);
            println!("  Magic        {}", String::from_utf8_lossy(&MAGIC));
            println!("  Epoch        {}", EPOCH);
            println!("  Members      {}", reader.len());
            println!("  Card size    {} B", CARD_SIZE);
        }
    }

    Ok(())
}

fn open_reader(path: &PathBuf) -> Result<Reader, Box<dyn std::error::Error>> {
    let file = File::open(path)?;
    let file_size = file.metadata()?.len() as i64;
    Ok(Reader::open(&file, file_size)?)
}
