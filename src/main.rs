//! Command-line front end: convert MathType OLE objects to LaTeX, either
//! from a single extracted object file or from every embedded object in a
//! Word document.

use clap::Parser;
use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(version, about = "Convert MathType OLE equation objects to LaTeX", long_about = None)]
struct Args {
    /// A MathType OLE object file (e.g. an extracted oleObject1.bin)
    #[arg(short, long, conflicts_with = "word_docx")]
    filepath: Option<PathBuf>,

    /// A Word document; converts every object under word/embeddings/
    #[arg(short = 'w', long = "word-docx")]
    word_docx: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let result = match (&args.filepath, &args.word_docx) {
        (Some(path), None) => convert_object(path),
        (None, Some(path)) => convert_document(path),
        _ => {
            eprintln!("error: provide either --filepath or --word-docx");
            return ExitCode::from(2);
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn convert_object(path: &PathBuf) -> longan::Result<()> {
    let latex = longan::mtef::decode_ole_object(File::open(path)?)?;
    println!("{latex}");
    Ok(())
}

fn convert_document(path: &PathBuf) -> longan::Result<()> {
    let mut failures = 0usize;
    for eq in longan::docx::convert_docx(path)? {
        match eq.latex {
            Ok(latex) => println!("{latex}"),
            Err(err) => {
                eprintln!("{}: {err}", eq.name);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        return Err(longan::Error::InvalidFormat(format!(
            "{failures} embedded object(s) failed to convert"
        )));
    }
    Ok(())
}
