use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use bwf2pbcore::{bwf, ohms, pbcore};

/// Extract metadata from BWF files and create PBCore XML records,
/// incorporating existing OHMS XML as an instantiation extension.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// WAV file(s)
    #[arg(required = true)]
    infile: Vec<PathBuf>,
}

fn convert_file(infile: &Path) -> Result<()> {
    let record = bwf::read_bwf_metadata(infile)?;
    if log::log_enabled!(log::Level::Debug) {
        log::debug!(
            "merged metadata for {}:\n{}",
            infile.display(),
            serde_json::to_string_pretty(&record)?
        );
    }

    let ohms_root = ohms::load_companion(infile)?;
    let document = pbcore::build_document(&record, infile, ohms_root);

    let outfile = pbcore::derived_path(infile, "_pbcore.xml");
    pbcore::write_document(&document, &outfile)?;
    log::info!("wrote {}", outfile.display());
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    // strictly sequential; the first fatal error aborts the whole invocation
    for infile in &args.infile {
        convert_file(infile).with_context(|| format!("failed to convert {}", infile.display()))?;
    }
    Ok(())
}
